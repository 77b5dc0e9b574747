use crate::error::Result;
use crate::steplib::version::VersionComparator;
use jiff::Timestamp;
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::collections::{BTreeMap, HashMap};

/// StepLib export as written by `stepman export-spec`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepCatalog {
    #[serde(default)]
    pub steps: BTreeMap<String, StepGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepGroup {
    #[serde(default)]
    pub info: StepGroupInfo,
    #[serde(default)]
    pub latest_version_number: Option<String>,
    #[serde(default)]
    pub versions: BTreeMap<String, StepVersion>,
}

impl StepCatalog {
    /// step id → latest version for each of `step_ids` found in the catalog,
    /// taken from `latest_version_number` when the export carries it and from
    /// the highest listed version otherwise. Other steps are not looked at.
    pub fn latest_versions_for<S: AsRef<str>>(&self, step_ids: &[S]) -> Result<HashMap<String, String>> {
        let mut latest = HashMap::with_capacity(step_ids.len());
        for step_id in step_ids {
            let step_id = step_id.as_ref();
            let Some(group) = self.steps.get(step_id) else {
                continue;
            };
            let version = match group.latest_version_number.as_deref() {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => {
                    let versions: Vec<&String> = group.versions.keys().collect();
                    VersionComparator::latest(&versions)?
                }
            };
            latest.insert(step_id.to_string(), version);
        }
        Ok(latest)
    }
}

impl StepGroup {
    pub fn is_deprecated(&self) -> bool {
        self.info.removal_date.as_deref().is_some_and(|d| !d.is_empty())
            || self.info.deprecate_notes.as_deref().is_some_and(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepGroupInfo {
    #[serde(default)]
    pub removal_date: Option<String>,
    #[serde(default)]
    pub deprecate_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepVersion {
    #[serde(default)]
    pub source: Option<StepSource>,
    #[serde(default)]
    pub toolkit: Option<StepToolkit>,
    #[serde(default)]
    pub project_type_tags: Vec<String>,
    #[serde(default)]
    pub published_at: Option<Timestamp>,
}

impl StepVersion {
    pub fn git_url(&self) -> Option<&str> {
        self.source
            .as_ref()
            .map(|s| s.git.as_str())
            .filter(|g| !g.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepSource {
    #[serde(default)]
    pub git: String,
}

/// Toolkit declaration; a step without one runs as a bash step. Only the
/// presence of each toolkit matters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepToolkit {
    #[serde(default)]
    pub bash: Option<IgnoredAny>,
    #[serde(default)]
    pub go: Option<IgnoredAny>,
}
