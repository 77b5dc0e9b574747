use crate::error::Result;
use crate::steplib::{StepCatalog, StepVersion};
use crate::utils::GitRepository;
use clap::ValueEnum;
use serde::Serialize;
use tracing::warn;

/// Toolkits a step listing can be narrowed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToolkitFilter {
    Bash,
    Go,
}

impl ToolkitFilter {
    /// `go` needs an explicit go toolkit, while `bash` also accepts steps
    /// declaring no toolkit at all: bash is the catalog's default.
    pub fn matches(&self, version: &StepVersion) -> bool {
        match self {
            ToolkitFilter::Go => version.toolkit.as_ref().is_some_and(|t| t.go.is_some()),
            ToolkitFilter::Bash => version.toolkit.as_ref().is_none_or(|t| t.bash.is_some()),
        }
    }
}

/// Filters chosen on the command line; empty lists mean "no filter".
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub repo_url_filters: Vec<String>,
    pub include_deprecated: bool,
    pub project_types: Vec<String>,
    pub toolkits: Vec<ToolkitFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StepRepository {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

impl From<GitRepository> for StepRepository {
    fn from(repo: GitRepository) -> Self {
        Self {
            host: repo.host,
            owner: repo.owner,
            repo: repo.repo,
        }
    }
}

/// A listed step version, shaped for templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    #[serde(rename = "StepID")]
    pub step_id: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Repository")]
    pub repository: StepRepository,
}

/// StepLister narrows a catalog down to the step versions matching a filter.
pub struct StepLister<'a> {
    criteria: &'a FilterCriteria,
}

impl<'a> StepLister<'a> {
    pub fn new(criteria: &'a FilterCriteria) -> Self {
        Self { criteria }
    }

    pub fn list(&self, catalog: &StepCatalog) -> Result<Vec<StepRecord>> {
        let mut steps = Vec::new();

        for (step_id, group) in &catalog.steps {
            for (version_number, version) in &group.versions {
                let Some(git_url) = version.git_url() else {
                    warn!("step without source: {step_id}");
                    continue;
                };

                if group.is_deprecated() && !self.criteria.include_deprecated {
                    continue;
                }
                if !self.toolkit_allowed(version)
                    || !self.project_type_allowed(version)
                    || !self.repo_url_allowed(git_url)
                {
                    continue;
                }

                let repository = GitRepository::parse(git_url)?;
                steps.push(StepRecord {
                    step_id: step_id.clone(),
                    version: version_number.clone(),
                    source: git_url.to_string(),
                    repository: repository.into(),
                });
            }
        }

        Ok(steps)
    }

    fn toolkit_allowed(&self, version: &StepVersion) -> bool {
        self.criteria.toolkits.is_empty()
            || self.criteria.toolkits.iter().any(|t| t.matches(version))
    }

    fn project_type_allowed(&self, version: &StepVersion) -> bool {
        self.criteria.project_types.is_empty()
            || self
                .criteria
                .project_types
                .iter()
                .any(|t| version.project_type_tags.contains(t))
    }

    fn repo_url_allowed(&self, git_url: &str) -> bool {
        self.criteria.repo_url_filters.is_empty()
            || self
                .criteria
                .repo_url_filters
                .iter()
                .any(|f| git_url.contains(f.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StepperError;

    const CATALOG: &str = r#"{"steps": {
        "script": {"versions": {"1.2.1": {
            "source": {"git": "https://github.com/bitrise-steplib/steps-script.git"},
            "project_type_tags": []
        }}},
        "xcode-test": {"versions": {"5.0.0": {
            "source": {"git": "https://github.com/bitrise-steplib/steps-xcode-test.git"},
            "toolkit": {"go": {"package_name": "github.com/bitrise-steplib/steps-xcode-test"}},
            "project_type_tags": ["ios", "react-native"]
        }}},
        "deploy-to-itunesconnect": {"info": {"removal_date": "2023-01-01"}, "versions": {"2.0.0": {
            "source": {"git": "https://github.com/bitrise-io/steps-deploy-to-itunesconnect.git"},
            "toolkit": {"bash": {"entry_file": "step.sh"}}
        }}},
        "community-step": {"versions": {"0.9.0": {
            "source": {"git": "git@github.com:someone/bitrise-step-community.git"},
            "toolkit": {"bash": {"entry_file": "step.sh"}},
            "project_type_tags": ["android"]
        }}},
        "orphan": {"versions": {"1.0.0": {}}}
    }}"#;

    fn catalog() -> StepCatalog {
        serde_json::from_str(CATALOG).unwrap()
    }

    fn ids(records: &[StepRecord]) -> Vec<&str> {
        records.iter().map(|r| r.step_id.as_str()).collect()
    }

    #[test]
    fn deprecated_steps_are_ignored_by_default() {
        let criteria = FilterCriteria::default();
        let steps = StepLister::new(&criteria).list(&catalog()).unwrap();
        assert_eq!(ids(&steps), ["community-step", "script", "xcode-test"]);
    }

    #[test]
    fn deprecated_steps_can_be_included() {
        let criteria = FilterCriteria {
            include_deprecated: true,
            ..Default::default()
        };
        let steps = StepLister::new(&criteria).list(&catalog()).unwrap();
        assert_eq!(steps.len(), 4);
    }

    #[test]
    fn bash_matches_missing_toolkit_but_go_does_not() {
        let bash = FilterCriteria {
            toolkits: vec![ToolkitFilter::Bash],
            ..Default::default()
        };
        let steps = StepLister::new(&bash).list(&catalog()).unwrap();
        assert_eq!(ids(&steps), ["community-step", "script"]);

        let go = FilterCriteria {
            toolkits: vec![ToolkitFilter::Go],
            ..Default::default()
        };
        let steps = StepLister::new(&go).list(&catalog()).unwrap();
        assert_eq!(ids(&steps), ["xcode-test"]);
    }

    #[test]
    fn project_types_and_repo_urls_narrow_the_list() {
        let criteria = FilterCriteria {
            project_types: vec!["android".into(), "ios".into()],
            repo_url_filters: vec!["https://github.com/bitrise-steplib".into()],
            ..Default::default()
        };
        let steps = StepLister::new(&criteria).list(&catalog()).unwrap();
        assert_eq!(ids(&steps), ["xcode-test"]);
    }

    #[test]
    fn records_carry_the_parsed_repository() {
        let criteria = FilterCriteria {
            repo_url_filters: vec!["someone".into()],
            ..Default::default()
        };
        let steps = StepLister::new(&criteria).list(&catalog()).unwrap();
        assert_eq!(
            steps[0].repository,
            StepRepository {
                host: "github.com".into(),
                owner: "someone".into(),
                repo: "bitrise-step-community".into(),
            }
        );
        assert_eq!(steps[0].version, "0.9.0");
    }

    #[test]
    fn unparseable_source_aborts_the_listing() {
        let catalog: StepCatalog = serde_json::from_str(
            r#"{"steps": {"broken": {"versions": {"1.0.0": {"source": {"git": "https://github.com/"}}}}}}"#,
        )
        .unwrap();
        let criteria = FilterCriteria::default();
        let err = StepLister::new(&criteria).list(&catalog).unwrap_err();
        assert!(matches!(err, StepperError::InvalidGitUrl { .. }));
    }
}
