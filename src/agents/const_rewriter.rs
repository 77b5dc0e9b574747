use crate::error::{Result, StepperError};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

// CertificateAndProfileInstallerID = "certificate-and-profile-installer"
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#".*ID = "(?P<id>.*)""#).expect("valid step id regex"));

// CertificateAndProfileInstallerVersion = "1.8.4"
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#".*Version = "(?P<version>.*)""#).expect("valid step version regex")
});

/// Step ids declared in a generated steps const file, in file order.
pub fn collect_step_ids(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| ID_RE.captures(line))
        .map(|caps| caps["id"].to_string())
        .collect()
}

/// Replaces each version literal with the version mapped to the step id
/// declared above it. Other lines are kept as they are.
pub fn replace_step_versions(content: &str, versions: &HashMap<String, String>) -> Result<String> {
    let mut current_step_id: Option<String> = None;
    let mut lines = Vec::new();

    for line in content.lines() {
        if let Some(caps) = ID_RE.captures(line) {
            let step_id = caps["id"].to_string();
            debug!("replacing step version: {step_id}");
            current_step_id = Some(step_id);
        }

        let Some(version) = VERSION_RE.captures(line).and_then(|caps| caps.name("version")) else {
            lines.push(line.to_string());
            continue;
        };

        let step_id = current_step_id.as_deref().unwrap_or_default();
        let new_version = versions
            .get(step_id)
            .ok_or_else(|| StepperError::MissingVersion(step_id.to_string()))?;
        debug!("new version: {new_version}");

        let mut rewritten = String::with_capacity(line.len());
        rewritten.push_str(&line[..version.start()]);
        rewritten.push_str(new_version);
        rewritten.push_str(&line[version.end()..]);
        lines.push(rewritten);
    }

    let mut generated = lines.join("\n");
    if content.ends_with('\n') {
        generated.push('\n');
    }
    Ok(generated)
}
