use crate::agents::command_runner::{CommandRunner, Invocation};
use crate::error::Result;
use crate::steplib::models::StepCatalog;
use std::fmt;
use std::fs;
use std::sync::Arc;
use tracing::{debug, info};

/// How much of the StepLib `stepman export-spec` writes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportType {
    /// Every version of every step.
    Full,
    /// Only the latest version of each step.
    Latest,
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExportType::Full => "full",
            ExportType::Latest => "latest",
        };
        f.write_str(label)
    }
}

/// Loads the StepLib through the `bitrise stepman` CLI.
pub struct StepmanClient {
    runner: Arc<dyn CommandRunner>,
}

impl StepmanClient {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Refreshes the local copy of the StepLib collection.
    pub fn update(&self, steplib_uri: &str) -> Result<()> {
        let cwd = std::env::current_dir()?;
        let out = self.runner.run(&Invocation::new(
            "bitrise",
            &["stepman", "update", "--collection", steplib_uri],
            &cwd,
        ))?;
        debug!("{out}");
        Ok(())
    }

    /// Exports the StepLib into a temporary file and reads it back.
    pub fn export_spec(&self, steplib_uri: &str, export_type: ExportType) -> Result<StepCatalog> {
        let tmp_dir = tempfile::Builder::new().prefix("__spec__").tempdir()?;
        let spec_path = tmp_dir.path().join("spec.json");
        let spec_arg = spec_path.to_string_lossy().into_owned();
        let export_type = export_type.to_string();

        self.runner.run(&Invocation::new(
            "bitrise",
            &[
                "stepman",
                "export-spec",
                "--steplib",
                steplib_uri,
                "--output",
                &spec_arg,
                "--export-type",
                &export_type,
            ],
            tmp_dir.path(),
        ))?;

        let content = fs::read_to_string(&spec_path)?;
        let catalog: StepCatalog = serde_json::from_str(&content)?;
        debug!(steps = catalog.steps.len(), "steplib spec exported");
        Ok(catalog)
    }

    /// Updates and exports in one go, as every step command needs.
    pub fn load(&self, steplib_uri: &str, export_type: ExportType) -> Result<StepCatalog> {
        info!("Updating StepLib: {steplib_uri}");
        self.update(steplib_uri)?;
        self.export_spec(steplib_uri, export_type)
    }
}
