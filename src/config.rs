use crate::cli::Cli;
use crate::error::{Result, StepperError};
use std::path::PathBuf;

pub const STEPS_GROUP: &str = "bitrise-steps";
pub const LIBS_GROUP: &str = "bitrise-libs";
pub const TOOLS_GROUP: &str = "bitrise-tools";

/// Import path prefixes owned by the platform.
pub const PLATFORM_NAMESPACES: &[&str] = &["github.com/bitrise-io/", "github.com/bitrise-steplib/"];

/// Settings shared by every command, built once from the parsed CLI.
#[derive(Debug, Clone)]
pub struct StepperConfig {
    pub project_path: PathBuf,
    pub steplib_uri: String,
    pub turbolift_root: Option<PathBuf>,
    pub verbose: bool,
}

impl StepperConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        let turbolift_root = cli
            .turbolift_root
            .as_ref()
            .map(PathBuf::from)
            .or_else(default_turbolift_root);

        Self {
            project_path: PathBuf::from(&cli.path),
            steplib_uri: cli.steplib.clone(),
            turbolift_root,
            verbose: cli.verbose,
        }
    }

    /// Root directory of a project group, e.g. `<turbolift>/bitrise-steps`.
    pub fn group_dir(&self, group: &str) -> Result<PathBuf> {
        self.turbolift_root
            .as_ref()
            .map(|root| root.join(group))
            .ok_or_else(|| {
                StepperError::MissingPrecondition(
                    "turbolift root not defined: pass --turbolift-root or set STEPPER_TURBOLIFT_ROOT"
                        .to_string(),
                )
            })
    }
}

fn default_turbolift_root() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join("Development/turbolift"))
}
