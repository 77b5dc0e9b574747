use crate::agents::ToolkitFilter;
use clap::{ArgAction, Parser, Subcommand};

pub const DEFAULT_STEPLIB_URI: &str = "https://github.com/bitrise-io/bitrise-steplib.git";

#[derive(Parser, Debug)]
#[command(
    name = "stepper",
    about = "Solves some Bitrise step / steplib related tasks",
    version,
    author
)]
pub struct Cli {
    /// Path to the project directory used by updateStepDeps (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    pub path: String,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// StepLib collection URI passed to stepman
    #[arg(long, global = true, default_value = DEFAULT_STEPLIB_URI)]
    pub steplib: String,

    /// Directory holding the bitrise-steps, bitrise-libs and bitrise-tools project groups
    #[arg(long, global = true, env = "STEPPER_TURBOLIFT_ROOT", value_name = "DIR")]
    pub turbolift_root: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lists steps from the Bitrise StepLib
    #[command(name = "steps")]
    Steps {
        /// Repo URL filters separated by commas, matched as substrings of the step's git URL
        #[arg(long, value_delimiter = ',', value_name = "CSV")]
        repo_url_filter: Vec<String>,

        /// Ignore deprecated steps
        #[arg(
            long,
            action = ArgAction::Set,
            num_args = 0..=1,
            default_value_t = true,
            default_missing_value = "true",
            value_name = "BOOL"
        )]
        ignore_deprecated: bool,

        /// Handlebars template executed on the list of steps
        #[arg(long, value_name = "TPL")]
        print_template: Option<String>,

        /// Filter steps by project types, separated by commas
        #[arg(long, value_delimiter = ',', value_name = "CSV")]
        project_types: Vec<String>,

        /// Filter steps by toolkits
        #[arg(long, value_delimiter = ',', value_enum)]
        toolkits: Vec<ToolkitFilter>,
    },

    /// Lists Bitrise maintained steps
    #[command(name = "bitriseSteps", alias = "bitrise-steps")]
    BitriseSteps,

    /// Collects step changes from the given date to now in markdown ready format
    #[command(name = "stepChanges", alias = "step-changes")]
    StepChanges {
        /// GitHub API access token
        #[arg(long, env = "STEPPER_GITHUB_API_TOKEN", hide_env_values = true)]
        api_token: Option<String>,

        /// Collect step changes published after this date (format: 2006-01-02)
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<String>,
    },

    /// Prints a steps const file with the current latest step versions
    #[command(name = "stepLatests", alias = "step-latests")]
    StepLatests {
        /// Path to the local steps/const.go file of the bitrise-init project
        #[arg(long, value_name = "PATH")]
        steps_const_file: Option<String>,
    },

    /// Prints dependencies of steps
    #[command(name = "stepDeps", alias = "step-deps")]
    StepDeps,

    /// Prints dependencies of libs
    #[command(name = "libDeps", alias = "lib-deps")]
    LibDeps,

    /// Prints dependencies of tools
    #[command(name = "toolDeps", alias = "tool-deps")]
    ToolDeps,

    /// Lists projects depending on the given package
    #[command(name = "dependentProjects", alias = "dependent-projects")]
    DependentProjects {
        /// Package path prefix to look for
        #[arg(long)]
        pkg: Option<String>,
    },

    /// Updates a dependency of the step in the project directory
    #[command(name = "updateStepDeps", alias = "update-step-deps")]
    UpdateStepDeps {
        /// Go package path to be updated
        #[arg(long)]
        pkg: Option<String>,

        /// Go package version to be updated to
        #[arg(long)]
        ver: Option<String>,

        /// Print the commands instead of running them
        #[arg(
            long,
            action = ArgAction::Set,
            num_args = 0..=1,
            default_value_t = false,
            default_missing_value = "true",
            value_name = "BOOL"
        )]
        dry: bool,
    },
}
