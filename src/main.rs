mod agents;
mod cli;
mod config;
mod error;
mod github;
mod steplib;
mod utils;
mod workflow;

use agents::FilterCriteria;
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use config::StepperConfig;
use std::process;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = StepperConfig::from_cli(&cli);

    let result = match cli.command {
        Commands::Steps {
            repo_url_filter,
            ignore_deprecated,
            print_template,
            project_types,
            toolkits,
        } => {
            let criteria = FilterCriteria {
                repo_url_filters: repo_url_filter,
                include_deprecated: !ignore_deprecated,
                project_types,
                toolkits,
            };
            workflow::execute_steps(&config, &criteria, print_template.as_deref())
        }
        Commands::BitriseSteps => workflow::execute_bitrise_steps(&config),
        Commands::StepChanges { api_token, start } => {
            workflow::execute_step_changes(&config, api_token.as_deref(), start.as_deref())
        }
        Commands::StepLatests { steps_const_file } => {
            workflow::execute_step_latests(&config, steps_const_file.as_deref())
        }
        Commands::StepDeps => workflow::execute_step_deps(&config),
        Commands::LibDeps => workflow::execute_lib_deps(&config),
        Commands::ToolDeps => workflow::execute_tool_deps(&config),
        Commands::DependentProjects { pkg } => {
            workflow::execute_dependent_projects(&config, pkg.as_deref())
        }
        Commands::UpdateStepDeps { pkg, ver, dry } => {
            workflow::execute_update_step_deps(&config, pkg.as_deref(), ver.as_deref(), dry)
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
