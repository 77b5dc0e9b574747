use crate::agents::{
    DEFAULT_PRINT_TEMPLATE, DependencyUpdater, FilterCriteria, FleetAnalyser, ImportScanner,
    ProjectRequirement, ReleaseNotesCollector, StepChanges, StepLister, SystemCommandRunner,
    TemplateRenderer, UpdateOutcome, categorise_deps, const_rewriter, parse_cutoff,
};
use crate::config::{LIBS_GROUP, PLATFORM_NAMESPACES, STEPS_GROUP, StepperConfig, TOOLS_GROUP};
use crate::error::{Result, StepperError};
use crate::github::GitHubClient;
use crate::steplib::{ExportType, StepCatalog, StepmanClient};
use colored::Colorize;
use std::fs;
use std::path::Path;
use tracing::info;

const BITRISE_REPO_FILTERS: &[&str] = &["https://github.com/bitrise-steplib", "https://github.com/bitrise-io"];

fn fleet_analyser() -> FleetAnalyser {
    FleetAnalyser::new(ImportScanner::new(
        SystemCommandRunner::shared(),
        PLATFORM_NAMESPACES,
    ))
}

/// Step listings work on the latest version of each step.
fn listing_catalog(stepman: &StepmanClient, steplib_uri: &str) -> Result<StepCatalog> {
    stepman.load(steplib_uri, ExportType::Latest)
}

fn render_steps(
    catalog: &StepCatalog,
    criteria: &FilterCriteria,
    print_template: Option<&str>,
) -> Result<String> {
    let steps = StepLister::new(criteria).list(catalog)?;
    info!("{} steps matched", steps.len());

    let template = print_template.unwrap_or(DEFAULT_PRINT_TEMPLATE);
    TemplateRenderer::new().render(template, &steps)
}

/// `<n>. <id>: <git url>` for every step hosted by a Bitrise organization,
/// deprecated ones included.
fn bitrise_step_lines(catalog: &StepCatalog) -> Result<Vec<String>> {
    let criteria = FilterCriteria {
        repo_url_filters: BITRISE_REPO_FILTERS.iter().map(|f| f.to_string()).collect(),
        include_deprecated: true,
        ..Default::default()
    };
    let steps = StepLister::new(&criteria).list(catalog)?;

    Ok(steps
        .iter()
        .enumerate()
        .map(|(idx, step)| format!("{}. {}: {}", idx + 1, step.step_id, step.source))
        .collect())
}

/// List StepLib steps matching the filters through a handlebars template
pub fn execute_steps(
    config: &StepperConfig,
    criteria: &FilterCriteria,
    print_template: Option<&str>,
) -> Result<()> {
    let stepman = StepmanClient::new(SystemCommandRunner::shared());
    let catalog = listing_catalog(&stepman, &config.steplib_uri)?;

    print!("{}", render_steps(&catalog, criteria, print_template)?);
    Ok(())
}

/// List the steps whose source lives in a Bitrise organization
pub fn execute_bitrise_steps(config: &StepperConfig) -> Result<()> {
    let stepman = StepmanClient::new(SystemCommandRunner::shared());
    let catalog = listing_catalog(&stepman, &config.steplib_uri)?;

    eprintln!("{}", "Bitrise steps:".cyan().bold());
    for line in bitrise_step_lines(&catalog)? {
        println!("{line}");
    }
    Ok(())
}

/// Print a markdown changelog of the step versions published after `start`
pub fn execute_step_changes(
    config: &StepperConfig,
    api_token: Option<&str>,
    start: Option<&str>,
) -> Result<()> {
    let api_token = api_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| StepperError::MissingPrecondition("api-token not defined".into()))?;
    let start = start
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StepperError::MissingPrecondition("start not defined".into()))?;
    let cutoff = parse_cutoff(start)?;

    let stepman = StepmanClient::new(SystemCommandRunner::shared());
    let catalog = stepman.load(&config.steplib_uri, ExportType::Full)?;

    let changes = StepChanges::since(&catalog, cutoff);
    info!(
        new = changes.new_steps.len(),
        updated = changes.updated_steps.len(),
        "collecting release notes"
    );

    let github = GitHubClient::new(api_token)?;
    let changelog = ReleaseNotesCollector::new(&github)
        .with_progress(!config.verbose)
        .collect(&changes)?;

    print!("{changelog}");
    Ok(())
}

/// Print the steps const file with every version set to the latest release
pub fn execute_step_latests(config: &StepperConfig, steps_const_file: Option<&str>) -> Result<()> {
    let const_file = steps_const_file
        .filter(|p| !p.is_empty())
        .ok_or_else(|| StepperError::MissingPrecondition("steps-const-file not defined".into()))?;
    let const_path = Path::new(const_file);
    if !const_path.exists() {
        return Err(StepperError::MissingPrecondition(format!(
            "steps-const-file does not exist at: {const_file}"
        )));
    }

    let content = fs::read_to_string(const_path)?;
    let step_ids = const_rewriter::collect_step_ids(&content);
    info!("{} steps referenced in {}", step_ids.len(), const_path.display());

    let stepman = StepmanClient::new(SystemCommandRunner::shared());
    let catalog = stepman.load(&config.steplib_uri, ExportType::Latest)?;
    let latest = catalog.latest_versions_for(&step_ids)?;

    let generated = const_rewriter::replace_step_versions(&content, &latest)?;

    println!();
    println!("Generated:\n{generated}");
    Ok(())
}

/// Categorised platform packages imported by the Go steps
pub fn execute_step_deps(config: &StepperConfig) -> Result<()> {
    print_fleet_deps(config, STEPS_GROUP, ProjectRequirement::GoStep)
}

/// Categorised platform packages imported by the Go libraries
pub fn execute_lib_deps(config: &StepperConfig) -> Result<()> {
    print_fleet_deps(config, LIBS_GROUP, ProjectRequirement::GoModule)
}

/// Categorised platform packages imported by the Go tools
pub fn execute_tool_deps(config: &StepperConfig) -> Result<()> {
    print_fleet_deps(config, TOOLS_GROUP, ProjectRequirement::GoModule)
}

fn print_fleet_deps(
    config: &StepperConfig,
    group: &str,
    requirement: ProjectRequirement,
) -> Result<()> {
    let group_root = config.group_dir(group)?;
    eprintln!(
        "{}",
        format!("Collecting dependencies of {group}...").cyan().bold()
    );

    let packages = fleet_analyser().imported_root_packages(&[group_root], requirement)?;
    let categories = categorise_deps(&packages)?;

    for (category, deps) in &categories {
        println!();
        println!("{}:", category.to_string().yellow().bold());
        println!("{}", deps.join("\n"));
    }
    Ok(())
}

/// Print `<org>/<repo>` for every project importing `pkg`
pub fn execute_dependent_projects(config: &StepperConfig, pkg: Option<&str>) -> Result<()> {
    let pkg = pkg
        .filter(|p| !p.is_empty())
        .ok_or_else(|| StepperError::MissingPrecondition("package not specified".into()))?;

    let group_roots = [STEPS_GROUP, LIBS_GROUP, TOOLS_GROUP]
        .iter()
        .map(|group| config.group_dir(group))
        .collect::<Result<Vec<_>>>()?;

    eprintln!(
        "{}",
        format!("Looking for projects depending on {pkg}...").cyan().bold()
    );
    for repo in fleet_analyser().dependent_projects(&group_roots, pkg)? {
        println!("{repo}");
    }
    Ok(())
}

/// Update `pkg` in the step at the project path, if the step depends on it
pub fn execute_update_step_deps(
    config: &StepperConfig,
    pkg: Option<&str>,
    version: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let pkg = pkg
        .filter(|p| !p.is_empty())
        .ok_or_else(|| StepperError::MissingPrecondition("go package not specified".into()))?;

    let runner = SystemCommandRunner::shared();
    let scanner = ImportScanner::new(runner.clone(), PLATFORM_NAMESPACES);
    let updater = DependencyUpdater::new(runner, scanner, dry_run);

    match updater.update_if_needed(pkg, version, &config.project_path)? {
        UpdateOutcome::Updated => {
            eprintln!("{}", format!("✓ Updated {pkg}").green());
        }
        UpdateOutcome::Planned(commands) => {
            for command in commands {
                println!("{command}");
            }
        }
        UpdateOutcome::Skipped | UpdateOutcome::NotDependent => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::command_runner::{CommandRunner, Invocation};
    use std::sync::{Arc, Mutex};

    const STEPLIB: &str = "https://github.com/bitrise-io/bitrise-steplib.git";

    const FULL_EXPORT: &str = r#"{"steps": {
        "script": {"versions": {
            "1.0.0": {"source": {"git": "https://github.com/bitrise-steplib/steps-script.git"}},
            "1.1.0": {"source": {"git": "https://github.com/bitrise-steplib/steps-script.git"}},
            "1.2.0": {"source": {"git": "https://github.com/bitrise-steplib/steps-script.git"}}
        }}
    }}"#;

    const LATEST_EXPORT: &str = r#"{"steps": {
        "script": {"latest_version_number": "1.2.0", "versions": {
            "1.2.0": {"source": {"git": "https://github.com/bitrise-steplib/steps-script.git"}}
        }},
        "deploy-to-itunesconnect": {"info": {"removal_date": "2023-01-01"}, "versions": {
            "2.0.0": {"source": {"git": "https://github.com/bitrise-io/steps-deploy-to-itunesconnect.git"}}
        }},
        "community-step": {"versions": {
            "0.9.0": {"source": {"git": "https://github.com/someone/bitrise-step-community.git"}}
        }}
    }}"#;

    /// Answers `export-spec` with a catalog matching the requested export type.
    #[derive(Default)]
    struct SteplibRunner {
        export_types: Mutex<Vec<String>>,
    }

    impl CommandRunner for SteplibRunner {
        fn run(&self, invocation: &Invocation) -> Result<String> {
            let args = &invocation.args;
            let Some(pos) = args.iter().position(|a| a == "--output") else {
                return Ok(String::new());
            };
            let export_type = args.last().cloned().unwrap_or_default();
            let spec = if export_type == "latest" { LATEST_EXPORT } else { FULL_EXPORT };
            self.export_types.lock().unwrap().push(export_type);
            fs::write(&args[pos + 1], spec)?;
            Ok(String::new())
        }
    }

    fn load_listing() -> (Arc<SteplibRunner>, StepCatalog) {
        let runner = Arc::new(SteplibRunner::default());
        let stepman = StepmanClient::new(runner.clone());
        let catalog = listing_catalog(&stepman, STEPLIB).unwrap();
        (runner, catalog)
    }

    #[test]
    fn listings_request_the_latest_export() {
        let (runner, _) = load_listing();
        assert_eq!(*runner.export_types.lock().unwrap(), ["latest"]);
    }

    #[test]
    fn steps_lists_each_step_once() {
        let (_, catalog) = load_listing();
        let criteria = FilterCriteria {
            include_deprecated: true,
            ..Default::default()
        };

        let out = render_steps(&catalog, &criteria, None).unwrap();
        assert_eq!(out, "0,community-step\n1,deploy-to-itunesconnect\n2,script\n");
    }

    #[test]
    fn bitrise_steps_lines() {
        let (_, catalog) = load_listing();

        assert_eq!(
            bitrise_step_lines(&catalog).unwrap(),
            [
                "1. deploy-to-itunesconnect: https://github.com/bitrise-io/steps-deploy-to-itunesconnect.git",
                "2. script: https://github.com/bitrise-steplib/steps-script.git",
            ]
        );
    }

    #[test]
    fn full_export_would_repeat_multi_version_steps() {
        let catalog: StepCatalog = serde_json::from_str(FULL_EXPORT).unwrap();
        assert_eq!(bitrise_step_lines(&catalog).unwrap().len(), 3);
    }
}
