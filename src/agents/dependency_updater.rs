use crate::agents::command_runner::{CommandRunner, Invocation};
use crate::agents::fleet_analyser::ProjectRequirement;
use crate::agents::import_scanner::ImportScanner;
use crate::error::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// What `update_if_needed` did with a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Not a Go module based step.
    Skipped,
    NotDependent,
    Updated,
    /// Dry run: the command lines that would have been executed.
    Planned(Vec<String>),
}

/// DependencyUpdater bumps a Go dependency of a step and re-vendors it.
pub struct DependencyUpdater {
    runner: Arc<dyn CommandRunner>,
    scanner: ImportScanner,
    dry_run: bool,
}

impl DependencyUpdater {
    pub fn new(runner: Arc<dyn CommandRunner>, scanner: ImportScanner, dry_run: bool) -> Self {
        Self {
            runner,
            scanner,
            dry_run,
        }
    }

    /// Updates `pkg` (optionally to `version`) when the project in `dir` imports it.
    pub fn update_if_needed(&self, pkg: &str, version: Option<&str>, dir: &Path) -> Result<UpdateOutcome> {
        if let Err(reason) = ProjectRequirement::GoStep.check(dir) {
            warn!("{reason}");
            return Ok(UpdateOutcome::Skipped);
        }

        let imports = self.scanner.imported_platform_root_packages(dir)?;
        if !imports.iter().any(|i| i == pkg) {
            info!("Not depending on: {pkg}");
            return Ok(UpdateOutcome::NotDependent);
        }

        let commands = Self::update_commands(pkg, version, dir);
        if self.dry_run {
            return Ok(UpdateOutcome::Planned(
                commands.iter().map(Invocation::printable).collect(),
            ));
        }

        info!("Updating {pkg}");
        for invocation in &commands {
            self.runner.run(invocation)?;
        }
        Ok(UpdateOutcome::Updated)
    }

    /// `go get -u`, `go mod tidy` and `go mod vendor`, in execution order.
    pub fn update_commands(pkg: &str, version: Option<&str>, dir: &Path) -> Vec<Invocation> {
        let target = match version.filter(|v| !v.is_empty()) {
            Some(v) => format!("{pkg}@{v}"),
            None => pkg.to_string(),
        };

        vec![
            Invocation::new("go", &["get", "-u", &target], dir),
            Invocation::new("go", &["mod", "tidy"], dir),
            Invocation::new("go", &["mod", "vendor"], dir),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::command_runner::fake::FakeRunner;
    use crate::agents::import_scanner::test_support::imports_command;
    use crate::config::PLATFORM_NAMESPACES;
    use crate::error::StepperError;
    use std::fs;

    const PKG: &str = "github.com/bitrise-io/go-steputils/v2";

    fn go_step_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.go"), "package main\n").unwrap();
        fs::write(dir.path().join("go.mod"), "module github.com/bitrise-steplib/steps-deploy\n").unwrap();
        dir
    }

    fn scanning_runner() -> FakeRunner {
        FakeRunner::default()
            .with("go list", "github.com/bitrise-steplib/steps-deploy")
            .with(
                &imports_command(),
                "github.com/bitrise-io/go-steputils/v2/stepconf\ngithub.com/bitrise-io/go-utils/log",
            )
    }

    fn updater(runner: Arc<FakeRunner>, dry_run: bool) -> DependencyUpdater {
        let scanner = ImportScanner::new(runner.clone(), PLATFORM_NAMESPACES);
        DependencyUpdater::new(runner, scanner, dry_run)
    }

    #[test]
    fn skips_projects_without_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module x\n").unwrap();
        let runner = Arc::new(FakeRunner::default());

        let outcome = updater(runner.clone(), false)
            .update_if_needed(PKG, None, dir.path())
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Skipped);
        assert!(runner.called().is_empty());
    }

    #[test]
    fn skips_projects_without_module_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.go"), "package main\n").unwrap();
        let runner = Arc::new(FakeRunner::default());

        let outcome = updater(runner, false)
            .update_if_needed(PKG, None, dir.path())
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Skipped);
    }

    #[test]
    fn leaves_non_dependent_projects_alone() {
        let dir = go_step_dir();
        let runner = Arc::new(scanning_runner());

        let outcome = updater(runner.clone(), false)
            .update_if_needed("github.com/bitrise-io/go-xcode", None, dir.path())
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::NotDependent);
        assert!(!runner.called().iter().any(|c| c.starts_with("go get")));
    }

    #[test]
    fn runs_get_tidy_vendor_in_order() {
        let dir = go_step_dir();
        let runner = Arc::new(
            scanning_runner()
                .with(&format!("go get -u {PKG}@v2.3.0"), "")
                .with("go mod tidy", "")
                .with("go mod vendor", ""),
        );

        let outcome = updater(runner.clone(), false)
            .update_if_needed(PKG, Some("v2.3.0"), dir.path())
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Updated);
        let called = runner.called();
        assert_eq!(
            &called[called.len() - 3..],
            [
                format!("go get -u {PKG}@v2.3.0"),
                "go mod tidy".to_string(),
                "go mod vendor".to_string(),
            ]
        );
    }

    #[test]
    fn stops_at_first_failing_command() {
        let dir = go_step_dir();
        let runner = Arc::new(
            scanning_runner()
                .with(&format!("go get -u {PKG}"), "")
                .failing("go mod tidy", "go: updates to go.mod needed"),
        );

        let err = updater(runner.clone(), false)
            .update_if_needed(PKG, None, dir.path())
            .unwrap_err();

        assert!(matches!(err, StepperError::ExternalTool { .. }));
        assert!(!runner.called().iter().any(|c| c == "go mod vendor"));
    }

    #[test]
    fn dry_run_plans_commands_and_executes_nothing() {
        let dir = go_step_dir();
        let runner = Arc::new(scanning_runner());

        let outcome = updater(runner.clone(), true)
            .update_if_needed(PKG, None, dir.path())
            .unwrap();

        assert_eq!(
            outcome,
            UpdateOutcome::Planned(vec![
                format!("go get -u {PKG}"),
                "go mod tidy".to_string(),
                "go mod vendor".to_string(),
            ])
        );
        assert_eq!(runner.called().len(), 2);
    }

    #[test]
    fn dry_run_plans_pinned_version() {
        let dir = go_step_dir();
        let runner = Arc::new(scanning_runner());

        let outcome = updater(runner.clone(), true)
            .update_if_needed(PKG, Some("v2.3.0"), dir.path())
            .unwrap();

        assert_eq!(
            outcome,
            UpdateOutcome::Planned(vec![
                format!("go get -u {PKG}@v2.3.0"),
                "go mod tidy".to_string(),
                "go mod vendor".to_string(),
            ])
        );
        assert!(!runner.called().iter().any(|c| c.starts_with("go get")));
    }

    #[test]
    fn empty_version_is_ignored() {
        let commands = DependencyUpdater::update_commands(PKG, Some(""), Path::new("."));
        assert_eq!(commands[0].printable(), format!("go get -u {PKG}"));
    }
}
