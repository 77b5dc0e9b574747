use crate::agents::fleet_walker::{DirectoryLister, FleetWalker, FsLister, project_repo_name};
use crate::agents::import_scanner::ImportScanner;
use crate::error::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Files a project needs before its imports are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectRequirement {
    /// `main.go` and `go.mod`
    GoStep,
    /// `go.mod`
    GoModule,
}

impl ProjectRequirement {
    /// Reason the project is skipped, if it does not meet the requirement.
    pub fn check(&self, project_dir: &Path) -> std::result::Result<(), &'static str> {
        if *self == ProjectRequirement::GoStep && !project_dir.join("main.go").is_file() {
            return Err("not a go step");
        }
        if !project_dir.join("go.mod").is_file() {
            return Err("not a go module based project");
        }
        Ok(())
    }
}

/// FleetAnalyser runs the import scanner over every project of the fleet.
pub struct FleetAnalyser<L: DirectoryLister = FsLister> {
    walker: FleetWalker<L>,
    scanner: ImportScanner,
}

impl FleetAnalyser<FsLister> {
    pub fn new(scanner: ImportScanner) -> Self {
        Self::with_walker(FleetWalker::new(), scanner)
    }
}

impl<L: DirectoryLister> FleetAnalyser<L> {
    pub fn with_walker(walker: FleetWalker<L>, scanner: ImportScanner) -> Self {
        Self { walker, scanner }
    }

    /// Union of the platform root packages imported by the fleet's projects, sorted.
    pub fn imported_root_packages(
        &self,
        group_roots: &[PathBuf],
        requirement: ProjectRequirement,
    ) -> Result<Vec<String>> {
        let mut all = BTreeSet::new();

        self.walker.walk(group_roots, |project_dir| {
            info!("Analysing: {}", project_dir.display());

            if let Err(reason) = requirement.check(project_dir) {
                warn!("{}: {reason}", display_name(project_dir));
                return Ok(());
            }

            let imports = self.scanner.imported_platform_root_packages(project_dir)?;
            info!("{} bitrise root packages imported", imports.len());
            all.extend(imports);
            Ok(())
        })?;

        Ok(all.into_iter().collect())
    }

    /// `<org>/<repo>` of every Go module importing a package that starts with `pkg`.
    ///
    /// Projects whose imports cannot be listed are reported and skipped.
    pub fn dependent_projects(&self, group_roots: &[PathBuf], pkg: &str) -> Result<Vec<String>> {
        let mut dependents = Vec::new();

        self.walker.walk(group_roots, |project_dir| {
            if ProjectRequirement::GoModule.check(project_dir).is_err() {
                return Ok(());
            }

            match self.scanner.imported_platform_packages(project_dir) {
                Ok(imports) => {
                    if imports.iter().any(|i| i.starts_with(pkg)) {
                        dependents.push(project_repo_name(project_dir));
                    }
                }
                Err(e) => warn!("skipping {}: {e}", project_dir.display()),
            }
            Ok(())
        })?;

        Ok(dependents)
    }
}

fn display_name(project_dir: &Path) -> String {
    project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| project_dir.display().to_string())
}
