use crate::agents::command_runner::{CommandRunner, Invocation};
use crate::agents::package_path::root_package;
use crate::error::{Result, StepperError};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const IMPORTS_TEMPLATE: &str = r#"{{ join .Imports "\n" }}"#;

/// ImportScanner lists the platform packages a Go module imports.
pub struct ImportScanner {
    runner: Arc<dyn CommandRunner>,
    namespaces: Vec<String>,
}

impl ImportScanner {
    pub fn new<S: AsRef<str>>(runner: Arc<dyn CommandRunner>, namespaces: &[S]) -> Self {
        Self {
            runner,
            namespaces: namespaces.iter().map(|n| n.as_ref().to_string()).collect(),
        }
    }

    /// Root package of the module in `dir`.
    pub fn current_package_name(&self, dir: &Path) -> Result<String> {
        let args: &[&str] = if dir.join("main.go").exists() {
            &["list"]
        } else {
            &["list", "./..."]
        };
        let out = self.runner.run(&Invocation::new("go", args, dir))?;
        let packages = non_empty_lines(&out);

        match packages.as_slice() {
            [] => Err(StepperError::MalformedInput(format!(
                "no packages found in {}",
                dir.display()
            ))),
            [single] => Ok(single.clone()),
            [first, rest @ ..] => {
                let root = root_package(first)?;
                for pkg in rest {
                    let other = root_package(pkg)?;
                    if other != root {
                        return Err(StepperError::MultipleRootPackages(root, other));
                    }
                }
                Ok(root)
            }
        }
    }

    /// Every import path of every package under `dir`.
    pub fn all_import_paths(&self, dir: &Path) -> Result<Vec<String>> {
        let out = self
            .runner
            .run(&Invocation::new("go", &["list", "-f", IMPORTS_TEMPLATE, "./..."], dir))?;
        Ok(non_empty_lines(&out))
    }

    /// Platform packages imported by the module, excluding its own packages.
    pub fn imported_platform_packages(&self, dir: &Path) -> Result<Vec<String>> {
        let imports = self.all_import_paths(dir)?;
        let current = self.current_package_name(dir)?;
        debug!(module = %current, imports = imports.len(), "filtering imports");

        let own_prefix = format!("{current}/");
        let packages = imports
            .into_iter()
            .filter(|pkg| *pkg != current && !pkg.starts_with(&own_prefix))
            .filter(|pkg| self.namespaces.iter().any(|ns| pkg.starts_with(ns.as_str())))
            .collect();

        Ok(packages)
    }

    /// Imported platform packages collapsed to their root packages, sorted and deduplicated.
    pub fn imported_platform_root_packages(&self, dir: &Path) -> Result<Vec<String>> {
        let mut roots = BTreeSet::new();
        for pkg in self.imported_platform_packages(dir)? {
            roots.insert(root_package(&pkg)?);
        }
        Ok(roots.into_iter().collect())
    }
}

fn non_empty_lines(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
