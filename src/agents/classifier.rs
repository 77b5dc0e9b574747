use crate::agents::package_path::PackagePath;
use crate::error::{Result, StepperError};
use std::collections::BTreeMap;
use std::fmt;

const LIB_NAMES: &[&str] = &["bitrise-init", "doublestar", "appcenter", "goinp"];
const TOOL_NAMES: &[&str] = &["bitrise", "stepman", "envman", "depman"];

/// Dependency buckets, ordered as they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Lib,
    Step,
    Tool,
}

impl Category {
    /// Classifies a repository name; `None` means nobody triaged it yet.
    pub fn of(repo_name: &str) -> Option<Self> {
        if repo_name.starts_with("go-") || LIB_NAMES.contains(&repo_name) {
            Some(Category::Lib)
        } else if repo_name.starts_with("steps-") || repo_name.starts_with("bitrise-step-") {
            Some(Category::Step)
        } else if TOOL_NAMES.contains(&repo_name) {
            Some(Category::Tool)
        } else {
            None
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Lib => "lib",
            Category::Step => "step",
            Category::Tool => "tool",
        };
        f.write_str(label)
    }
}

/// Groups root packages by category, each list sorted.
///
/// Fails on the first package that is not a valid path or that no
/// category claims.
pub fn categorise_deps<S: AsRef<str>>(root_packages: &[S]) -> Result<BTreeMap<Category, Vec<String>>> {
    let mut deps_by_category: BTreeMap<Category, Vec<String>> = BTreeMap::new();

    for pkg in root_packages {
        let pkg = pkg.as_ref();
        let path = PackagePath::parse(pkg)?;
        let category =
            Category::of(&path.name).ok_or_else(|| StepperError::UnknownCategory(pkg.to_string()))?;
        deps_by_category
            .entry(category)
            .or_default()
            .push(pkg.to_string());
    }

    for deps in deps_by_category.values_mut() {
        deps.sort();
    }

    Ok(deps_by_category)
}
