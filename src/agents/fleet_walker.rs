use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Lists the entries of a directory, in the order the platform returns them.
pub trait DirectoryLister {
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>>;
}

/// DirectoryLister reading the real filesystem.
#[derive(Debug, Default)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            entries.push(entry?.path());
        }
        Ok(entries)
    }
}

/// FleetWalker visits every project of a turbolift layout:
/// `<group>/work/<organization>/<project>`.
pub struct FleetWalker<L: DirectoryLister = FsLister> {
    lister: L,
}

impl FleetWalker<FsLister> {
    pub fn new() -> Self {
        Self::with_lister(FsLister)
    }
}

impl Default for FleetWalker<FsLister> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: DirectoryLister> FleetWalker<L> {
    pub fn with_lister(lister: L) -> Self {
        Self { lister }
    }

    /// Calls `visit` once per project directory; the first error stops the walk.
    pub fn walk<P, F>(&self, group_roots: &[P], mut visit: F) -> Result<()>
    where
        P: AsRef<Path>,
        F: FnMut(&Path) -> Result<()>,
    {
        for root in group_roots {
            let work_dir = root.as_ref().join("work");
            for org_dir in self.lister.list_dir(&work_dir)? {
                for project_dir in self.lister.list_dir(&org_dir)? {
                    visit(&project_dir)?;
                }
            }
        }
        Ok(())
    }
}

/// `<org>/<repo>` for a project directory, with a `-v1` checkout suffix shown as `@v1`.
pub fn project_repo_name(project_dir: &Path) -> String {
    let org = project_dir
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let repo = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match repo.strip_suffix("-v1") {
        Some(repo) => format!("{org}/{repo}@v1"),
        None => format!("{org}/{repo}"),
    }
}
