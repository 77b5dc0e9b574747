use crate::error::Result;

pub mod releases;

pub use releases::GitHubClient;

pub trait ReleaseSource {
    /// Body of the release published for `tag`; `None` when there is no such release.
    fn release_notes(&self, owner: &str, repo: &str, tag: &str) -> Result<Option<String>>;
}
