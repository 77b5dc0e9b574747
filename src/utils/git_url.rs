use crate::error::{Result, StepperError};
use url::Url;

/// Host, owner and repository name of a git remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRepository {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

impl GitRepository {
    /// Parses `https://`, `ssh://` and scp-style (`git@host:owner/repo.git`) remotes.
    pub fn parse(git_url: &str) -> Result<Self> {
        let trimmed = git_url.trim();
        let (host, path) = if let Some((host, path)) = Self::split_scp_style(trimmed) {
            (host.to_string(), path.to_string())
        } else {
            let parsed = Url::parse(trimmed).map_err(|e| invalid(git_url, &e.to_string()))?;
            let host = parsed
                .host_str()
                .ok_or_else(|| invalid(git_url, "missing host"))?
                .to_string();
            (host, parsed.path().to_string())
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return Err(invalid(git_url, "expected an owner and a repository in the path"));
        }

        let owner = segments[segments.len() - 2].to_string();
        let last = segments[segments.len() - 1];
        let repo = last.strip_suffix(".git").unwrap_or(last).to_string();

        Ok(Self { host, owner, repo })
    }

    fn split_scp_style(url: &str) -> Option<(&str, &str)> {
        if url.contains("://") {
            return None;
        }
        let (user_host, path) = url.split_once(':')?;
        let host = user_host.rsplit_once('@').map_or(user_host, |(_, h)| h);
        if host.is_empty() {
            return None;
        }
        Some((host, path))
    }
}

fn invalid(url: &str, reason: &str) -> StepperError {
    StepperError::InvalidGitUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
