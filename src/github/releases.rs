use crate::error::{Result, StepperError};
use crate::github::ReleaseSource;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const GITHUB_API: &str = "https://api.github.com";

/// GitHub REST client for repository releases
pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: String,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_api_base(GITHUB_API, token)
    }

    pub fn with_api_base(api_base: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("stepper/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StepperError::ReleaseFetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn release_url(&self, owner: &str, repo: &str, tag: &str) -> String {
        format!("{}/repos/{owner}/{repo}/releases/tags/{tag}", self.api_base)
    }
}

impl ReleaseSource for GitHubClient {
    fn release_notes(&self, owner: &str, repo: &str, tag: &str) -> Result<Option<String>> {
        let url = self.release_url(owner, repo, tag);
        debug!("Fetching: {url}");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .map_err(|e| StepperError::ReleaseFetch(format!("{url}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("No release for {owner}/{repo}@{tag}");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StepperError::ReleaseFetch(format!(
                "{owner}/{repo}@{tag}: HTTP {status}: {}",
                body.trim()
            )));
        }

        let release: Release = response
            .json()
            .map_err(|e| StepperError::ReleaseFetch(format!("{url}: invalid release payload: {e}")))?;
        Ok(Some(release.body.unwrap_or_default()))
    }
}

#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    body: Option<String>,
}
