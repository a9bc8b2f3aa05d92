//! Github configuration
use super::{platform::GithubPlatform, GITHUB_API_URL};
use serde::Deserialize;
use url::Url;

use crate::{config::PublisherConfig, credentials::Secret, errors::PublisherError};

/// Github configuration
#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    /// Base URL of the REST API, for GitHub Enterprise or tests
    pub api_url: Option<String>,
}

impl GithubConfig {
    /// Get the github platform authenticated with `token`
    /// # Errors
    /// Error if the configured API URL is invalid
    pub fn get_platform(
        config: &PublisherConfig,
        token: Secret,
    ) -> Result<GithubPlatform, PublisherError> {
        let api_url = config
            .config_data
            .github
            .as_ref()
            .and_then(|github| github.api_url.as_deref())
            .unwrap_or(GITHUB_API_URL);
        let api_url = Url::parse(api_url)?;
        log::debug!("Using GitHub API at {api_url}");
        Ok(GithubPlatform::new(token, api_url))
    }
}
