//! Client for the repo-data proxy service.
//!
//! The proxy serves already-extracted GitHub activity over a plain REST
//! surface: `/repos/{org}/{repo}/commits`, `/pulls`, `/reviews`, and
//! `/modules`. Extraction correctness is the proxy's problem; this client
//! only transports and decodes.

use std::time::Duration;

use janus_core::{
    JanusError, ModuleMap, RawCommit, RawPullRequest, RawReview, Result, ServiceConfig,
};
use serde::de::DeserializeOwned;

use crate::fixtures::EngineeringData;

/// HTTP client for the repo-data service.
///
/// # Examples
///
/// ```
/// use janus_core::ServiceConfig;
/// use janus_ingest::service::RepoDataClient;
///
/// let client = RepoDataClient::new(&ServiceConfig::default()).unwrap();
/// ```
pub struct RepoDataClient {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl RepoDataClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`JanusError::Fetch`] if the HTTP client cannot be built.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| JanusError::Fetch(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let base = self.config.base_url.trim_end_matches('/');
        let url = format!("{base}{path}");

        let mut request = self.client.get(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| JanusError::Fetch(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JanusError::Fetch(format!(
                "service returned {status} for {url}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| JanusError::Fetch(format!("failed to decode {url}: {e}")))
    }

    /// Fetch commits for `org/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`JanusError::Fetch`] on transport, status, or decode failure.
    pub async fn commits(&self, org: &str, repo: &str) -> Result<Vec<RawCommit>> {
        self.get_json(&format!("/repos/{org}/{repo}/commits")).await
    }

    /// Fetch pull requests for `org/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`JanusError::Fetch`] on transport, status, or decode failure.
    pub async fn pull_requests(&self, org: &str, repo: &str) -> Result<Vec<RawPullRequest>> {
        self.get_json(&format!("/repos/{org}/{repo}/pulls")).await
    }

    /// Fetch reviews for `org/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`JanusError::Fetch`] on transport, status, or decode failure.
    pub async fn reviews(&self, org: &str, repo: &str) -> Result<Vec<RawReview>> {
        self.get_json(&format!("/repos/{org}/{repo}/reviews")).await
    }

    /// Fetch the module mapping for `org/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`JanusError::Fetch`] on transport, status, or decode failure.
    pub async fn module_map(&self, org: &str, repo: &str) -> Result<ModuleMap> {
        self.get_json(&format!("/repos/{org}/{repo}/modules")).await
    }

    /// Fetch a complete engineering snapshot for `org/repo`.
    ///
    /// # Errors
    ///
    /// Returns the first [`JanusError::Fetch`] encountered; a snapshot is
    /// all-or-nothing so partial data never reaches the compute core.
    pub async fn fetch_engineering(&self, org: &str, repo: &str) -> Result<EngineeringData> {
        let modules = self.module_map(org, repo).await?;
        let commits = self.commits(org, repo).await?;
        let prs = self.pull_requests(org, repo).await?;
        let reviews = self.reviews(org, repo).await?;
        Ok(EngineeringData {
            commits,
            prs,
            reviews,
            modules,
        })
    }
}
