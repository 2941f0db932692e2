//! Server-side GitHub REST API client.
//!
//! Unlike a connection, which carries the signed-in user's token, this
//! client calls the API with the site's own token from `github.api_token`.
//! Without a token it falls back to anonymous, rate-limited access.

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Method, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::error::ConnectError;
use crate::github::{
    GITHUB_ACCEPT, GITHUB_PROVIDER_ID, GITHUB_USER_AGENT, GitHubConfig, HTTP_TIMEOUT,
};

/// A repository as returned by `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitHubRepository {
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub default_branch: Option<String>,
}

/// Token-authenticated GitHub REST API client.
#[derive(Debug, Clone)]
pub struct GitHubApi {
    api_url: String,
    api_token: Option<String>,
    http_client: reqwest::Client,
}

impl GitHubApi {
    /// Creates a client for `config`'s API URL and token.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::Configuration` if the API URL is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: &GitHubConfig) -> Result<Self, ConnectError> {
        let invalid = |what: &str, e: &dyn std::fmt::Display| ConnectError::Configuration {
            provider: GITHUB_PROVIDER_ID.to_string(),
            details: format!("invalid {what}: {e}"),
        };

        let api_url = config.api_url().trim_end_matches('/');
        Url::parse(api_url).map_err(|e| invalid("API URL", &e))?;

        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| invalid("HTTP client", &e))?;

        let api_token = config.api_token().map(str::to_string);
        if api_token.is_none() {
            warn!("no GitHub API token configured; API calls are anonymous");
        }

        Ok(Self {
            api_url: api_url.to_string(),
            api_token,
            http_client,
        })
    }

    /// Whether calls carry the site's API token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.api_token.is_some()
    }

    /// Starts a request to `path` (e.g. `/repos/owner/name`) with the API
    /// headers and, if configured, the token.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .http_client
            .request(method, format!("{}{path}", self.api_url))
            .header(USER_AGENT, GITHUB_USER_AGENT)
            .header(ACCEPT, GITHUB_ACCEPT);

        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// `GET`s `path` and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::Api` on transport failures, non-success
    /// statuses and undecodable bodies.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConnectError> {
        let api_error = |e: reqwest::Error| ConnectError::Api {
            provider: GITHUB_PROVIDER_ID.to_string(),
            details: e.to_string(),
        };

        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(api_error)?
            .error_for_status()
            .map_err(api_error)?;
        debug!(status = %response.status(), "GitHub API response");

        response.json::<T>().await.map_err(api_error)
    }

    /// Looks up a repository by its `owner/name`.
    ///
    /// # Errors
    ///
    /// See [`GitHubApi::get`].
    pub async fn repository(&self, full_name: &str) -> Result<GitHubRepository, ConnectError> {
        self.get(&format!("/repos/{}", full_name.trim_matches('/')))
            .await
    }
}
