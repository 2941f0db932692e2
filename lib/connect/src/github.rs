//! GitHub connection factory.
//!
//! Runs GitHub's OAuth web flow (authorization code with PKCE) and reads the
//! signed-in user's profile from the REST API. The user's login becomes the
//! connection's display name.

use async_trait::async_trait;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::connection::{Connection, ConnectionKey};
use crate::error::ConnectError;
use crate::factory::{AuthorizationState, ConnectionFactory};

/// Provider id GitHub connections are registered under.
pub const GITHUB_PROVIDER_ID: &str = "github";

pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) const GITHUB_USER_AGENT: &str = concat!("docsite/", env!("CARGO_PKG_VERSION"));

pub(crate) const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// GitHub OAuth application settings.
///
/// Only the credentials and the callback URL are required; the endpoints
/// default to github.com and exist so tests and GitHub Enterprise installs
/// can point elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// OAuth application client ID.
    client_id: String,
    /// OAuth application client secret.
    client_secret: String,
    /// Callback URL registered with the OAuth application,
    /// e.g. "https://docs.example.com/signin/github".
    redirect_uri: String,
    #[serde(default = "default_authorize_url")]
    authorize_url: String,
    #[serde(default = "default_token_url")]
    token_url: String,
    #[serde(default = "default_api_url")]
    api_url: String,
    /// Comma-separated scopes. Default: "read:user"
    #[serde(default = "default_scopes")]
    scopes: String,
    /// Token for server-side REST API calls, e.g. a personal access token.
    #[serde(default)]
    api_token: Option<String>,
}

fn default_authorize_url() -> String {
    "https://github.com/login/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://github.com/login/oauth/access_token".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_scopes() -> String {
    "read:user".to_string()
}

impl GitHubConfig {
    /// Creates a configuration using the public github.com endpoints.
    #[must_use]
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            api_url: default_api_url(),
            scopes: default_scopes(),
            api_token: None,
        }
    }

    /// Overrides the REST API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    /// Sets the token used for server-side REST API calls.
    #[must_use]
    pub fn with_api_token(mut self, api_token: String) -> Self {
        self.api_token = Some(api_token);
        self
    }

    /// Returns the REST API token, if configured.
    #[must_use]
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref().filter(|token| !token.trim().is_empty())
    }

    /// Returns the OAuth client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the callback URL.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the REST API base URL.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns the scopes to request.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// The subset of `GET /user` the sign-in flow uses.
#[derive(Debug, Clone, Deserialize)]
struct GitHubProfile {
    id: u64,
    login: Option<String>,
    html_url: Option<String>,
    avatar_url: Option<String>,
}

impl GitHubProfile {
    fn into_connection(self, access_token: String) -> Connection {
        Connection::new(
            ConnectionKey::new(GITHUB_PROVIDER_ID, self.id.to_string()),
            access_token,
        )
        .with_display_name(self.login.filter(|login| !login.trim().is_empty()))
        .with_profile_url(self.html_url)
        .with_image_url(self.avatar_url)
    }
}

/// Connection factory for github.com (or a GitHub Enterprise host).
pub struct GitHubConnectionFactory {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    scopes: Vec<Scope>,
    api_url: String,
    http_client: reqwest::Client,
}

impl GitHubConnectionFactory {
    /// Creates the factory, validating every configured URL.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::Configuration` if a URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &GitHubConfig) -> Result<Self, ConnectError> {
        let invalid = |what: &str, e: &dyn std::fmt::Display| ConnectError::Configuration {
            provider: GITHUB_PROVIDER_ID.to_string(),
            details: format!("invalid {what}: {e}"),
        };

        let auth_url = AuthUrl::new(config.authorize_url.clone())
            .map_err(|e| invalid("authorize URL", &e))?;
        let token_url =
            TokenUrl::new(config.token_url.clone()).map_err(|e| invalid("token URL", &e))?;
        let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| invalid("redirect URI", &e))?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| invalid("HTTP client", &e))?;

        Ok(Self {
            client_id: ClientId::new(config.client_id.clone()),
            client_secret: ClientSecret::new(config.client_secret.clone()),
            auth_url,
            token_url,
            redirect_url,
            scopes: config
                .scopes()
                .into_iter()
                .map(|s| Scope::new(s.to_string()))
                .collect(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<GitHubProfile, ConnectError> {
        let profile_error = |e: reqwest::Error| ConnectError::Profile {
            provider: GITHUB_PROVIDER_ID.to_string(),
            details: e.to_string(),
        };

        self.http_client
            .get(format!("{}/user", self.api_url))
            .bearer_auth(access_token)
            .header(USER_AGENT, GITHUB_USER_AGENT)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(profile_error)?
            .error_for_status()
            .map_err(profile_error)?
            .json::<GitHubProfile>()
            .await
            .map_err(profile_error)
    }
}

#[async_trait]
impl ConnectionFactory for GitHubConnectionFactory {
    fn provider_id(&self) -> &str {
        GITHUB_PROVIDER_ID
    }

    fn authorization_url(&self) -> (String, AuthorizationState) {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned())
            .set_pkce_challenge(pkce_challenge)
            .url();

        let state = AuthorizationState {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (auth_url.to_string(), state)
    }

    #[instrument(skip_all, fields(provider = GITHUB_PROVIDER_ID))]
    async fn complete(
        &self,
        code: &str,
        state: &AuthorizationState,
    ) -> Result<Connection, ConnectError> {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(state.pkce_verifier.clone()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| ConnectError::TokenExchange {
                provider: GITHUB_PROVIDER_ID.to_string(),
                details: e.to_string(),
            })?;

        let access_token = token.access_token().secret().clone();
        let profile = self.fetch_profile(&access_token).await?;
        debug!(github_id = profile.id, "loaded GitHub profile");

        Ok(profile.into_connection(access_token))
    }
}
