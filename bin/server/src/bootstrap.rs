//! Application startup.
//!
//! Everything is wired here, once, in dependency order: configuration, the
//! documentation service, the connection factory and its registry, the
//! users-connection repository, the sign-in service, the security chain and
//! finally the router. Any failure aborts startup.

use axum::Router;
use docsite_connect::{
    ConnectionFactory, ConnectionFactoryRegistry, GitHubApi, GitHubConnectionFactory,
    InMemoryUsersConnectionRepository, SignInService, display_name_sign_up, user_role_sign_in,
};
use docsite_core::Result;
use docsite_documentation::{ConfigBinder, DocumentationService, ResourceLocations};
use docsite_platform_access::{
    AccessRule, ChainConfigError, EntryPoint, SecurityChain, SecurityPolicy,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::{self, AppState};
use crate::auth::{SIGN_IN_URL, SessionRepository};
use crate::config::{DocumentationConfig, ServerConfig};
use crate::error::StartupError;
use crate::pages::Pages;

/// Arguments applied before the caller's own, which may override them.
pub const DEFAULT_ARGS: [&str; 2] = ["--template.mode=LEGACYHTML5", "--template.cache=false"];

/// Order of the anonymous-only sign-in callback policy.
pub const SIGN_IN_POLICY_ORDER: i32 = i32::MAX - 1;

/// Order of the authenticated admin-area policy.
pub const ADMIN_POLICY_ORDER: i32 = i32::MAX;

/// Parses `--key=value` arguments into configuration overrides.
///
/// # Errors
///
/// Returns `StartupError::InvalidArgument` for anything else, including an
/// empty key.
pub fn parse_args<I, S>(args: I) -> std::result::Result<Vec<(String, String)>, StartupError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| {
            let arg = arg.as_ref();
            arg.strip_prefix("--")
                .and_then(|pair| pair.split_once('='))
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| StartupError::InvalidArgument {
                    argument: arg.to_string(),
                })
        })
        .collect()
}

/// The default flags followed by the caller's arguments.
///
/// Later overrides win, so a caller argument beats a default flag for the
/// same key.
///
/// # Errors
///
/// Returns `StartupError::InvalidArgument` if a caller argument is malformed.
pub fn startup_overrides(
    caller_args: &[String],
) -> std::result::Result<Vec<(String, String)>, StartupError> {
    let mut overrides = parse_args(DEFAULT_ARGS)?;
    overrides.extend(parse_args(caller_args)?);
    Ok(overrides)
}

/// Loads the layered configuration.
///
/// # Errors
///
/// Fails on a malformed argument or invalid configuration.
pub fn load_config(caller_args: &[String]) -> Result<ServerConfig, StartupError> {
    let overrides = startup_overrides(caller_args)?;
    let config = ServerConfig::load(&overrides).map_err(|e| StartupError::Configuration {
        details: e.to_string(),
    })?;
    info!(
        listen_addr = %config.listen_addr,
        template_mode = ?config.template.mode,
        template_cache = config.template.cache,
        "loaded configuration"
    );
    Ok(config)
}

/// Binds the documentation resource onto a fresh service.
///
/// # Errors
///
/// Fails if the resource is missing, unparsable or does not bind cleanly.
pub fn load_documentation(config: &DocumentationConfig) -> Result<DocumentationService, StartupError> {
    let binder = ConfigBinder::new(ResourceLocations::new(config.search_path.clone()));
    let mut documentation = DocumentationService::new();
    binder
        .bind(&config.resource, &mut documentation)
        .map_err(|e| StartupError::Documentation {
            details: e.to_string(),
        })?;
    info!(projects = documentation.len(), "loaded documentation projects");
    Ok(documentation)
}

/// The application's two access policies.
///
/// # Errors
///
/// Returns a `ChainConfigError` if the policies conflict.
pub fn security_chain() -> std::result::Result<SecurityChain, ChainConfigError> {
    SecurityChain::builder()
        .policy(SecurityPolicy::new(
            SIGN_IN_POLICY_ORDER,
            "/signin/github",
            AccessRule::Anonymous,
        )?)
        .policy(
            SecurityPolicy::new(ADMIN_POLICY_ORDER, "/admin/**", AccessRule::Authenticated)?
                .with_entry_point(EntryPoint::login_url(SIGN_IN_URL)),
        )
        .build()
}

/// Builds the application from configuration, talking to GitHub for real.
///
/// # Errors
///
/// Fails if any startup step fails.
pub fn build(config: ServerConfig) -> Result<Application, StartupError> {
    let documentation = load_documentation(&config.documentation)?;
    let github = GitHubConnectionFactory::new(&config.github).map_err(|e| {
        StartupError::ConnectionFactory {
            details: e.to_string(),
        }
    })?;
    let github: Arc<dyn ConnectionFactory> = Arc::new(github);
    assemble(config, documentation, vec![github])
}

/// Assembles the application around the given connection factories.
///
/// # Errors
///
/// Fails if two factories share a provider id or the security chain is
/// inconsistent.
pub fn assemble(
    config: ServerConfig,
    documentation: DocumentationService,
    factories: Vec<Arc<dyn ConnectionFactory>>,
) -> Result<Application, StartupError> {
    let mut registry = ConnectionFactoryRegistry::new();
    for factory in factories {
        registry
            .add_connection_factory(factory)
            .map_err(|e| StartupError::ConnectionFactory {
                details: e.to_string(),
            })?;
    }
    debug!(providers = ?registry.registered_provider_ids(), "registered connection factories");

    let repository = InMemoryUsersConnectionRepository::with_sign_up(display_name_sign_up());
    let sign_in = SignInService::new(Arc::new(registry), Arc::new(repository), user_role_sign_in());

    let github_api = GitHubApi::new(&config.github).map_err(|e| StartupError::Configuration {
        details: e.to_string(),
    })?;

    let chain = security_chain().map_err(|e| StartupError::SecurityChain {
        details: e.to_string(),
    })?;

    let state = Arc::new(AppState {
        sign_in,
        github_api,
        sessions: SessionRepository::new(),
        chain,
        documentation,
        pages: Pages::new(&config.template),
        session_config: config.session.clone(),
    });

    Ok(Application {
        listen_addr: config.listen_addr,
        cleanup_interval: Duration::from_secs(config.session.cleanup_interval_seconds),
        state,
    })
}

/// A fully wired, not yet listening application.
pub struct Application {
    listen_addr: String,
    cleanup_interval: Duration,
    state: Arc<AppState>,
}

impl Application {
    /// Returns the shared state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Returns the configured listen address.
    #[must_use]
    pub fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    /// Builds the router.
    #[must_use]
    pub fn router(&self) -> Router {
        app::router(self.state.clone())
    }

    /// Spawns the periodic expired-session purge.
    pub fn spawn_session_cleanup(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        let period = self.cleanup_interval.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let deleted = state.sessions.delete_expired().await;
                if deleted > 0 {
                    debug!(deleted_sessions = deleted, "Periodic session cleanup");
                }
            }
        })
    }

    /// Binds the listener and serves until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Fails if the address cannot be bound or the server stops with an error.
    pub async fn serve(self) -> Result<(), StartupError> {
        let listener = tokio::net::TcpListener::bind(&self.listen_addr)
            .await
            .map_err(|e| StartupError::Bind {
                addr: self.listen_addr.clone(),
                details: e.to_string(),
            })?;

        info!("listening on http://{}", self.listen_addr);

        axum::serve(listener, self.router().into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| StartupError::Serve {
                details: e.to_string(),
            })?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
