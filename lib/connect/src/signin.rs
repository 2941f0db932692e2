//! Provider sign-in.
//!
//! Resolves a completed `Connection` to exactly one local user and hands it to
//! a `SignInAdapter`, which establishes the authentication.

use docsite_platform_access::{Authentication, AuthenticationError, SecurityContext};
use std::sync::Arc;
use tracing::{info, warn};

use crate::connection::Connection;
use crate::registry::ConnectionFactoryRegistry;
use crate::repository::InMemoryUsersConnectionRepository;

/// Signs a resolved local user in.
///
/// Receives the local user id, the connection it was resolved from, and the
/// request's security context. Returns the URL to continue to, or `None` for
/// the default.
pub type SignInAdapter = Arc<
    dyn Fn(&str, &Connection, &mut SecurityContext) -> Result<Option<String>, AuthenticationError>
        + Send
        + Sync,
>;

/// Adapter that authenticates the user with `ROLE_USER`, the placeholder
/// credentials, and the default post-sign-in destination.
#[must_use]
pub fn user_role_sign_in() -> SignInAdapter {
    Arc::new(sign_in_with_user_role)
}

fn sign_in_with_user_role(
    user_id: &str,
    _connection: &Connection,
    context: &mut SecurityContext,
) -> Result<Option<String>, AuthenticationError> {
    context.set_authentication(Authentication::user(user_id)?);
    Ok(None)
}

/// Provider sign-in: factories, the user mapping, and the adapter.
#[derive(Clone)]
pub struct SignInService {
    registry: Arc<ConnectionFactoryRegistry>,
    repository: Arc<InMemoryUsersConnectionRepository>,
    adapter: SignInAdapter,
}

impl SignInService {
    /// Creates a sign-in service.
    #[must_use]
    pub fn new(
        registry: Arc<ConnectionFactoryRegistry>,
        repository: Arc<InMemoryUsersConnectionRepository>,
        adapter: SignInAdapter,
    ) -> Self {
        Self {
            registry,
            repository,
            adapter,
        }
    }

    /// Returns the connection factory registry.
    #[must_use]
    pub fn registry(&self) -> &ConnectionFactoryRegistry {
        &self.registry
    }

    /// Signs in the local user who owns `connection`.
    ///
    /// On success the context holds the new authentication and the result is
    /// the adapter's redirect URL, if any.
    ///
    /// # Errors
    ///
    /// - `AuthenticationError::IdentityResolution` if no local user owns the
    ///   connection and none could be signed up.
    /// - `AuthenticationError::AmbiguousIdentity` if more than one does.
    pub async fn sign_in(
        &self,
        connection: &Connection,
        context: &mut SecurityContext,
    ) -> Result<Option<String>, AuthenticationError> {
        let provider = connection.key().provider_id().to_string();
        let mut user_ids = self
            .repository
            .find_user_ids_with_connection(connection)
            .await;

        match user_ids.len() {
            0 => {
                warn!(connection = %connection.key(), "connection did not resolve to a local user");
                Err(AuthenticationError::IdentityResolution {
                    provider,
                    reason: "no local user is associated with this account".to_string(),
                })
            }
            1 => {
                let user_id = user_ids.remove(0);
                let redirect = (self.adapter)(&user_id, connection, context)?;
                info!(user_id = %user_id, provider = %provider, "user signed in");
                Ok(redirect)
            }
            _ => {
                warn!(
                    connection = %connection.key(),
                    candidates = user_ids.len(),
                    "connection maps to several local users"
                );
                Err(AuthenticationError::AmbiguousIdentity {
                    provider,
                    candidates: user_ids,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionKey;
    use crate::repository::display_name_sign_up;
    use docsite_platform_access::{CREDENTIALS_PLACEHOLDER, Role};

    fn service(repository: InMemoryUsersConnectionRepository) -> SignInService {
        SignInService::new(
            Arc::new(ConnectionFactoryRegistry::new()),
            Arc::new(repository),
            user_role_sign_in(),
        )
    }

    fn connection(display_name: Option<&str>) -> Connection {
        Connection::new(ConnectionKey::new("github", "1001"), "token")
            .with_display_name(display_name.map(ToString::to_string))
    }

    #[tokio::test]
    async fn display_name_becomes_authenticated_principal() {
        let service = service(InMemoryUsersConnectionRepository::with_sign_up(
            display_name_sign_up(),
        ));
        let mut context = SecurityContext::default();

        let redirect = service
            .sign_in(&connection(Some("Alice")), &mut context)
            .await
            .expect("sign-in succeeds");

        assert!(redirect.is_none());
        let authentication = context.authentication().expect("authenticated");
        assert_eq!(authentication.principal().as_str(), "Alice");
        assert_eq!(authentication.credentials(), CREDENTIALS_PLACEHOLDER);
        assert!(authentication.roles().contains(&Role::user()));
        assert_eq!(authentication.roles().len(), 1);
    }

    #[tokio::test]
    async fn missing_display_name_fails_identity_resolution() {
        let service = service(InMemoryUsersConnectionRepository::with_sign_up(
            display_name_sign_up(),
        ));
        let mut context = SecurityContext::default();

        let err = service
            .sign_in(&connection(None), &mut context)
            .await
            .expect_err("nobody to sign in");

        assert!(matches!(err, AuthenticationError::IdentityResolution { .. }));
        assert!(context.is_anonymous());
    }

    #[tokio::test]
    async fn several_mapped_users_is_ambiguous() {
        let repository = InMemoryUsersConnectionRepository::new();
        let conn = connection(Some("Alice"));
        repository.add_connection("alice", &conn).await;
        repository.add_connection("alice-admin", &conn).await;
        let service = service(repository);
        let mut context = SecurityContext::default();

        let err = service
            .sign_in(&conn, &mut context)
            .await
            .expect_err("ambiguous");

        match err {
            AuthenticationError::AmbiguousIdentity { candidates, .. } => {
                assert_eq!(candidates, vec!["alice", "alice-admin"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(context.is_anonymous());
    }

    #[tokio::test]
    async fn adapter_redirect_is_returned() {
        fn sign_in_to_admin(
            user_id: &str,
            _connection: &Connection,
            context: &mut SecurityContext,
        ) -> Result<Option<String>, AuthenticationError> {
            context.set_authentication(Authentication::user(user_id)?);
            Ok(Some("/admin".to_string()))
        }

        let adapter: SignInAdapter = Arc::new(sign_in_to_admin);
        let service = SignInService::new(
            Arc::new(ConnectionFactoryRegistry::new()),
            Arc::new(InMemoryUsersConnectionRepository::with_sign_up(
                display_name_sign_up(),
            )),
            adapter,
        );
        let mut context = SecurityContext::default();

        let redirect = service
            .sign_in(&connection(Some("Alice")), &mut context)
            .await
            .expect("sign-in succeeds");
        assert_eq!(redirect.as_deref(), Some("/admin"));
    }
}
