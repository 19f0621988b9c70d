//! Per-request GraphQL context.

use async_graphql::Context;
use tokio::sync::OnceCell;

use super::error::NOT_AUTHORISED;
use crate::models::user::CallerIdentity;
use crate::services::{Authenticator, ServiceError};

/// Bearer token and resolved caller for one request.
///
/// Built fresh for every request; the caller is authenticated at most once.
#[derive(Default)]
pub struct RequestContext {
    token: Option<String>,
    caller: OnceCell<CallerIdentity>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("caller", &self.caller.get())
            .finish()
    }
}

impl RequestContext {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            caller: OnceCell::new(),
        }
    }

    /// Resolve the caller, authenticating on first use.
    ///
    /// # Errors
    ///
    /// Returns the authentication failure; it is never cached.
    pub async fn authenticate(
        &self,
        authenticator: &Authenticator,
    ) -> Result<&CallerIdentity, ServiceError> {
        self.caller
            .get_or_try_init(|| authenticator.authenticate(self.token.as_deref()))
            .await
    }

    /// The caller, if already authenticated.
    #[must_use]
    pub fn caller(&self) -> Option<&CallerIdentity> {
        self.caller.get()
    }
}

/// Caller of a guarded operation.
///
/// The permissions extension authenticates before guarded root fields
/// run, so a missing identity means the field was not guarded.
///
/// # Errors
///
/// Returns `Not Authorised!` when no caller was authenticated.
pub fn caller(ctx: &Context<'_>) -> async_graphql::Result<CallerIdentity> {
    ctx.data_opt::<RequestContext>()
        .and_then(RequestContext::caller)
        .cloned()
        .ok_or_else(|| async_graphql::Error::new(NOT_AUTHORISED))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campfinder_core::Role;

    use super::*;
    use crate::models::user::UserRegistration;
    use crate::test_support::memory_services;

    #[tokio::test]
    async fn test_authenticates_once() {
        let (services, _) = memory_services();
        let user = services
            .users
            .create(UserRegistration {
                name: "Jhon".to_owned(),
                email: "jhon@email.com".to_owned(),
                role: Role::User,
                password: "123456789".to_owned(),
            })
            .await
            .unwrap();
        let token = services.users.tokens().issue(user.id).unwrap();

        let context = RequestContext::new(Some(token));
        assert!(context.caller().is_none());
        let first = context.authenticate(&services.auth).await.unwrap().clone();
        assert_eq!(first.user_id, user.id);
        assert_eq!(context.caller(), Some(&first));
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let (services, _) = memory_services();
        let context = RequestContext::new(None);

        assert!(context.authenticate(&services.auth).await.is_err());
        assert!(context.caller().is_none());
    }
}
