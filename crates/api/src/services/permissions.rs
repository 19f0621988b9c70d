//! Authentication and role rules for root operations.
//!
//! Authorization is two explicit steps: [`Authenticator::authenticate`]
//! turns a bearer token into a [`CallerIdentity`], then [`authorize`]
//! checks that identity against the [`Rule`] returned by [`rule_for`].

use std::sync::Arc;

use campfinder_core::Role;

use super::auth::{AuthError, SessionTokens};
use super::error::ServiceError;
use crate::db::UserStore;
use crate::models::user::CallerIdentity;

/// Access rule attached to a root operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// No identity required.
    Public,
    /// Caller must have the `user` role.
    User,
    /// Caller must have the `publisher` role.
    Publisher,
    /// Caller must be a publisher or a user.
    Authenticated,
}

/// Rule for a root field. Unlisted operations are public.
#[must_use]
pub fn rule_for(parent_type: &str, field: &str) -> Rule {
    match (parent_type, field) {
        ("Query", "user")
        | (
            "Mutation",
            "updatePassword" | "updateUser" | "deleteUser" | "sendConfirmEmailToken"
            | "confirmEmail" | "enrollCourse" | "disenrollCourse",
        ) => Rule::Authenticated,
        (
            "Mutation",
            "addNewBootcamp" | "updateBootcamp" | "deleteBootcamp" | "addNewCourse"
            | "updateCourse" | "deleteCourse",
        ) => Rule::Publisher,
        _ => Rule::Public,
    }
}

/// Returns `true` if the caller satisfies the rule.
#[must_use]
pub const fn authorize(caller: &CallerIdentity, rule: Rule) -> bool {
    match rule {
        Rule::Public | Rule::Authenticated => true,
        Rule::User => matches!(caller.role, Role::User),
        Rule::Publisher => matches!(caller.role, Role::Publisher),
    }
}

/// Resolves bearer tokens to callers.
#[derive(Clone)]
pub struct Authenticator {
    tokens: SessionTokens,
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    #[must_use]
    pub fn new(tokens: SessionTokens, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Verify the token and load the user it names.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Auth` for a missing or rejected token or a
    /// user that no longer exists.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<CallerIdentity, ServiceError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let user_id = self.tokens.verify(token)?;

        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        Ok(CallerIdentity::from(&user))
    }
}
