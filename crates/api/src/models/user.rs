//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use campfinder_core::{Email, Role, UserId};

/// A registered account.
///
/// Implements `Debug` manually so credential hashes never reach logs.
#[derive(Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalized (lowercase) email address, unique across users.
    pub email: Email,
    /// Account role.
    pub role: Role,
    /// Argon2 PHC string of the password.
    pub password_hash: String,
    /// Hash of the outstanding password-reset code, if any.
    pub reset_password_token: Option<String>,
    /// Instant at which the reset code stops being accepted.
    pub reset_password_expire: Option<DateTime<Utc>>,
    /// Hash of the outstanding email-confirmation code, if any.
    pub confirm_email_token: Option<String>,
    /// Whether the email address has been confirmed.
    pub is_email_confirmed: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password_hash", &"[REDACTED]")
            .field(
                "reset_password_token",
                &self.reset_password_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("reset_password_expire", &self.reset_password_expire)
            .field(
                "confirm_email_token",
                &self.confirm_email_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("is_email_confirmed", &self.is_email_confirmed)
            .finish_non_exhaustive()
    }
}

/// Fields required to insert a new user.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub password_hash: String,
}

/// Raw registration payload, validated by the user service.
#[derive(Debug, Clone, Default)]
pub struct UserRegistration {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

/// Partial profile update.
///
/// `None` means the key was not provided and the field is left untouched.
/// `Some("")` is a provided value and is written (and validated) as such.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Purpose of a one-time code sent by email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    /// Code accepted by `reset_password`; expires after one hour.
    ResetPassword,
    /// Code accepted by `confirm_email`; does not expire.
    ConfirmEmail,
}

impl TokenPurpose {
    /// Subject line of the email carrying the code.
    #[must_use]
    pub const fn subject(&self) -> &'static str {
        match self {
            Self::ResetPassword => "Reset password token",
            Self::ConfirmEmail => "Confirm email token",
        }
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResetPassword => f.write_str("reset password"),
            Self::ConfirmEmail => f.write_str("confirm email"),
        }
    }
}

/// Identity of the authenticated caller for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: UserId,
    pub role: Role,
    pub email: Email,
}

impl From<&User> for CallerIdentity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            email: user.email.clone(),
        }
    }
}
