//! Service-level error vocabulary.
//!
//! Messages are user-facing: the GraphQL layer returns them verbatim for
//! every kind except `Repository` and `Internal`.

use thiserror::Error;

use campfinder_core::{BootcampId, Career, PaginationError};

use crate::db::RepositoryError;
use crate::models::user::TokenPurpose;
use crate::services::auth::AuthError;
use crate::services::email::DeliveryError;
use crate::services::geocoder::GeocodeError;

/// Message for a failed login, identical for unknown email and wrong password.
pub const LOGIN_FAILED: &str = "Invalid email or password";
/// Message for a rejected current password.
pub const CREDENTIALS_REJECTED: &str = "Invalid credentials";

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} validation failed: {field}: {message}")]
pub struct ValidationError {
    pub entity: &'static str,
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(entity: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            entity,
            field,
            message: message.into(),
        }
    }
}

/// Rejected one-time code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OneTimeTokenError {
    #[error("{}", invalid_message(.0))]
    Invalid(TokenPurpose),
    #[error("Reset password token expired")]
    Expired,
    #[error("Confirm email token not found")]
    Missing,
}

const fn invalid_message(purpose: &TokenPurpose) -> &'static str {
    match purpose {
        TokenPurpose::ResetPassword => "Invalid reset password token",
        TokenPurpose::ConfirmEmail => "Invalid token",
    }
}

/// Errors returned by the entity services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Entity name, e.g. `"User"`.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Each publisher can own only one bootcamp")]
    OwnershipConflict,

    #[error("{0}")]
    InvalidCredentials(&'static str),

    #[error("Limit and page must be greater than 0")]
    InvalidArgument(#[from] PaginationError),

    #[error("Bootcamp {bootcamp} does not have {subject} career")]
    InvalidSubject {
        bootcamp: BootcampId,
        subject: Career,
    },

    #[error("User is already enrolled in this course")]
    AlreadyEnrolled,

    #[error("User is not enrolled in this course")]
    NotEnrolled,

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Delivery(#[from] DeliveryError),

    #[error("{0}")]
    OneTimeToken(#[from] OneTimeTokenError),

    #[error("Address could not be geocoded: {0}")]
    Geocoding(#[from] GeocodeError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Machine-readable code exposed in GraphQL error extensions.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::OwnershipConflict => "OWNERSHIP_CONFLICT",
            Self::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidSubject { .. } => "INVALID_SUBJECT",
            Self::AlreadyEnrolled => "ALREADY_ENROLLED",
            Self::NotEnrolled => "NOT_ENROLLED",
            Self::Auth(_) => "UNAUTHENTICATED",
            Self::Delivery(_) => "DELIVERY_FAILED",
            Self::OneTimeToken(_) => "INVALID_ONE_TIME_TOKEN",
            Self::Geocoding(_) => "GEOCODING_FAILED",
            Self::Repository(_) | Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Returns `true` for failures whose details must not reach clients.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::Internal(_))
    }
}
