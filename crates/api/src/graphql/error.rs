//! Mapping from service errors to GraphQL errors.
//!
//! Every error carries an `extensions.code`. Internal failures are captured
//! to Sentry and replaced by a generic message.

use async_graphql::{Error, ErrorExtensions};

use crate::services::ServiceError;

/// Message for every authorization denial.
pub const NOT_AUTHORISED: &str = "Not Authorised!";
/// Message returned in place of internal error details.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Convert a service error into a client-facing GraphQL error.
#[must_use]
pub fn service_error(err: &ServiceError) -> Error {
    let code = err.code();

    if err.is_internal() {
        let event_id = sentry::capture_error(err);
        tracing::error!(
            error = %err,
            sentry_event_id = %event_id,
            "Request error"
        );
        return Error::new(INTERNAL_MESSAGE).extend_with(|_, e| e.set("code", code));
    }

    Error::new(err.to_string()).extend_with(|_, e| e.set("code", code))
}

/// Error for an argument rejected before reaching a service.
#[must_use]
pub fn invalid_input(field: &'static str, message: &str) -> Error {
    Error::new(message).extend_with(|_, e| {
        e.set("code", "VALIDATION_ERROR");
        e.set("field", field);
    })
}

/// Converts service results for resolvers.
pub trait IntoGraphqlResult<T> {
    /// Map the error side through [`service_error`].
    ///
    /// # Errors
    ///
    /// Returns the mapped GraphQL error.
    fn gql(self) -> async_graphql::Result<T>;
}

impl<T> IntoGraphqlResult<T> for Result<T, ServiceError> {
    fn gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| service_error(&e))
    }
}

#[cfg(test)]
mod tests {
    use async_graphql::Value;
    use campfinder_core::PaginationError;

    use super::*;
    use crate::db::RepositoryError;

    fn has_code(err: &Error, code: &str) -> bool {
        err.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .is_some_and(|value| *value == Value::from(code))
    }

    #[test]
    fn test_user_facing_message_is_kept() {
        let err = service_error(&ServiceError::InvalidArgument(PaginationError::NotPositive));
        assert_eq!(err.message, "Limit and page must be greater than 0");
        assert!(has_code(&err, "INVALID_ARGUMENT"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = service_error(&ServiceError::Repository(RepositoryError::DataCorruption(
            "bad row".to_owned(),
        )));
        assert_eq!(err.message, INTERNAL_MESSAGE);
        assert!(has_code(&err, "INTERNAL_SERVER_ERROR"));
    }
}
