//! Bearer token extraction.
//!
//! The token is only read here. Verification happens in the GraphQL
//! permissions extension, and only for guarded operations.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

/// Token from an `Authorization: Bearer <token>` header, if any.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(BearerToken(token): BearerToken) -> impl IntoResponse {
///     format!("token present: {}", token.is_some())
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    /// Parse an `Authorization` header value.
    #[must_use]
    pub fn from_header(value: &str) -> Self {
        let token = value
            .split_once(' ')
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim())
            .filter(|token| !token.is_empty())
            .map(str::to_owned);
        Self(token)
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(Self::from_header)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_scheme() {
        assert_eq!(
            BearerToken::from_header("Bearer abc.def"),
            BearerToken(Some("abc.def".to_owned()))
        );
        assert_eq!(
            BearerToken::from_header("bearer abc.def"),
            BearerToken(Some("abc.def".to_owned()))
        );
    }

    #[test]
    fn test_other_schemes_and_blank_tokens() {
        assert_eq!(BearerToken::from_header("Basic dXNlcjpwYXNz"), BearerToken(None));
        assert_eq!(BearerToken::from_header("Bearer "), BearerToken(None));
        assert_eq!(BearerToken::from_header("abc.def"), BearerToken(None));
    }
}
