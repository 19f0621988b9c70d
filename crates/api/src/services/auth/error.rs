//! Authentication error types.

use thiserror::Error;

/// Errors from session-token verification and secret hashing.
///
/// Each variant carries a distinct message so logs show why a token was
/// rejected. Clients only ever see "Not Authorised!".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Token is not two base64url segments carrying valid claims.
    #[error("malformed token")]
    MalformedToken,

    /// Signature does not match the payload.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token is past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// No bearer token was supplied.
    #[error("missing token")]
    MissingToken,

    /// Token is valid but its user no longer exists.
    #[error("user not found")]
    UnknownUser,

    /// Secret hashing failed.
    #[error("password hashing error")]
    PasswordHash,
}
