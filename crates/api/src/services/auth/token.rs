//! Signed, time-limited session tokens.
//!
//! Format: `base64url(claims_json) "." base64url(hmac_sha256(claims_segment))`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use campfinder_core::UserId;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i32,
    iat: i64,
    exp: i64,
}

/// Issues and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct SessionTokens {
    secret: SecretString,
    ttl: Duration,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionTokens {
    #[must_use]
    pub const fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Issue a token for `user_id`, valid for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedToken` if the claims cannot be encoded.
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedToken` if the claims cannot be encoded.
    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.as_i32(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let json = serde_json::to_vec(&claims).map_err(|_| AuthError::MalformedToken)?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(&payload)?.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    /// Verify a token and return the user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `MalformedToken`, `InvalidSignature` or `TokenExpired`.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedToken`, `InvalidSignature` or `TokenExpired`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, AuthError> {
        let (payload, signature) = token.split_once('.').ok_or(AuthError::MalformedToken)?;
        if payload.is_empty() || signature.contains('.') {
            return Err(AuthError::MalformedToken);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::MalformedToken)?;
        self.mac(payload)?
            .verify_slice(&signature)
            .map_err(|_| AuthError::InvalidSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::MalformedToken)?;
        let claims: Claims =
            serde_json::from_slice(&json).map_err(|_| AuthError::MalformedToken)?;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(UserId::new(claims.sub))
    }

    fn mac(&self, payload: &str) -> Result<HmacSha256, AuthError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| AuthError::InvalidSignature)?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tokens() -> SessionTokens {
        SessionTokens::new(
            SecretString::from("k8#mP2$vL9@nQ4&wR7*jT1!bF6^cZ3%hX5".to_string()),
            Duration::hours(1),
        )
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = tokens();
        let token = tokens.issue(UserId::new(42)).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_expired_token() {
        let tokens = tokens();
        let issued = Utc::now() - Duration::hours(2);
        let token = tokens.issue_at(UserId::new(1), issued).unwrap();
        assert_eq!(tokens.verify(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let tokens = tokens();
        let issued = Utc::now();
        let token = tokens.issue_at(UserId::new(1), issued).unwrap();
        let expiry = issued + Duration::hours(1);
        assert_eq!(
            tokens.verify_at(&token, expiry),
            Err(AuthError::TokenExpired)
        );
        assert!(tokens.verify_at(&token, expiry - Duration::seconds(1)).is_ok());
    }

    #[test]
    fn test_wrong_secret() {
        let token = tokens().issue(UserId::new(1)).unwrap();
        let other = SessionTokens::new(
            SecretString::from("a-completely-different-signing-key-0987".to_string()),
            Duration::hours(1),
        );
        assert_eq!(other.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload() {
        let tokens = tokens();
        let token = tokens.issue(UserId::new(1)).unwrap();
        let (_, signature) = token.split_once('.').unwrap();
        let forged_claims = URL_SAFE_NO_PAD.encode(br#"{"sub":2,"iat":0,"exp":9999999999}"#);
        let forged = format!("{forged_claims}.{signature}");
        assert_eq!(tokens.verify(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_malformed_tokens() {
        let tokens = tokens();
        for token in ["", "no-dot", "a.b.c", ".sig", "payload.!!not-base64!!"] {
            assert_eq!(
                tokens.verify(token),
                Err(AuthError::MalformedToken),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_error_messages_are_distinct() {
        assert_eq!(AuthError::MalformedToken.to_string(), "malformed token");
        assert_eq!(AuthError::TokenExpired.to_string(), "token expired");
        assert_ne!(
            AuthError::InvalidSignature.to_string(),
            AuthError::MalformedToken.to_string()
        );
    }
}
