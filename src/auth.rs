//! Token issuance and verification for the serving gateway.
//!
//! Tokens are compact HS256 JWTs carrying a subject and an expiry one hour
//! out. Verification is a pure function of the presented header value plus the
//! shared secret: the server keeps no record of issued tokens, so every valid
//! token grants identical access until it expires.

use std::env;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Environment variable holding the token-signing secret.
pub const JWT_SECRET_ENV: &str = "TRIAGE_JWT_SECRET";

/// Insecure fallback secret. A deployment must override it.
const DEFAULT_SECRET: &str = "supersecret";

/// How long an issued token stays valid.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// Decoded token claims: the claimed subject plus the expiry timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
}

/// Shared-secret token configuration, loaded once at process start.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Reads the signing secret from the environment.
    ///
    /// Falls back to a built-in placeholder when unset so the demo runs out of
    /// the box; the fallback is loudly logged.
    pub fn from_env() -> Self {
        match env::var(JWT_SECRET_ENV) {
            Ok(secret) if !secret.is_empty() => Self::new(secret, DEFAULT_TOKEN_TTL),
            _ => {
                log::warn!(
                    "{} is not set; using the insecure built-in secret. \
                     Set it before exposing this server.",
                    JWT_SECRET_ENV
                );
                Self::new(DEFAULT_SECRET, DEFAULT_TOKEN_TTL)
            }
        }
    }

    /// Mints a signed token for the claimed subject.
    ///
    /// Any subject string is accepted, including the empty string; there is no
    /// user store to check against. The token expires `ttl` from now.
    pub fn issue(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: get_current_timestamp() + self.ttl.as_secs(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Validates a presented `Authorization` header value.
    ///
    /// Accepts either a bare token or a case-insensitive `Bearer ` prefix
    /// followed by the token; bare values are trimmed of surrounding
    /// whitespace.
    ///
    /// # Errors
    /// - `MissingToken` if no header value was presented, or it was empty
    /// - `TokenExpired` if the signature is valid but the expiry has passed
    /// - `InvalidToken` for every other structural or signature failure
    pub fn verify(&self, authorization: Option<&str>) -> Result<Claims, AuthError> {
        let raw = authorization.ok_or(AuthError::MissingToken)?;
        if raw.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let token = match raw.get(..7) {
            Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => &raw[7..],
            _ => raw.trim(),
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        // The library only rejects `exp` strictly in the past; a token whose
        // expiry equals the current second must already be dead.
        if claims.exp <= get_current_timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TokenConfig {
        TokenConfig::new("test-secret", DEFAULT_TOKEN_TTL)
    }

    #[test]
    fn test_issue_verify_round_trip() {
        let tokens = config();
        let token = tokens.issue("alice").unwrap();
        let claims = tokens.verify(Some(&token)).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[test]
    fn test_empty_subject_is_accepted() {
        let tokens = config();
        let token = tokens.issue("").unwrap();
        assert_eq!(tokens.verify(Some(&token)).unwrap().sub, "");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(config().verify(None), Err(AuthError::MissingToken));
    }

    #[test]
    fn test_empty_header_counts_as_missing() {
        let tokens = config();
        assert_eq!(tokens.verify(Some("")), Err(AuthError::MissingToken));
        assert_eq!(tokens.verify(Some("   ")), Err(AuthError::MissingToken));
    }

    #[test]
    fn test_garbage_token() {
        assert_eq!(
            config().verify(Some("garbage")),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_bearer_prefix_variants() {
        let tokens = config();
        let token = tokens.issue("bob").unwrap();
        for header in [
            token.clone(),
            format!("Bearer {}", token),
            format!("bearer {}", token),
            format!("BEARER {}", token),
            format!("  {}  ", token),
        ] {
            let claims = tokens.verify(Some(&header)).unwrap();
            assert_eq!(claims.sub, "bob");
        }
    }

    #[test]
    fn test_expired_token() {
        // Backdate the expiry rather than waiting out the window.
        let claims = Claims {
            sub: "carol".into(),
            exp: get_current_timestamp() - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(config().verify(Some(&token)), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_token_expiring_this_second_is_already_expired() {
        // `exp == now` sits on the boundary; it must fail, not squeak past.
        let claims = Claims {
            sub: "carol".into(),
            exp: get_current_timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(config().verify(Some(&token)), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = config().issue("dave").unwrap();
        let other = TokenConfig::new("different-secret", DEFAULT_TOKEN_TTL);
        assert_eq!(other.verify(Some(&token)), Err(AuthError::InvalidToken));
    }
}
