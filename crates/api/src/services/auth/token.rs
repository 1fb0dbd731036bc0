//! Bearer token issuing and verification (JWT, HS256).

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bazaar_core::UserId;

use crate::config::JwtConfig;
use crate::models::User;

/// Errors from issuing or verifying a bearer token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    /// The token is past its `exp`.
    #[error("token expired")]
    Expired,

    /// Bad signature, malformed token or wrong algorithm.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Claims carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user the token was issued to.
    pub sub: UserId,
    pub email: String,
    pub username: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenKeys {
    /// Build keys from configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: config.ttl,
        }
    }

    /// Issue a token for `user`, valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Sign` if encoding fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user.id,
            email: user.email.as_str().to_owned(),
            username: user.username.as_str().to_owned(),
            iat,
            exp: iat.saturating_add(ttl),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens and
    /// `TokenError::Invalid` for anything else that fails verification.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use bazaar_core::{Email, Username};
    use secrecy::SecretString;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(uuid::Uuid::new_v4()),
            email: Email::parse("ada@example.com").unwrap(),
            username: Username::parse("ada").unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = TokenKeys::new(&test_config().jwt);
        let user = user();

        let token = keys.issue(&user).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.username, "ada");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_rejects_other_secret() {
        let keys = TokenKeys::new(&test_config().jwt);
        let mut other = test_config().jwt;
        other.secret = SecretString::from("Zq9#Lm2@Vx7!Rt4$Bn8^Hc3&Kd6*Wp1%");
        let other_keys = TokenKeys::new(&other);

        let token = other_keys.issue(&user()).unwrap();
        assert!(matches!(keys.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_tampered_token() {
        let keys = TokenKeys::new(&test_config().jwt);
        let mut token = keys.issue(&user()).unwrap();
        token.push('x');
        assert!(matches!(keys.verify(&token), Err(TokenError::Invalid(_))));
        assert!(matches!(keys.verify("not-a-jwt"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_expired_token() {
        let keys = TokenKeys::new(&test_config().jwt);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: UserId::new(uuid::Uuid::new_v4()),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();

        assert!(matches!(keys.verify(&token), Err(TokenError::Expired)));
    }
}
