//! Stateless session credentials.
//!
//! Issues and verifies signed, time-limited session tokens (HS256 JWTs).
//! No state is kept between calls; verification is a pure function of the
//! token and the process-wide signing secret, which is read-only after
//! startup. Tokens are never persisted server-side.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use petalcart_core::{Email, UserId, UserRole};

/// Credential lifetime: 24 hours, matching the cookie max-age.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Errors from the token service.
///
/// Every verification failure collapses into `Invalid` - callers must not be
/// able to distinguish a forged signature from an expired credential.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed token, signature mismatch, or expiry elapsed.
    #[error("invalid or expired credential")]
    Invalid,
    /// Token could not be signed (should not happen with a valid secret).
    #[error("failed to sign credential")]
    Signing,
}

/// Claims embedded in a session credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account ID.
    pub sub: UserId,
    /// Account email - the owning-identity key for all privileged calls.
    pub email: Email,
    /// Account role.
    pub role: UserRole,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Issues and verifies session credentials.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create a token service from the signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no clock leeway
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Issue a credential for an authenticated account.
    ///
    /// Embeds a 24-hour expiry from the moment of issuance.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the claims cannot be encoded.
    pub fn issue(&self, id: UserId, email: &Email, role: UserRole) -> Result<String, TokenError> {
        self.issue_with_ttl(id, email, role, TOKEN_TTL_SECS)
    }

    fn issue_with_ttl(
        &self,
        id: UserId,
        email: &Email,
        role: UserRole,
        ttl_secs: i64,
    ) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: id,
            email: email.clone(),
            role,
            iat,
            exp: iat + ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Signing)
    }

    /// Verify a credential and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` on a malformed token, a signature
    /// mismatch, or an elapsed expiry.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("kD8#mQ2$vX9!pL4@wN7%rT1&yU5^zB3*"))
    }

    fn email() -> Email {
        Email::parse("a@x.com").unwrap()
    }

    #[test]
    fn test_issue_then_verify_roundtrip() {
        let tokens = service();
        let id = UserId::generate();

        let token = tokens.issue(id, &email(), UserRole::Customer).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.email, email());
        assert_eq!(claims.role, UserRole::Customer);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let tokens = service();
        let token = tokens
            .issue_with_ttl(UserId::generate(), &email(), UserRole::Customer, -3600)
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let tokens = service();
        assert!(matches!(
            tokens.verify("not-a-token"),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(tokens.verify(""), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let tokens = service();
        let other = TokenService::new(&SecretString::from("qW3#eR5$tY7!uI9@oP1%aS2&dF4^gH6*"));

        let token = tokens
            .issue(UserId::generate(), &email(), UserRole::Customer)
            .unwrap();

        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }
}
