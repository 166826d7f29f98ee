use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default validity window for password-reset tokens.
pub const DEFAULT_RESET_TTL_SECS: i64 = 600;

/// Claims carried by a password-reset token.
#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    /// User id the token is bound to
    sub: String,
    /// Expiration time (unix seconds)
    exp: i64,
    /// Issued at (unix seconds)
    iat: i64,
}

/// Signs and verifies time-limited password-reset tokens (HS256).
///
/// Tokens are encoded rather than stored; they are single-use in
/// intent only: replay inside the validity window is a known gap.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        let mut validation = Validation::default();
        // No leeway: an expired token must verify as expired at once
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Issue a reset token bound to `user_id`, expiring after the
    /// configured validity window.
    pub fn issue(&self, user_id: i32) -> Result<String> {
        let now = Utc::now();
        let claims = ResetClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify a token and return the bound user id. Fails closed: any
    /// decode error, signature mismatch, or expiry yields `None`.
    pub fn verify(&self, token: &str) -> Option<i32> {
        let data = decode::<ResetClaims>(token, &self.decoding_key, &self.validation).ok()?;
        data.claims.sub.parse().ok()
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_round_trip() {
        let signer = TokenSigner::new(b"test-secret", 600);
        let token = signer.issue(42).unwrap();
        assert_eq!(signer.verify(&token), Some(42));
    }

    #[test]
    fn expired_token_verifies_to_none() {
        // Negative TTL: well-signed but already past its expiry
        let signer = TokenSigner::new(b"test-secret", -10);
        let token = signer.issue(42).unwrap();
        assert_eq!(signer.verify(&token), None);
    }

    #[test]
    fn wrong_secret_verifies_to_none() {
        let signer = TokenSigner::new(b"test-secret", 600);
        let other = TokenSigner::new(b"other-secret", 600);
        let token = signer.issue(42).unwrap();
        assert_eq!(other.verify(&token), None);
    }

    #[test]
    fn garbage_verifies_to_none() {
        let signer = TokenSigner::new(b"test-secret", 600);
        assert_eq!(signer.verify("not-a-token"), None);
        assert_eq!(signer.verify(""), None);
    }
}
