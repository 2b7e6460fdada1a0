//! Signed bearer tokens handed out on login.

use super::accounts::Account;
use crate::core::{AuthFailure, FilmError, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: u64,
    pub user_email: String,
    pub iat: u64,
    pub exp: u64,
}

/// HS256 signer and verifier sharing one secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self> {
        if secret.is_empty() {
            return Err(FilmError::Internal("token secret must not be empty".into()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn issue(&self, account: &Account) -> Result<String> {
        self.issue_at(account, Utc::now())
    }

    /// Signs a token as if it had been issued at `issued_at`.
    pub fn issue_at(&self, account: &Account, issued_at: DateTime<Utc>) -> Result<String> {
        let iat = u64::try_from(issued_at.timestamp()).unwrap_or(0);
        let claims = Claims {
            user_id: account.id,
            user_email: account.email.clone(),
            iat,
            exp: iat.saturating_add(self.ttl.as_secs()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| FilmError::Internal(format!("Failed to sign token: {err}")))
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| FilmError::Auth(AuthFailure::InvalidToken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "email": "frank@example.com",
            "password": "$2b$04$hash",
            "super": false
        }))
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new("test-secret", DEFAULT_TOKEN_TTL).unwrap();
        let token = issuer.issue(&account()).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.user_email, "frank@example.com");
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new("test-secret", DEFAULT_TOKEN_TTL).unwrap();
        let issued_at = Utc::now() - chrono::Duration::minutes(10);
        let token = issuer.issue_at(&account(), issued_at).unwrap();

        assert!(matches!(
            issuer.verify(&token),
            Err(FilmError::Auth(AuthFailure::InvalidToken))
        ));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let issuer = TokenIssuer::new("test-secret", DEFAULT_TOKEN_TTL).unwrap();
        let other = TokenIssuer::new("other-secret", DEFAULT_TOKEN_TTL).unwrap();
        let token = other.issue(&account()).unwrap();

        assert!(issuer.verify(&token).is_err());
        assert!(issuer.verify("not-a-token").is_err());
    }

    #[test]
    fn test_huge_ttl_saturates_expiry() {
        let issuer = TokenIssuer::new("test-secret", Duration::from_secs(u64::MAX)).unwrap();
        let token = issuer.issue(&account()).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.exp, u64::MAX);
    }

    #[test]
    fn test_empty_secret_refused() {
        assert!(TokenIssuer::new("", DEFAULT_TOKEN_TTL).is_err());
    }

    #[test]
    fn test_claim_names() {
        let claims = Claims {
            user_id: 1,
            user_email: "a@b.c".to_string(),
            iat: 10,
            exp: 20,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["userEmail"], "a@b.c");
    }
}
