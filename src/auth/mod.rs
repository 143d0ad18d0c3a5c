pub mod password;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SigningKey;
use crate::database::models::User;

/// Sessions are valid for a fixed two hours from issuance
pub const SESSION_LIFETIME_HOURS: i64 = 2;

/// Verified payload of a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: u64,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    fn new(user: &User, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id: user.id,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0).single().unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No token provided.")]
    Missing,

    #[error("Invalid token.")]
    Invalid,

    #[error("Token expired.")]
    Expired,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Mints and verifies HS256 session tokens with a configured key
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl SessionIssuer {
    pub fn new(key: &SigningKey) -> Result<Self, AuthError> {
        if key.is_empty() {
            return Err(AuthError::Signing("signing key is empty".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
            lifetime: Duration::hours(SESSION_LIFETIME_HOURS),
        })
    }

    /// Override the token lifetime. Only tests need anything but the default.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn mint(&self, user: &User) -> Result<String, AuthError> {
        let claims = SessionClaims::new(user, self.lifetime);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: Option<&str>) -> Result<SessionClaims, AuthError> {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::Missing),
        };

        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => {
                    tracing::debug!("Rejected session token: {}", e);
                    AuthError::Invalid
                }
            })
    }
}
