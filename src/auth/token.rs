use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::AuthConfig;

/// Claim set carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
}

/// Issues and validates signed, time-limited access tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: AuthConfig,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn ttl(&self) -> Duration {
        self.config.access_token_ttl
    }

    /// Issue a token for `subject` that expires after the configured TTL.
    pub fn issue(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(subject, Utc::now().timestamp(), self.config.access_token_ttl)
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    pub fn issue_at(
        &self,
        subject: &str,
        now: i64,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: Some(subject.to_string()),
            exp: now + ttl.num_seconds(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        let key = EncodingKey::from_secret(self.config.secret.as_bytes());
        encode(&Header::new(self.config.algorithm), claims, &key)
    }

    /// Validate a token and return its subject.
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate a token against the clock value `now` (unix seconds).
    ///
    /// A token stays valid up to and including its `exp` second.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<String, AuthError> {
        let key = DecodingKey::from_secret(self.config.secret.as_bytes());

        // Expiry is checked below against the supplied clock, without leeway.
        let mut validation = Validation::new(self.config.algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AuthError::Invalid
        })?;

        if now > data.claims.exp {
            return Err(AuthError::Expired);
        }

        data.claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or(AuthError::MissingSubject)
    }
}
