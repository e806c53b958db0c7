//! Token issuance and verification
//!
//! Paired access + refresh JWTs signed with HS256. Access and refresh tokens
//! use separate secrets; decoding a token with the wrong secret fails, so a
//! refresh token can never pass as an access token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::models::Admin;

/// Claims carried by both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin ID
    pub sub: i64,
    /// Admin username
    pub username: String,
    /// Unique token ID, so two tokens for the same admin never share bytes
    pub jti: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Access + refresh token pair returned on login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies the two token kinds
pub struct TokenIssuer {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from the auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_secret: config.access_secret.clone(),
            refresh_secret: config.refresh_secret.clone(),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
        }
    }

    /// Issue a short-lived access token for an admin
    pub fn issue_access(&self, admin: &Admin) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(admin, &self.access_secret, self.access_ttl)
    }

    /// Issue a long-lived refresh token for an admin
    pub fn issue_refresh(&self, admin: &Admin) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(admin, &self.refresh_secret, self.refresh_ttl)
    }

    /// Issue a fresh access + refresh pair
    pub fn issue_pair(&self, admin: &Admin) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access_token: self.issue_access(admin)?,
            refresh_token: self.issue_refresh(admin)?,
        })
    }

    /// Decode and validate an access token
    pub fn decode_access(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::decode_with(token, &self.access_secret)
    }

    /// Decode and validate a refresh token
    pub fn decode_refresh(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::decode_with(token, &self.refresh_secret)
    }

    fn issue(
        &self,
        admin: &Admin,
        secret: &str,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: admin.id,
            username: admin.username.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    fn decode_with(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            .map(|data| data.claims)
    }
}
