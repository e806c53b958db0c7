//! Admin model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Admin account entity
///
/// Owns blogs, media, and documents. The refresh-token hash is present only
/// while the admin has an active session; logout clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    /// Unique identifier
    pub id: i64,
    /// Unique login name
    pub username: String,
    /// Contact email
    pub email: String,
    /// Argon2id password hash, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Argon2id hash of the active refresh token, never serialized
    #[serde(skip_serializing)]
    pub refresh_token_hash: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}
