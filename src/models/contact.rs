//! Contact message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inbound contact-us message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    /// Unique identifier
    pub id: i64,
    /// Resolved full name ("Anonymous" when no name was supplied)
    pub full_name: String,
    /// Sender email
    pub email: String,
    /// Sender phone number
    pub phone_number: String,
    /// Message body
    pub message: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a contact message
///
/// First and last name are optional; the stored full name is resolved from
/// whichever parts are present.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContactInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub message: String,
}

/// Input for updating a contact message (partial patch)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContactInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub message: Option<String>,
}
