//! Contact-us service
//!
//! Stores inbound messages from the public site and notifies staff by mail.
//! Senders supply first and last name separately and optionally; the stored
//! record carries a single resolved full name.

use std::sync::Arc;

use super::mail::MailService;
use super::slug::capitalize_word;
use super::ServiceError;
use crate::db::repositories::{ContactListParams, ContactRepository};
use crate::models::{ContactMessage, CreateContactInput, UpdateContactInput};

/// Fallback name when the sender left both name fields empty
const ANONYMOUS: &str = "Anonymous";

/// Contact message service
pub struct ContactService {
    contacts: Arc<dyn ContactRepository>,
    mail: Arc<MailService>,
}

impl ContactService {
    pub fn new(contacts: Arc<dyn ContactRepository>, mail: Arc<MailService>) -> Self {
        Self { contacts, mail }
    }

    /// List messages with the total match count
    pub async fn list(
        &self,
        params: &ContactListParams,
    ) -> Result<(Vec<ContactMessage>, i64), ServiceError> {
        Ok(self.contacts.list(params).await?)
    }

    /// Get a message by ID
    pub async fn get(&self, id: i64) -> Result<ContactMessage, ServiceError> {
        self.contacts
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Contact message not found".to_string()))
    }

    /// Store a new message and notify staff.
    ///
    /// Mail delivery is best-effort: a failed notification is logged and the
    /// message is still accepted.
    pub async fn create(&self, input: CreateContactInput) -> Result<ContactMessage, ServiceError> {
        let email = input.email.trim();
        let phone = input.phone_number.trim();
        let body = input.message.trim();
        if email.is_empty() {
            return Err(ServiceError::Validation("Email is required".to_string()));
        }
        if body.is_empty() {
            return Err(ServiceError::Validation("Message is required".to_string()));
        }

        let full_name = resolve_full_name(input.first_name.as_deref(), input.last_name.as_deref());

        let message = self.contacts.create(&full_name, email, phone, body).await?;

        if let Err(err) = self.mail.send_contact_notification(&message).await {
            tracing::warn!("Contact notification mail failed: {:#}", err);
        }

        Ok(message)
    }

    /// Apply a partial update to a message.
    ///
    /// The full name is recomputed only when a name part is supplied.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateContactInput,
    ) -> Result<ContactMessage, ServiceError> {
        let existing = self.get(id).await?;

        let full_name = if input.first_name.is_some() || input.last_name.is_some() {
            resolve_full_name(input.first_name.as_deref(), input.last_name.as_deref())
        } else {
            existing.full_name
        };
        let email = input.email.unwrap_or(existing.email);
        let phone_number = input.phone_number.unwrap_or(existing.phone_number);
        let message = input.message.unwrap_or(existing.message);

        self.contacts
            .update(id, &full_name, &email, &phone_number, &message)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Contact message not found".to_string()))
    }

    /// Delete a message
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.contacts.delete(id).await? {
            return Err(ServiceError::NotFound("Contact message not found".to_string()));
        }
        Ok(())
    }
}

/// Resolve the stored full name from optional first/last parts.
///
/// Present parts are capitalized and joined; a lone part stands alone; no
/// parts at all resolve to "Anonymous".
pub fn resolve_full_name(first: Option<&str>, last: Option<&str>) -> String {
    let parts: Vec<String> = [first, last]
        .iter()
        .filter_map(|part| part.map(str::trim).filter(|p| !p.is_empty()))
        .map(capitalize_word)
        .collect();

    if parts.is_empty() {
        ANONYMOUS.to_string()
    } else {
        parts.join(" ")
    }
}
