//! Mail service
//!
//! Sends templated notification emails over SMTP. When SMTP is not
//! configured the service degrades to a no-op so the calling flow never
//! depends on mail delivery.

use anyhow::{anyhow, Result};
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;
use crate::models::ContactMessage;

/// Outbound mail collaborator
pub struct MailService {
    config: SmtpConfig,
}

impl MailService {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Whether outbound mail is configured and enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.host.is_empty()
    }

    /// Send a notification for a new contact-us submission.
    ///
    /// A disabled configuration short-circuits with a debug log.
    pub async fn send_contact_notification(&self, contact: &ContactMessage) -> Result<()> {
        if !self.is_enabled() {
            tracing::debug!(
                "SMTP disabled, skipping contact notification for '{}'",
                contact.full_name
            );
            return Ok(());
        }

        let subject = format!("New contact message from {}", contact.full_name);
        let body = format!(
            "You have received a new contact message.\n\n\
             Name: {}\nEmail: {}\nPhone: {}\n\nMessage:\n{}\n",
            contact.full_name, contact.email, contact.phone_number, contact.message
        );

        let email = Message::builder()
            .from(
                self.config
                    .from
                    .parse()
                    .map_err(|e| anyhow!("Invalid from address: {}", e))?,
            )
            .to(self
                .config
                .notify_to
                .parse()
                .map_err(|e| anyhow!("Invalid notification recipient: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
                .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
                .credentials(creds)
                .port(self.config.port)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        Ok(())
    }
}
