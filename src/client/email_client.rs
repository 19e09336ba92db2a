use std::time::Duration;

use async_trait::async_trait;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use secrecy::{ExposeSecret, Secret};

use serde::Deserialize;

use crate::domain::EmailAddress;

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS, usually port 587
    StartTls,
    /// Implicit TLS, usually port 465
    Tls,
    /// Unencrypted, for local relays only
    None,
}

#[derive(Debug, thiserror::Error)]
pub enum SendEmailError {
    #[error("Sender credentials are not configured")]
    MissingCredentials,
    #[error("Invalid email address")]
    InvalidAddress(#[source] lettre::address::AddressError),
    #[error("Failed to build email message")]
    Message(#[source] lettre::error::Error),
    #[error("SMTP server rejected the email")]
    Rejected(#[source] lettre::transport::smtp::Error),
    #[error("SMTP transport failure")]
    Transport(#[source] lettre::transport::smtp::Error),
}

impl From<lettre::transport::smtp::Error> for SendEmailError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        if e.is_permanent() || e.is_transient() {
            Self::Rejected(e)
        } else {
            Self::Transport(e)
        }
    }
}

/// A single-recipient, plain-text email
#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub recipient: EmailAddress,
    pub subject: String,
    pub text_body: String,
}

/// Outbound notification channel.
///
/// A send either succeeds or fails once; implementations never retry or queue.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), SendEmailError>;
}

/// Sends email through an SMTP relay with a single process-wide account
pub struct SmtpMailer {
    // Both are absent when no credentials are configured
    sender: Option<Mailbox>,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        security: SmtpSecurity,
        credentials: Option<(String, Secret<String>)>,
        timeout: Duration,
    ) -> Result<Self, SendEmailError> {
        let Some((username, password)) = credentials else {
            tracing::warn!("SMTP credentials are not configured, no email will be sent");
            return Ok(Self {
                sender: None,
                transport: None,
            });
        };

        let sender: Mailbox = username.parse().map_err(SendEmailError::InvalidAddress)?;

        let builder = match security {
            SmtpSecurity::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
            SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };
        let transport = builder
            .port(port)
            .credentials(Credentials::new(
                username,
                password.expose_secret().to_string(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            sender: Some(sender),
            transport: Some(transport),
        })
    }

    fn message(sender: Mailbox, email: &Email) -> Result<Message, SendEmailError> {
        let recipient: Mailbox = email
            .recipient
            .as_ref()
            .parse()
            .map_err(SendEmailError::InvalidAddress)?;

        Message::builder()
            .from(sender)
            .to(recipient)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.text_body.clone())
            .map_err(SendEmailError::Message)
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("sender", &self.sender)
            .field("configured", &self.transport.is_some())
            .finish()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[tracing::instrument(name = "Send an email via SMTP", skip(self, email), fields(recipient = %email.recipient))]
    async fn send(&self, email: &Email) -> Result<(), SendEmailError> {
        let (Some(sender), Some(transport)) = (&self.sender, &self.transport) else {
            return Err(SendEmailError::MissingCredentials);
        };

        let message = Self::message(sender.clone(), email)?;
        transport.send(message).await?;
        Ok(())
    }
}
