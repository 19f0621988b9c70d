//! Mail delivery for one-time codes.
//!
//! Uses SMTP via lettre for delivery with Askama text and HTML templates.
//! When SMTP is not configured the [`UnconfiguredMailer`] rejects every
//! message, so token flows fail with "Missing SMTP credentials" instead of
//! silently dropping codes.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rand::Rng;
use secrecy::ExposeSecret;
use thiserror::Error;

use campfinder_core::Email;

use crate::config::EmailConfig;
use crate::models::user::TokenPurpose;

/// HTML template for one-time code email.
#[derive(Template)]
#[template(path = "email/one_time_token.html")]
struct OneTimeTokenEmailHtml<'a> {
    heading: &'a str,
    instructions: &'a str,
    code: &'a str,
}

/// Plain text template for one-time code email.
#[derive(Template)]
#[template(path = "email/one_time_token.txt")]
struct OneTimeTokenEmailText<'a> {
    heading: &'a str,
    instructions: &'a str,
    code: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// SMTP settings are absent.
    #[error("Missing SMTP credentials")]
    MissingCredentials,

    /// SMTP transport error.
    #[error("Email delivery failed: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: Email,
    pub subject: String,
    /// Plain text body.
    pub body: String,
    /// Optional HTML alternative.
    pub html: Option<String>,
}

impl OutgoingMail {
    /// Render the email carrying a one-time code.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::Template` if rendering fails.
    pub fn one_time_token(
        to: Email,
        purpose: TokenPurpose,
        code: &str,
    ) -> Result<Self, DeliveryError> {
        let heading = purpose.subject();
        let instructions = match purpose {
            TokenPurpose::ResetPassword => {
                "Use this code to reset your password. It expires in one hour."
            }
            TokenPurpose::ConfirmEmail => "Use this code to confirm your email address.",
        };

        let body = OneTimeTokenEmailText {
            heading,
            instructions,
            code,
        }
        .render()?;
        let html = OneTimeTokenEmailHtml {
            heading,
            instructions,
            code,
        }
        .render()?;

        Ok(Self {
            to,
            subject: heading.to_owned(),
            body,
            html: Some(html),
        })
    }
}

/// Outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    async fn send_mail(&self, mail: OutgoingMail) -> Result<(), DeliveryError>;
}

/// SMTP mailer using a STARTTLS relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::Smtp` if the relay cannot be configured and
    /// `DeliveryError::InvalidAddress` if the sender address is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, DeliveryError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        let address: Address = config
            .from_email
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(config.from_email.clone()))?;
        let name = (!config.from_name.is_empty()).then(|| config.from_name.clone());

        Ok(Self {
            transport,
            from: Mailbox::new(name, address),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_mail(&self, mail: OutgoingMail) -> Result<(), DeliveryError> {
        let to: Mailbox = mail
            .to
            .as_str()
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(mail.to.to_string()))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&mail.subject);

        let message = match &mail.html {
            Some(html) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(mail.body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.clone()),
                    ),
            )?,
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(mail.body.clone())?,
        };

        self.transport.send(message).await?;

        tracing::info!(to = %mail.to, subject = %mail.subject, "Email sent successfully");
        Ok(())
    }
}

/// Mailer used when SMTP settings are absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredMailer;

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send_mail(&self, mail: OutgoingMail) -> Result<(), DeliveryError> {
        tracing::warn!(to = %mail.to, subject = %mail.subject, "SMTP not configured");
        Err(DeliveryError::MissingCredentials)
    }
}

/// Generate a zero-padded 4-digit one-time code.
#[must_use]
pub fn generate_one_time_code() -> String {
    let code: u16 = rand::rng().random_range(0..10_000);
    format!("{code:04}")
}
