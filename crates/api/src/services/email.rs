//! Email service for password reset messages.
//!
//! Uses SMTP via lettre for delivery with Askama templates. Without SMTP
//! settings the service logs messages instead of sending them, which keeps
//! local development free of a mail server.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetEmailHtml<'a> {
    name: &'a str,
    link: &'a str,
    expires_minutes: i64,
}

/// Plain text template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetEmailText<'a> {
    name: &'a str,
    link: &'a str,
    expires_minutes: i64,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
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

#[derive(Clone)]
enum Transport {
    Smtp {
        mailer: AsyncSmtpTransport<Tokio1Executor>,
        from_address: String,
    },
    Log,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    transport: Transport,
}

impl EmailService {
    /// Create an SMTP-backed email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport: Transport::Smtp {
                mailer,
                from_address: config.from_address.clone(),
            },
        })
    }

    /// Create a service that logs messages instead of sending them.
    #[must_use]
    pub const fn log_only() -> Self {
        Self {
            transport: Transport::Log,
        }
    }

    /// Send a password reset link.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_password_reset(
        &self,
        to: &str,
        name: &str,
        link: &str,
        expires_minutes: i64,
    ) -> Result<(), MailError> {
        let html = PasswordResetEmailHtml {
            name,
            link,
            expires_minutes,
        }
        .render()?;
        let text = PasswordResetEmailText {
            name,
            link,
            expires_minutes,
        }
        .render()?;

        self.send_multipart_email(to, "Reset your Bazaar password", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        let (mailer, from_address) = match &self.transport {
            Transport::Smtp {
                mailer,
                from_address,
            } => (mailer, from_address),
            Transport::Log => {
                tracing::info!(to = %to, subject = %subject, body = %text_body, "SMTP not configured, email not sent");
                return Ok(());
            }
        };

        let email = Message::builder()
            .from(
                from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
