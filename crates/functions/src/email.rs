//! Email delivery service.
//!
//! Uses SMTP via lettre for delivery with Askama HTML + plain text
//! templates. One method per transactional email.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for the welcome email.
#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeHtml<'a> {
    name: &'a str,
    platform_url: &'a str,
}

/// Plain text template for the welcome email.
#[derive(Template)]
#[template(path = "email/welcome.txt")]
struct WelcomeText<'a> {
    name: &'a str,
    platform_url: &'a str,
}

/// HTML template for the application confirmation email.
#[derive(Template)]
#[template(path = "email/application_confirmation.html")]
struct ApplicationConfirmationHtml<'a> {
    name: &'a str,
    hackathon_title: &'a str,
    platform_url: &'a str,
}

/// Plain text template for the application confirmation email.
#[derive(Template)]
#[template(path = "email/application_confirmation.txt")]
struct ApplicationConfirmationText<'a> {
    name: &'a str,
    hackathon_title: &'a str,
    platform_url: &'a str,
}

/// HTML template for the host request email.
#[derive(Template)]
#[template(path = "email/host_request.html")]
struct HostRequestHtml<'a> {
    requester_name: &'a str,
    requester_email: &'a str,
    message: &'a str,
}

/// Plain text template for the host request email.
#[derive(Template)]
#[template(path = "email/host_request.txt")]
struct HostRequestText<'a> {
    requester_name: &'a str,
    requester_email: &'a str,
    message: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
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

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    platform_url: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay is misconfigured.
    pub fn new(config: &EmailConfig, platform_url: &str) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            platform_url: platform_url.to_owned(),
        })
    }

    /// Send the welcome email after registration.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_welcome(&self, to: &str, name: &str) -> Result<(), EmailError> {
        let html = WelcomeHtml {
            name,
            platform_url: &self.platform_url,
        }
        .render()?;
        let text = WelcomeText {
            name,
            platform_url: &self.platform_url,
        }
        .render()?;

        self.send_multipart_email(to, "Welcome to HackDeck", &text, &html)
            .await
    }

    /// Send the application confirmation email.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_application_confirmation(
        &self,
        to: &str,
        name: &str,
        hackathon_title: &str,
    ) -> Result<(), EmailError> {
        let html = ApplicationConfirmationHtml {
            name,
            hackathon_title,
            platform_url: &self.platform_url,
        }
        .render()?;
        let text = ApplicationConfirmationText {
            name,
            hackathon_title,
            platform_url: &self.platform_url,
        }
        .render()?;

        self.send_multipart_email(
            to,
            &format!("Application received: {hackathon_title}"),
            &text,
            &html,
        )
        .await
    }

    /// Send the host request email to the platform operators.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_host_request(
        &self,
        to: &str,
        requester_email: &str,
        requester_name: &str,
        message: &str,
    ) -> Result<(), EmailError> {
        let html = HostRequestHtml {
            requester_name,
            requester_email,
            message,
        }
        .render()?;
        let text = HostRequestText {
            requester_name,
            requester_email,
            message,
        }
        .render()?;

        self.send_multipart_email(to, "New host request", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
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

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
