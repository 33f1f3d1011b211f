//! Client for the transactional email functions.
//!
//! The functions service exposes three stateless HTTP endpoints (welcome,
//! application confirmation, host request). Every send here is
//! fire-and-forget: the caller's user flow never blocks on, or fails
//! because of, email delivery. Failures are logged and dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the email functions service.
#[derive(Debug, Error)]
pub enum EmailError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The function returned an error envelope.
    #[error("email function error: {0}")]
    Function(String),
}

/// Success/error envelope returned by every email function.
#[derive(Debug, Deserialize)]
struct FunctionResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct WelcomeBody<'a> {
    to: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct ApplicationConfirmationBody<'a> {
    to: &'a str,
    name: &'a str,
    hackathon_title: &'a str,
}

#[derive(Debug, Serialize)]
struct HostRequestBody<'a> {
    to: &'a str,
    requester_email: &'a str,
    requester_name: &'a str,
    message: &'a str,
}

/// Client for the email functions service.
///
/// Constructed without a base URL (local development, tests), every send is
/// a logged no-op.
#[derive(Clone)]
pub struct EmailClient {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl EmailClient {
    /// Create a new email client. `base_url` of `None` disables sending.
    #[must_use]
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Queue a welcome email after registration. Fire-and-forget.
    pub fn fire_welcome(&self, to: &str, name: &str) {
        self.fire(
            "welcome",
            serde_json::to_value(WelcomeBody { to, name }).unwrap_or_default(),
        );
    }

    /// Queue an application confirmation email. Fire-and-forget.
    pub fn fire_application_confirmation(&self, to: &str, name: &str, hackathon_title: &str) {
        self.fire(
            "application-confirmation",
            serde_json::to_value(ApplicationConfirmationBody {
                to,
                name,
                hackathon_title,
            })
            .unwrap_or_default(),
        );
    }

    /// Queue a host-request email to the platform operators.
    /// Fire-and-forget.
    pub fn fire_host_request(
        &self,
        to: &str,
        requester_email: &str,
        requester_name: &str,
        message: &str,
    ) {
        self.fire(
            "host-request",
            serde_json::to_value(HostRequestBody {
                to,
                requester_email,
                requester_name,
                message,
            })
            .unwrap_or_default(),
        );
    }

    /// Spawn the send in the background and log the outcome. Delivery
    /// failure is never fatal to the triggering user action.
    fn fire(&self, endpoint: &'static str, body: serde_json::Value) {
        let Some(base_url) = self.base_url.clone() else {
            tracing::debug!(endpoint, "email functions not configured, skipping send");
            return;
        };
        let client = self.client.clone();

        tokio::spawn(async move {
            match send(&client, &base_url, endpoint, &body).await {
                Ok(()) => tracing::debug!(endpoint, "email dispatched"),
                Err(err) => tracing::warn!(endpoint, error = %err, "email send failed"),
            }
        });
    }
}

async fn send(
    client: &reqwest::Client,
    base_url: &str,
    endpoint: &str,
    body: &serde_json::Value,
) -> Result<(), EmailError> {
    let response = client
        .post(format!("{base_url}/email/{endpoint}"))
        .json(body)
        .send()
        .await?;

    let envelope: FunctionResponse = response.json().await?;
    if envelope.success {
        Ok(())
    } else {
        Err(EmailError::Function(
            envelope.error.unwrap_or_else(|| "unknown error".to_owned()),
        ))
    }
}
