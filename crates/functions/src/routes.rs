//! HTTP handlers for the three email functions.
//!
//! Each endpoint is stateless: a JSON body of plain fields in, a
//! success/error JSON envelope out. Callers invoke these fire-and-forget;
//! a failed send is reported in the envelope and never retried here.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::email::EmailError;
use crate::state::FnState;

/// The envelope every function returns.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Welcome email body.
#[derive(Debug, Deserialize)]
pub struct WelcomeBody {
    pub to: String,
    #[serde(default)]
    pub name: String,
}

/// Application confirmation email body.
#[derive(Debug, Deserialize)]
pub struct ApplicationConfirmationBody {
    pub to: String,
    #[serde(default)]
    pub name: String,
    pub hackathon_title: String,
}

/// Host request email body.
#[derive(Debug, Deserialize)]
pub struct HostRequestBody {
    pub to: String,
    pub requester_email: String,
    #[serde(default)]
    pub requester_name: String,
    #[serde(default)]
    pub message: String,
}

/// `POST /email/welcome`
pub async fn welcome(
    State(state): State<FnState>,
    Json(body): Json<WelcomeBody>,
) -> impl IntoResponse {
    let name = if body.name.is_empty() { "there" } else { &body.name };
    envelope(state.email().send_welcome(&body.to, name).await)
}

/// `POST /email/application-confirmation`
pub async fn application_confirmation(
    State(state): State<FnState>,
    Json(body): Json<ApplicationConfirmationBody>,
) -> impl IntoResponse {
    let name = if body.name.is_empty() { "there" } else { &body.name };
    envelope(
        state
            .email()
            .send_application_confirmation(&body.to, name, &body.hackathon_title)
            .await,
    )
}

/// `POST /email/host-request`
pub async fn host_request(
    State(state): State<FnState>,
    Json(body): Json<HostRequestBody>,
) -> impl IntoResponse {
    envelope(
        state
            .email()
            .send_host_request(
                &body.to,
                &body.requester_email,
                &body.requester_name,
                &body.message,
            )
            .await,
    )
}

/// Map a send result to the response envelope.
fn envelope(result: Result<(), EmailError>) -> (StatusCode, Json<Envelope>) {
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(Envelope {
                success: true,
                error: None,
            }),
        ),
        Err(err) => {
            tracing::error!(error = %err, "email send failed");
            sentry::capture_error(&err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Envelope {
                    success: false,
                    error: Some(err.to_string()),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serialization() {
        let ok = serde_json::to_value(Envelope {
            success: true,
            error: None,
        })
        .expect("serialize");
        assert_eq!(ok, serde_json::json!({ "success": true }));

        let err = serde_json::to_value(Envelope {
            success: false,
            error: Some("smtp down".to_owned()),
        })
        .expect("serialize");
        assert_eq!(
            err,
            serde_json::json!({ "success": false, "error": "smtp down" })
        );
    }
}
