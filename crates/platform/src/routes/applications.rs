//! Application route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::json;

use hackdeck_core::{ApplicationId, ApplicationStatus};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::applications::ApplicationService;
use crate::state::AppState;

/// Status transition body.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: ApplicationStatus,
}

/// The caller's applications.
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let applications = ApplicationService::new(state.firestore());
    let list = applications.list_mine(&user.uid).await?;
    Ok(Json(json!({ "applications": list })))
}

/// Move an application to a new review status (host decision, or applicant
/// withdrawal via the `withdrawn` status).
pub async fn set_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<serde_json::Value>> {
    let applications = ApplicationService::new(state.firestore());
    let application = applications
        .transition(&user.uid, &ApplicationId::new(id), body.status)
        .await?;
    Ok(Json(json!({ "application": application })))
}

/// Withdraw the caller's application.
pub async fn withdraw(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let applications = ApplicationService::new(state.firestore());
    let application = applications
        .withdraw(&user.uid, &ApplicationId::new(id))
        .await?;
    Ok(Json(json!({ "application": application })))
}
