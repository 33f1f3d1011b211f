//! Notification route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;

use hackdeck_core::NotificationId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::notifications::NotificationService;
use crate::state::AppState;

/// Listing query.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread: bool,
}

/// The caller's notifications, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let notifications = NotificationService::new(state.firestore());
    let list = notifications.list(&user.uid, query.unread).await?;
    Ok(Json(json!({ "notifications": list })))
}

/// Mark one notification read.
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let notifications = NotificationService::new(state.firestore());
    let updated = notifications
        .mark_read(&user.uid, &NotificationId::new(&*id))
        .await?;
    if !updated {
        return Err(AppError::NotFound(format!("notification {id}")));
    }
    Ok(Json(json!({ "ok": true })))
}

/// Mark all unread notifications read.
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let notifications = NotificationService::new(state.firestore());
    let updated = notifications.mark_all_read(&user.uid).await?;
    Ok(Json(json!({ "ok": true, "updated": updated })))
}
