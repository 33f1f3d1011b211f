//! Dashboard analytics route.

use axum::{Json, extract::State};
use serde_json::json;

use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::services::analytics::AnalyticsService;
use crate::state::AdminState;

/// Collection counts and signup trend.
pub async fn show(
    State(state): State<AdminState>,
    _admin: RequireAdminToken,
) -> Result<Json<serde_json::Value>> {
    let analytics = AnalyticsService::new(state.firestore());
    let stats = analytics.dashboard().await?;
    Ok(Json(json!({ "stats": stats })))
}
