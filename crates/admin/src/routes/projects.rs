//! Project moderation routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;

use hackdeck_core::ProjectId;
use hackdeck_store::db::ProjectRepository;

use crate::error::{AdminError, Result};
use crate::middleware::RequireAdminToken;
use crate::state::AdminState;

/// Listing query.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// Recent projects.
pub async fn list(
    State(state): State<AdminState>,
    _admin: RequireAdminToken,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let projects = ProjectRepository::new(state.firestore());
    let list = projects
        .list_recent(query.limit.unwrap_or(50).min(200))
        .await?;
    Ok(Json(json!({ "projects": list })))
}

/// Remove a project (moderation).
pub async fn destroy(
    State(state): State<AdminState>,
    _admin: RequireAdminToken,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = ProjectId::new(id);
    let projects = ProjectRepository::new(state.firestore());

    if projects.get(&id).await?.is_none() {
        return Err(AdminError::NotFound(format!("project {id}")));
    }
    projects.delete(&id).await?;

    tracing::info!(id = %id, "project removed by admin");
    Ok(Json(json!({ "ok": true })))
}
