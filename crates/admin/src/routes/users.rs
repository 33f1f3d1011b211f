//! User management routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;

use hackdeck_core::Uid;
use hackdeck_store::db::{ProjectRepository, UserRepository};

use crate::error::{AdminError, Result};
use crate::middleware::RequireAdminToken;
use crate::state::AdminState;

/// Listing query.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// Host-flag body.
#[derive(Debug, Deserialize)]
pub struct SetHostBody {
    pub is_host: bool,
}

/// Recently created profiles.
pub async fn list(
    State(state): State<AdminState>,
    _admin: RequireAdminToken,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let users = UserRepository::new(state.firestore());
    let list = users.list_recent(query.limit.unwrap_or(50).min(200)).await?;
    Ok(Json(json!({ "users": list })))
}

/// Profile detail with the user's projects.
pub async fn show(
    State(state): State<AdminState>,
    _admin: RequireAdminToken,
    Path(uid): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let uid = Uid::new(uid);
    let profile = UserRepository::new(state.firestore())
        .get(&uid)
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("user {uid}")))?;
    let projects = ProjectRepository::new(state.firestore())
        .list_by_owner(&uid)
        .await?;

    Ok(Json(json!({ "user": profile, "projects": projects })))
}

/// Grant or revoke host privileges (approves host requests).
pub async fn set_host(
    State(state): State<AdminState>,
    _admin: RequireAdminToken,
    Path(uid): Path<String>,
    Json(body): Json<SetHostBody>,
) -> Result<Json<serde_json::Value>> {
    let uid = Uid::new(uid);
    let users = UserRepository::new(state.firestore());

    if users.get(&uid).await?.is_none() {
        return Err(AdminError::NotFound(format!("user {uid}")));
    }
    users.set_host(&uid, body.is_host).await?;

    tracing::info!(uid = %uid, is_host = body.is_host, "host flag updated");
    Ok(Json(json!({ "ok": true, "is_host": body.is_host })))
}
