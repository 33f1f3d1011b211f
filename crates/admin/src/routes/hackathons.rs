//! Hackathon management routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;

use hackdeck_core::{HackathonId, HackathonStatus};
use hackdeck_store::db::{HackathonListFilter, HackathonRepository};

use crate::error::{AdminError, Result};
use crate::middleware::RequireAdminToken;
use crate::state::AdminState;

/// Listing query.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<HackathonStatus>,
    pub limit: Option<u32>,
}

/// Featured-flag body.
#[derive(Debug, Deserialize)]
pub struct FeatureBody {
    pub featured: bool,
}

/// Hackathon listings, any status.
pub async fn list(
    State(state): State<AdminState>,
    _admin: RequireAdminToken,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let hackathons = HackathonRepository::new(state.firestore());
    let list = hackathons
        .list(&HackathonListFilter {
            status: query.status,
            starts_after: None,
            starts_before: None,
            limit: Some(query.limit.unwrap_or(100).min(200)),
        })
        .await?;
    Ok(Json(json!({ "hackathons": list })))
}

/// Set or unset the featured flag.
pub async fn set_featured(
    State(state): State<AdminState>,
    _admin: RequireAdminToken,
    Path(id): Path<String>,
    Json(body): Json<FeatureBody>,
) -> Result<Json<serde_json::Value>> {
    let id = HackathonId::new(id);
    let hackathons = HackathonRepository::new(state.firestore());

    if hackathons.get(&id).await?.is_none() {
        return Err(AdminError::NotFound(format!("hackathon {id}")));
    }
    hackathons.set_featured(&id, body.featured).await?;

    Ok(Json(json!({ "ok": true, "featured": body.featured })))
}

/// Remove a listing.
pub async fn destroy(
    State(state): State<AdminState>,
    _admin: RequireAdminToken,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = HackathonId::new(id);
    let hackathons = HackathonRepository::new(state.firestore());

    if hackathons.get(&id).await?.is_none() {
        return Err(AdminError::NotFound(format!("hackathon {id}")));
    }
    hackathons.delete(&id).await?;

    tracing::info!(id = %id, "hackathon removed by admin");
    Ok(Json(json!({ "ok": true })))
}
