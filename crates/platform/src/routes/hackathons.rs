//! Hackathon route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use hackdeck_core::{HackathonId, HackathonStatus};
use hackdeck_store::db::HackathonListFilter;
use hackdeck_store::models::{HackathonMode, HackathonPatch, NewHackathon};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::applications::ApplicationService;
use crate::services::hackathons::HackathonService;
use crate::services::projects::ProjectService;
use crate::state::AppState;

/// Listing query: status equality plus a start-date range, fixed sort by
/// start date.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<HackathonStatus>,
    pub starts_after: Option<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

/// Hackathon creation body.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub mode: HackathonMode,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub themes: Vec<String>,
    pub prize_pool: Option<String>,
}

/// Hackathon update body.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub mode: Option<HackathonMode>,
    pub location: Option<String>,
    pub status: Option<HackathonStatus>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub themes: Option<Vec<String>>,
    pub prize_pool: Option<String>,
}

/// Application body.
#[derive(Debug, Deserialize)]
pub struct ApplyBody {
    pub motivation: Option<String>,
    pub team_name: Option<String>,
}

/// List hackathons with filters.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let hackathons = HackathonService::new(state.firestore());
    let filter = HackathonListFilter {
        status: query.status,
        starts_after: query.starts_after,
        starts_before: query.starts_before,
        limit: Some(query.limit.unwrap_or(50).min(100)),
    };
    let list = hackathons.list(&filter).await?;
    Ok(Json(json!({ "hackathons": list })))
}

/// Create a hackathon (hosts only).
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateBody>,
) -> Result<Response> {
    if body.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_owned()));
    }
    if body.ends_at <= body.starts_at {
        return Err(AppError::BadRequest("ends_at must be after starts_at".to_owned()));
    }

    let hackathons = HackathonService::new(state.firestore());
    let hackathon = hackathons
        .create(&NewHackathon {
            host_uid: user.uid,
            title: body.title,
            description: body.description,
            mode: body.mode,
            location: body.location,
            starts_at: body.starts_at,
            ends_at: body.ends_at,
            themes: body.themes,
            prize_pool: body.prize_pool,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "hackathon": hackathon }))).into_response())
}

/// Get a hackathon.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let hackathons = HackathonService::new(state.firestore());
    let hackathon = hackathons
        .get(&HackathonId::new(&*id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("hackathon {id}")))?;
    Ok(Json(json!({ "hackathon": hackathon })))
}

/// Update an owned hackathon.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<serde_json::Value>> {
    let patch = HackathonPatch {
        title: body.title,
        description: body.description,
        mode: body.mode,
        location: body.location,
        status: body.status,
        starts_at: body.starts_at,
        ends_at: body.ends_at,
        themes: body.themes,
        prize_pool: body.prize_pool,
    };

    let hackathons = HackathonService::new(state.firestore());
    let hackathon = hackathons
        .update_own(&user.uid, &HackathonId::new(id), &patch)
        .await?;
    Ok(Json(json!({ "hackathon": hackathon })))
}

/// Apply to a hackathon. Sends the confirmation email fire-and-forget.
pub async fn apply(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(body): Json<ApplyBody>,
) -> Result<Response> {
    let applications = ApplicationService::new(state.firestore());
    let application = applications
        .apply(
            &user.uid,
            &HackathonId::new(id),
            body.motivation,
            body.team_name,
            state.email(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "application": application })),
    )
        .into_response())
}

/// Applications for an owned hackathon (host review list).
pub async fn applications(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let applications = ApplicationService::new(state.firestore());
    let list = applications
        .list_for_hackathon(&user.uid, &HackathonId::new(id))
        .await?;
    Ok(Json(json!({ "applications": list })))
}

/// Projects built at a hackathon.
pub async fn projects(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let projects = ProjectService::new(state.firestore());
    let list = projects.list_by_hackathon(&HackathonId::new(id)).await?;
    Ok(Json(json!({ "projects": list })))
}

/// Save a hackathon to bookmarks.
pub async fn save(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let hackathons = HackathonService::new(state.firestore());
    hackathons.save(&user.uid, &HackathonId::new(id)).await?;
    Ok(Json(json!({ "saved": true })))
}

/// Remove a hackathon bookmark.
pub async fn unsave(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let hackathons = HackathonService::new(state.firestore());
    hackathons.unsave(&user.uid, &HackathonId::new(id)).await?;
    Ok(Json(json!({ "saved": false })))
}
