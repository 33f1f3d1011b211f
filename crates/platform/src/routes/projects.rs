//! Project route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use hackdeck_core::{HackathonId, ProjectId, Uid};
use hackdeck_store::models::{NewProject, ProjectPatch};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::projects::ProjectService;
use crate::state::AppState;

/// Listing query: at most one of `owner`/`hackathon`, plus a limit.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub owner: Option<String>,
    pub hackathon: Option<String>,
    pub limit: Option<u32>,
}

/// Project creation body.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
    pub title: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tech: Vec<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub hackathon_id: Option<String>,
}

/// Project update body.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub tech: Option<Vec<String>>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
}

/// List projects: by owner, by hackathon, or most recent.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let projects = ProjectService::new(state.firestore());
    let limit = query.limit.unwrap_or(20).min(100);

    let list = match (query.owner, query.hackathon) {
        (Some(owner), None) => projects.list_by_owner(&Uid::new(owner)).await?,
        (None, Some(hackathon)) => {
            projects
                .list_by_hackathon(&HackathonId::new(hackathon))
                .await?
        }
        (None, None) => projects.list_recent(limit).await?,
        (Some(_), Some(_)) => {
            return Err(AppError::BadRequest(
                "filter by owner or hackathon, not both".to_owned(),
            ));
        }
    };

    Ok(Json(json!({ "projects": list })))
}

/// Create a project.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateBody>,
) -> Result<Response> {
    if body.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_owned()));
    }

    let projects = ProjectService::new(state.firestore());
    let project = projects
        .create(&NewProject {
            owner_uid: user.uid,
            title: body.title,
            tagline: body.tagline,
            description: body.description,
            tech: body.tech,
            repo_url: body.repo_url,
            demo_url: body.demo_url,
            hackathon_id: body.hackathon_id.map(HackathonId::new),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "project": project }))).into_response())
}

/// Get a project; counts the view.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let projects = ProjectService::new(state.firestore());
    let project = projects
        .get_counting_view(&ProjectId::new(&*id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("project {id}")))?;
    Ok(Json(json!({ "project": project })))
}

/// Update an owned project.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<serde_json::Value>> {
    let patch = ProjectPatch {
        title: body.title,
        tagline: body.tagline,
        description: body.description,
        tech: body.tech,
        repo_url: body.repo_url,
        demo_url: body.demo_url,
    };

    let projects = ProjectService::new(state.firestore());
    let project = projects
        .update_own(&user.uid, &ProjectId::new(id), &patch)
        .await?;
    Ok(Json(json!({ "project": project })))
}

/// Delete an owned project.
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let projects = ProjectService::new(state.firestore());
    projects.delete_own(&user.uid, &ProjectId::new(id)).await?;
    Ok(Json(json!({ "ok": true })))
}

/// Like a project.
pub async fn like(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let projects = ProjectService::new(state.firestore());
    let changed = projects.like(&user.uid, &ProjectId::new(id)).await?;
    Ok(Json(json!({ "liked": true, "changed": changed })))
}

/// Remove a like.
pub async fn unlike(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let projects = ProjectService::new(state.firestore());
    let changed = projects.unlike(&user.uid, &ProjectId::new(id)).await?;
    Ok(Json(json!({ "liked": false, "changed": changed })))
}

/// Save a project to bookmarks.
pub async fn save(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let projects = ProjectService::new(state.firestore());
    projects.save(&user.uid, &ProjectId::new(id)).await?;
    Ok(Json(json!({ "saved": true })))
}

/// Remove a project bookmark.
pub async fn unsave(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let projects = ProjectService::new(state.firestore());
    projects.unsave(&user.uid, &ProjectId::new(id)).await?;
    Ok(Json(json!({ "saved": false })))
}
