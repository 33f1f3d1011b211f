//! Account route handlers: own profile, achievements, saved items, and
//! account deletion.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use hackdeck_store::db::{AchievementRepository, EngagementRepository};
use hackdeck_store::models::UserProfilePatch;

use crate::error::{AppError, Result, clear_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user};
use crate::services::account::AccountService;
use crate::services::hackathons::HackathonService;
use crate::services::profiles::ProfileService;
use crate::state::AppState;

/// Profile update body; absent fields stay unchanged, empty strings clear.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateBody {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub role: Option<String>,
    pub github_url: Option<String>,
    pub website_url: Option<String>,
}

/// Host request body.
#[derive(Debug, Deserialize)]
pub struct HostRequestBody {
    #[serde(default)]
    pub message: String,
}

/// Get the caller's profile.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let profiles = ProfileService::new(state.firestore());
    let profile = profiles
        .get(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("profile".to_owned()))?;
    Ok(Json(json!({ "user": profile })))
}

/// Update the caller's profile; recomputes the completeness score.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ProfileUpdateBody>,
) -> Result<Json<serde_json::Value>> {
    let patch = UserProfilePatch {
        display_name: body.display_name,
        bio: body.bio,
        skills: body.skills,
        avatar_url: body.avatar_url,
        location: body.location,
        role: body.role,
        github_url: body.github_url,
        website_url: body.website_url,
    };

    let profiles = ProfileService::new(state.firestore());
    let profile = profiles
        .update(&user.uid, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("profile".to_owned()))?;
    Ok(Json(json!({ "user": profile })))
}

/// The caller's achievements.
pub async fn achievements(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let achievements = AchievementRepository::new(state.firestore())
        .list_for(&user.uid)
        .await
        .map_err(AppError::Repository)?;
    Ok(Json(json!({ "achievements": achievements })))
}

/// The caller's saved items.
pub async fn saved(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let saved = EngagementRepository::new(state.firestore())
        .list_saved(&user.uid)
        .await
        .map_err(AppError::Repository)?;
    Ok(Json(json!({ "saved": saved })))
}

/// Request host privileges. Fires the host-request email to the operators.
pub async fn host_request(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<HostRequestBody>,
) -> Result<Json<serde_json::Value>> {
    let hackathons = HackathonService::new(state.firestore());
    hackathons
        .request_host(
            &user.uid,
            &body.message,
            state.email(),
            state.config().admin_notify_email.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// Delete the caller's account.
///
/// Best-effort per-collection cascade with no rollback; the identity is
/// removed at the provider last. The response reports what was cleaned up
/// and which collections failed.
pub async fn delete_account(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let account = AccountService::new(state.provider(), state.firestore());
    let report = account.delete_account(&user.uid, &user.id_token).await?;

    state.tracker().remove(&user.uid);
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    clear_sentry_user();

    Ok(Json(json!({ "deleted": true, "report": report })))
}
