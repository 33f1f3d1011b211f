//! Authentication route handlers.
//!
//! Registration, password and Google sign-in, the account-linking flow,
//! link/unlink management, and session introspection.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use hackdeck_core::SignInMethod;
use hackdeck_store::identity::AuthSession;
use hackdeck_store::models::UserProfile;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    clear_current_user, load_link_flow, set_current_user, store_link_flow,
};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::services::auth::{
    AuthError, AuthService, AuthSnapshot, FederatedOutcome, LinkConflict, LinkCredential,
    RegisterOutcome,
};
use crate::services::profiles::ProfileService;
use crate::state::AppState;

// =============================================================================
// Request bodies
// =============================================================================

/// Registration body.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Password sign-in body.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Federated sign-in body: the Google id token obtained client-side.
#[derive(Debug, Deserialize)]
pub struct GoogleBody {
    pub id_token: String,
}

/// Linking confirmation body. Which fields are required depends on the
/// detected conflict: the password for the password side, the Google id
/// token for the Google side.
#[derive(Debug, Deserialize)]
pub struct ConfirmLinkBody {
    pub password: Option<String>,
    pub google_id_token: Option<String>,
}

/// Unlink body.
#[derive(Debug, Deserialize)]
pub struct UnlinkBody {
    pub method: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register with email and password.
///
/// A cross-method conflict does not create a second account; it starts the
/// linking flow and returns the confirmation prompt with `409`.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterBody>,
) -> Result<Response> {
    let auth = AuthService::new(state.provider(), state.firestore());
    // A fresh attempt supersedes any linking flow left on the session.
    let mut flow = load_link_flow(&session).await;
    flow.reset();

    let outcome = auth
        .register(
            &mut flow,
            &body.email,
            &body.password,
            body.display_name.as_deref(),
        )
        .await;
    store_link_flow(&session, &flow)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    match outcome? {
        RegisterOutcome::Registered { session: auth_session, profile } => {
            state.email().fire_welcome(
                auth_session.email.as_str(),
                profile.display_name.as_deref().unwrap_or("there"),
            );
            establish_session(&state, &session, &auth_session).await?;
            Ok((StatusCode::CREATED, Json(json!({ "user": profile }))).into_response())
        }
        RegisterOutcome::ConflictDetected(conflict) => Ok(conflict_response(&conflict)),
    }
}

/// Sign in with email and password.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginBody>,
) -> Result<Response> {
    let auth = AuthService::new(state.provider(), state.firestore());

    let (auth_session, profile) = auth
        .sign_in_with_password(&body.email, &body.password)
        .await?;
    establish_session(&state, &session, &auth_session).await?;

    Ok(Json(json!({ "user": profile })).into_response())
}

/// Sign in with a Google id token.
///
/// First federated sign-in creates the profile; an account under the same
/// email with different credentials starts the linking flow.
pub async fn google(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<GoogleBody>,
) -> Result<Response> {
    let auth = AuthService::new(state.provider(), state.firestore());
    // A fresh attempt supersedes any linking flow left on the session.
    let mut flow = load_link_flow(&session).await;
    flow.reset();

    let outcome = auth.sign_in_with_google(&mut flow, &body.id_token).await;
    store_link_flow(&session, &flow)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    match outcome? {
        FederatedOutcome::SignedIn { session: auth_session, profile } => {
            establish_session(&state, &session, &auth_session).await?;
            Ok(Json(json!({ "user": profile })).into_response())
        }
        FederatedOutcome::ConflictDetected(conflict) => Ok(conflict_response(&conflict)),
    }
}

/// Complete a confirmed linking flow.
///
/// Re-authenticates with the pre-existing method and attaches the new
/// credential; any failed step returns a generic retry message and resets
/// the flow.
pub async fn confirm_link(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<ConfirmLinkBody>,
) -> Result<Response> {
    let auth = AuthService::new(state.provider(), state.firestore());
    let mut flow = load_link_flow(&session).await;

    let Some(conflict) = flow.conflict().cloned() else {
        return Err(AuthError::InvalidLinkState.into());
    };
    let existing = credential_for(
        preferred_existing_method(&conflict),
        &conflict,
        &body,
    )?;
    let new = credential_for(conflict.attempted, &conflict, &body)?;

    let outcome = auth.confirm_link(&mut flow, existing, new).await;
    // Terminal either way; the session never keeps a dead flow.
    flow.reset();
    store_link_flow(&session, &flow)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let outcome = outcome?;

    let profiles = ProfileService::new(state.firestore());
    let profile: UserProfile = profiles
        .get(&outcome.session.uid)
        .await?
        .ok_or(AppError::Auth(AuthError::ProfileUnavailable))?;

    establish_session(&state, &session, &outcome.session).await?;
    Ok(Json(json!({
        "user": profile,
        "linked_methods": outcome.methods,
    }))
    .into_response())
}

/// Abandon a pending linking flow.
pub async fn cancel_link(session: Session) -> Result<Json<serde_json::Value>> {
    store_link_flow(&session, &crate::services::auth::LinkingFlow::Idle)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(json!({ "ok": true })))
}

/// Detach a sign-in method.
///
/// The last-method guard runs against the session's local provider list
/// before any provider call.
pub async fn unlink(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(body): Json<UnlinkBody>,
) -> Result<Json<serde_json::Value>> {
    let method = SignInMethod::parse(&body.method)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let auth = AuthService::new(state.provider(), state.firestore());
    let remaining = auth
        .unlink(&user.uid, &user.providers, &user.id_token, method)
        .await?;

    // Refresh the session snapshot so subsequent local guards see the new
    // list.
    let mut user = user;
    user.providers.clone_from(&remaining);
    set_current_user(&session, &user)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "linked_methods": remaining,
        "can_unlink": remaining.len() >= 2,
    })))
}

/// The live linked-method list for the signed-in user.
///
/// Read from the provider at render time, not from the cached profile
/// field.
pub async fn methods(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let auth = AuthService::new(state.provider(), state.firestore());
    let methods = auth.linked_accounts(&user.id_token).await?;

    Ok(Json(json!({
        "linked_methods": methods,
        "can_unlink": methods.len() >= 2,
    })))
}

/// Sign out.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<serde_json::Value>> {
    if let Some(user) = user {
        state.tracker().signed_out(&user.uid);
    }
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    clear_sentry_user();

    Ok(Json(json!({ "ok": true })))
}

/// The resolved auth state for this session.
///
/// `resolving` means the profile fetch is still in flight; a session whose
/// profile fetch failed reads as `signed_out`.
pub async fn me(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<serde_json::Value>> {
    let Some(user) = user else {
        return Ok(Json(json!({ "state": "signed_out" })));
    };

    let snapshot = state.tracker().snapshot(&user.uid);
    let response = match snapshot {
        AuthSnapshot::Unresolved => {
            // Tracker state is gone (e.g. process restart). Re-resolve from
            // the session cookie; the caller polls until it settles.
            drop(state.tracker().signed_in(session_from_cookie(&user)));
            json!({ "state": "resolving" })
        }
        AuthSnapshot::Resolving { .. } => json!({ "state": "resolving" }),
        AuthSnapshot::SignedOut => json!({ "state": "signed_out" }),
        AuthSnapshot::SignedIn { profile, .. } => json!({
            "state": "signed_in",
            "user": profile,
        }),
    };

    Ok(Json(response))
}

// =============================================================================
// Helpers
// =============================================================================

/// Store the session cookie state and kick off profile resolution.
async fn establish_session(
    state: &AppState,
    session: &Session,
    auth_session: &AuthSession,
) -> Result<()> {
    let user = CurrentUser::from_auth_session(auth_session);
    set_current_user(session, &user)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    set_sentry_user(&auth_session.uid, Some(auth_session.email.as_str()));
    drop(state.tracker().signed_in(auth_session.clone()));
    Ok(())
}

/// 409 response carrying the conflict details and confirmation prompt.
fn conflict_response(conflict: &LinkConflict) -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({
            "linking_required": true,
            "prompt": conflict.prompt(),
            "conflict": conflict,
        })),
    )
        .into_response()
}

/// Pick the method the user will re-authenticate with. Password wins when
/// present; there are only two methods, so the other side is Google.
fn preferred_existing_method(conflict: &LinkConflict) -> SignInMethod {
    if conflict.existing_methods.contains(&SignInMethod::Password) {
        SignInMethod::Password
    } else {
        SignInMethod::Google
    }
}

/// Build the credential for one side of the link from the request body.
fn credential_for(
    method: SignInMethod,
    conflict: &LinkConflict,
    body: &ConfirmLinkBody,
) -> Result<LinkCredential> {
    match method {
        SignInMethod::Password => {
            let password = body
                .password
                .clone()
                .ok_or_else(|| AppError::BadRequest("password required".to_owned()))?;
            Ok(LinkCredential::Password {
                email: conflict.email.clone(),
                password,
            })
        }
        SignInMethod::Google => {
            let id_token = body
                .google_id_token
                .clone()
                .ok_or_else(|| AppError::BadRequest("google_id_token required".to_owned()))?;
            Ok(LinkCredential::Google { id_token })
        }
    }
}

/// Rebuild a minimal provider session from the cookie for re-resolution.
fn session_from_cookie(user: &CurrentUser) -> AuthSession {
    AuthSession {
        uid: user.uid.clone(),
        email: user.email.clone(),
        display_name: None,
        email_verified: false,
        id_token: user.id_token.clone(),
        refresh_token: None,
        providers: user.providers.clone(),
    }
}
