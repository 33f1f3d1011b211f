//! HTTP route handlers for the platform API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//!
//! # Auth
//! POST /auth/register              - Email/password registration
//! POST /auth/login                 - Password sign-in
//! POST /auth/google                - Federated (Google) sign-in
//! POST /auth/logout                - Sign out
//! GET  /auth/me                    - Resolved session state
//! GET  /auth/methods               - Live linked-method list
//! POST /auth/link/confirm          - Confirm a pending account link
//! POST /auth/link/cancel           - Abandon a pending account link
//! POST /auth/unlink                - Detach a sign-in method
//!
//! # Account (requires auth)
//! GET    /account/profile          - Own profile
//! PATCH  /account/profile          - Update own profile
//! GET    /account/achievements     - Own achievements
//! GET    /account/saved            - Own saved items
//! POST   /account/host-request     - Request host privileges
//! DELETE /account                  - Delete own account (cascade)
//!
//! # Projects
//! GET    /projects                 - List (recent / by owner / by hackathon)
//! POST   /projects                 - Create
//! GET    /projects/{id}            - Detail (counts a view)
//! PATCH  /projects/{id}            - Update own
//! DELETE /projects/{id}            - Delete own
//! POST   /projects/{id}/like       - Like
//! DELETE /projects/{id}/like       - Remove like
//! POST   /projects/{id}/save       - Bookmark
//! DELETE /projects/{id}/save       - Remove bookmark
//!
//! # Hackathons
//! GET    /hackathons               - List with filters
//! POST   /hackathons               - Create (hosts)
//! GET    /hackathons/{id}          - Detail
//! PATCH  /hackathons/{id}          - Update own
//! POST   /hackathons/{id}/apply    - Apply
//! GET    /hackathons/{id}/applications - Review list (host)
//! GET    /hackathons/{id}/projects - Projects built there
//! POST   /hackathons/{id}/save     - Bookmark
//! DELETE /hackathons/{id}/save     - Remove bookmark
//!
//! # Applications
//! GET  /applications               - Own applications
//! POST /applications/{id}/status   - Review transition (host)
//! POST /applications/{id}/withdraw - Withdraw own
//!
//! # Notifications
//! GET  /notifications              - List (optionally unread only)
//! POST /notifications/{id}/read    - Mark read
//! POST /notifications/read-all     - Mark all read
//! ```

pub mod account;
pub mod applications;
pub mod auth;
pub mod hackathons;
pub mod notifications;
pub mod projects;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router. Rate limited hard: these endpoints face
/// credential stuffing.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/google", post(auth::google))
        .route("/link/confirm", post(auth::confirm_link))
        .route("/link/cancel", post(auth::cancel_link))
        .route("/unlink", post(auth::unlink))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/methods", get(auth::methods))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(account::profile).patch(account::update_profile),
        )
        .route("/achievements", get(account::achievements))
        .route("/saved", get(account::saved))
        .route("/host-request", post(account::host_request))
        .route("/", delete(account::delete_account))
}

/// Create the project routes router.
pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list).post(projects::create))
        .route(
            "/{id}",
            get(projects::show)
                .patch(projects::update)
                .delete(projects::destroy),
        )
        .route(
            "/{id}/like",
            post(projects::like).delete(projects::unlike),
        )
        .route(
            "/{id}/save",
            post(projects::save).delete(projects::unsave),
        )
}

/// Create the hackathon routes router.
pub fn hackathon_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(hackathons::list).post(hackathons::create))
        .route(
            "/{id}",
            get(hackathons::show).patch(hackathons::update),
        )
        .route("/{id}/apply", post(hackathons::apply))
        .route("/{id}/applications", get(hackathons::applications))
        .route("/{id}/projects", get(hackathons::projects))
        .route(
            "/{id}/save",
            post(hackathons::save).delete(hackathons::unsave),
        )
}

/// Create the application routes router.
pub fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(applications::mine))
        .route("/{id}/status", post(applications::set_status))
        .route("/{id}/withdraw", post(applications::withdraw))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list))
        .route("/{id}/read", post(notifications::mark_read))
        .route("/read-all", post(notifications::mark_all_read))
}

/// Create all routes for the platform.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest(
            "/account",
            account_routes().layer(api_rate_limiter()),
        )
        .nest(
            "/projects",
            project_routes().layer(api_rate_limiter()),
        )
        .nest(
            "/hackathons",
            hackathon_routes().layer(api_rate_limiter()),
        )
        .nest("/applications", application_routes())
        .nest("/notifications", notification_routes())
}
