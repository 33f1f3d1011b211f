//! HTTP route handlers for the admin back-office.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check (no token)
//!
//! GET  /dashboard                  - Collection counts + signup trend
//!
//! GET  /users                      - Recent profiles
//! GET  /users/{uid}                - Profile detail
//! POST /users/{uid}/host           - Grant/revoke host privileges
//!
//! GET  /hackathons                 - Listings (any status)
//! POST /hackathons/{id}/feature    - Set/unset the featured flag
//! DELETE /hackathons/{id}          - Remove a listing
//!
//! GET  /projects                   - Recent projects
//! DELETE /projects/{id}            - Remove a project (moderation)
//! ```
//!
//! Every route except `/health` requires the admin bearer token.

pub mod dashboard;
pub mod hackathons;
pub mod projects;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AdminState;

/// Create all routes for the admin back-office.
pub fn routes() -> Router<AdminState> {
    Router::new()
        .route("/dashboard", get(dashboard::show))
        .route("/users", get(users::list))
        .route("/users/{uid}", get(users::show))
        .route("/users/{uid}/host", post(users::set_host))
        .route("/hackathons", get(hackathons::list))
        .route("/hackathons/{id}/feature", post(hackathons::set_featured))
        .route("/hackathons/{id}", delete(hackathons::destroy))
        .route("/projects", get(projects::list))
        .route("/projects/{id}", delete(projects::destroy))
}
