//! HTTP middleware stack for the platform.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, in-memory store)
//! 4. Rate limiting (governor, auth endpoints only)

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAuth, clear_current_user, load_link_flow, set_current_user,
    store_link_flow,
};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use session::create_session_layer;
