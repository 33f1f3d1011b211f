//! HackDeck Functions - Transactional email service.
//!
//! Three stateless HTTP functions invoked fire-and-forget by the platform:
//!
//! - `POST /email/welcome` - after registration
//! - `POST /email/application-confirmation` - after a hackathon application
//! - `POST /email/host-request` - when a user requests host privileges
//!
//! Delivery goes over SMTP (lettre) with Askama HTML + text templates.
//! Callers never block a user flow on these; a failed send is reported in
//! the response envelope and logged here.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{Router, routing::get, routing::post};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod email;
mod routes;
mod state;

use config::FunctionsConfig;
use email::EmailService;
use state::FnState;

#[tokio::main]
async fn main() {
    let config = FunctionsConfig::from_env().expect("Failed to load configuration");

    let _sentry_guard = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                attach_stacktrace: true,
                ..Default::default()
            },
        ))
    });

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hackdeck_functions=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let email = EmailService::new(&config.email, &config.platform_url)
        .expect("Failed to configure SMTP transport");
    let state = FnState::new(email);

    let app = Router::new()
        .route("/health", get(health))
        .route("/email/welcome", post(routes::welcome))
        .route(
            "/email/application-confirmation",
            post(routes::application_confirmation),
        )
        .route("/email/host-request", post(routes::host_request))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(sentry_tower::NewSentryLayer::new_from_top());

    let addr = config.socket_addr();
    tracing::info!("functions listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
