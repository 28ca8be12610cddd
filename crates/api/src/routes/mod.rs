pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the playground route tree.
///
/// ```text
/// /start            issue session, redirect home (rate limited per IP)
/// /                 kiosk home page (HTML)
/// /api/styles       active catalog + session status
/// /api/selfie       selfie upload (multipart)
/// /api/generate     generation orchestrator (multipart)
/// ```
pub fn playground_routes() -> Router<AppState> {
    Router::new()
        .route("/start", get(handlers::session::start))
        .route("/", get(handlers::home::home))
        .route("/api/styles", get(handlers::catalog::styles))
        .route("/api/selfie", post(handlers::selfie::upload))
        .route("/api/generate", post(handlers::generation::generate))
}
