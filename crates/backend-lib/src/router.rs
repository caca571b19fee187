// ============================
// scribe-backend-lib/src/router.rs
// ============================
//! Route table for the Scribe backend.
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, oauth, records};
use crate::AppState;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/login/google", get(oauth::google_start))
        .route("/login/google/callback", get(oauth::google_callback))
        .route("/api/me", get(auth::me))
        .route("/api/records", get(records::list_records))
        .route("/api/fields", put(records::update_field))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
