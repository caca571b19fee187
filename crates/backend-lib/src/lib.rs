// ============================
// scribe-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the Scribe record-keeping server:
//! session-token lifecycle, credential verification, and the owner-scoped
//! authorization boundary applied to all record access.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod records;
pub mod router;
pub mod store;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::oauth::GoogleOAuth;
use crate::auth::rate_limit::AuthRateLimiter;
use crate::auth::SessionManager;
use crate::config::Settings;
use crate::store::Db;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Settings manager
    pub settings: Arc<Settings>,
    /// Credential store (pooled connections)
    pub db: Db,
    /// Session lifecycle manager
    pub sessions: SessionManager,
    /// Google OAuth client
    pub oauth: GoogleOAuth,
    /// Login attempt rate limiter
    pub login_limiter: Arc<AuthRateLimiter>,
}

impl AppState {
    /// Create a new application state
    pub fn new(db: Db, settings: Settings) -> Self {
        let sessions = SessionManager::new(db.clone());
        let oauth = GoogleOAuth::new(&settings.google);
        let login_limiter = Arc::new(AuthRateLimiter::new(5, Duration::from_secs(5 * 60)));

        Self {
            settings: Arc::new(settings),
            db,
            sessions,
            oauth,
            login_limiter,
        }
    }
}
