// ============================
// scribe-backend-lib/src/handlers/mod.rs
// ============================
//! HTTP boundary layer: maps the auth and record operations onto routes,
//! cookies, statuses, and redirects.

pub mod auth;
pub mod oauth;
pub mod records;
