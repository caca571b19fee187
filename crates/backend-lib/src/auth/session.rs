// ============================
// scribe-backend-lib/src/auth/session.rs
// ============================
//! Session token lifecycle: creation, validation with sliding renewal,
//! invalidation, and the session cookie itself.
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, TimeDelta, Utc};
use scribe_common::SessionUser;
use time::OffsetDateTime;
use tracing::debug;

use crate::auth::token::hash_session_token;
use crate::error::AppError;
use crate::store::Db;

/// Name of the bearer-token cookie
pub const SESSION_COOKIE_NAME: &str = "auth-session";

/// Total session lifetime
pub fn session_lifetime() -> TimeDelta {
    TimeDelta::days(30)
}

/// Renewal window: once a session is past half its lifetime, validation
/// extends it back to the full lifetime
pub fn renewal_window() -> TimeDelta {
    TimeDelta::days(15)
}

/// A session row. `id` is the hash of the bearer token; the raw token is
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Session manager for handling authentication tokens
#[derive(Clone)]
pub struct SessionManager {
    db: Db,
}

impl SessionManager {
    /// Create a new session manager over the credential store
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create and persist a new session for `user_id` from a freshly
    /// generated token.
    pub async fn create(&self, token: &str, user_id: &str) -> Result<Session, AppError> {
        let session = Session {
            id: hash_session_token(token),
            user_id: user_id.to_string(),
            expires_at: Utc::now() + session_lifetime(),
        };
        self.db.insert_session(&session).await?;

        debug!(user_id, "session created");
        Ok(session)
    }

    /// Validate a session token.
    ///
    /// A single joined lookup fetches the session and its owning user.
    /// Expired sessions are deleted on the spot (there is no background
    /// sweep), and sessions past half their lifetime are renewed to a full
    /// lifetime before being returned. "No session" is a normal outcome,
    /// not an error; store failures propagate.
    pub async fn validate(
        &self,
        token: &str,
    ) -> Result<Option<(Session, SessionUser)>, AppError> {
        let session_id = hash_session_token(token);

        let Some((mut session, user)) = self.db.session_with_user(&session_id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        if now >= session.expires_at {
            self.db.delete_session(&session.id).await?;
            debug!(user_id = %session.user_id, "expired session reaped");
            return Ok(None);
        }

        // Sliding renewal, inclusive at the halfway boundary. Two requests
        // racing here both compute now + lifetime; last write wins and the
        // race is benign.
        if now >= session.expires_at - renewal_window() {
            session.expires_at = now + session_lifetime();
            self.db
                .update_session_expiry(&session.id, session.expires_at)
                .await?;
            debug!(user_id = %session.user_id, "session renewed");
        }

        Ok(Some((session, user)))
    }

    /// Delete a session row. Idempotent: deleting a non-existent id is not
    /// an error.
    pub async fn invalidate(&self, session_id: &str) -> Result<(), AppError> {
        self.db.delete_session(session_id).await
    }
}

/// Build the `auth-session` cookie carrying the raw token.
pub fn session_cookie(token: &str, expires_at: DateTime<Utc>, secure: bool) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE_NAME, token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure);

    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(expires_at.timestamp()) {
        builder = builder.expires(expires);
    }

    builder.build()
}

/// Build the deletion form of the session cookie (`Max-Age=0`).
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let expires_at = Utc::now() + session_lifetime();
        let cookie = session_cookie("some-token", expires_at, true);

        assert_eq!(cookie.name(), "auth-session");
        assert_eq!(cookie.value(), "some-token");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert!(cookie.expires().is_some());
    }

    #[test]
    fn test_clear_cookie_has_zero_max_age() {
        let cookie = clear_session_cookie(false);

        assert_eq!(cookie.name(), "auth-session");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_renewal_window_is_half_the_lifetime() {
        assert_eq!(session_lifetime(), renewal_window() * 2);
    }
}
