// ============================
// scribe-backend-lib/src/identity.rs
// ============================
//! The authorization boundary: resolving the request's identity from its
//! session cookie and requiring one where a route is protected.
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::auth::SESSION_COOKIE_NAME;
use crate::error::AppError;
use crate::AppState;

/// The authenticated identity exposed to downstream handlers for the
/// lifetime of one request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub username: Option<String>,
}

/// Extractor resolving the session cookie to an identity, if any.
///
/// Absence of a cookie or of a valid session yields `None`; anonymous is a
/// normal outcome here. Store failures still propagate; a connectivity
/// problem must never masquerade as "logged out".
pub struct MaybeIdentity(pub Option<Identity>);

/// Extractor that rejects anonymous requests with `Unauthenticated`.
pub struct RequireIdentity(pub Identity);

impl FromRequestParts<Arc<AppState>> for MaybeIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
            return Ok(Self(None));
        };

        let identity = state
            .sessions
            .validate(cookie.value())
            .await?
            .map(|(_session, user)| Identity {
                user_id: user.id,
                username: user.username,
            });

        Ok(Self(identity))
    }
}

impl FromRequestParts<Arc<AppState>> for RequireIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeIdentity(identity) = MaybeIdentity::from_request_parts(parts, state).await?;
        identity.map(Self).ok_or(AppError::Unauthenticated)
    }
}
