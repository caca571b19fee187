// ============================
// scribe-backend-lib/src/handlers/auth.rs
// ============================
//! Password-based registration, login, and logout.
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use axum_extra::extract::CookieJar;
use scribe_common::{LoginRequest, RegisterRequest, SessionUser};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::auth::{
    clear_session_cookie, generate_session_token, hash_session_token, session_cookie,
    PasswordAuth, SESSION_COOKIE_NAME,
};
use crate::error::AppError;
use crate::identity::RequireIdentity;
use crate::AppState;

/// Create a session for `user_id` and add its cookie to the jar.
pub(crate) async fn establish_session(
    state: &AppState,
    jar: CookieJar,
    user_id: &str,
) -> Result<CookieJar, AppError> {
    let token = generate_session_token();
    let session = state.sessions.create(&token, user_id).await?;
    Ok(jar.add(session_cookie(
        &token,
        session.expires_at,
        state.settings.secure_cookies,
    )))
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<Value>), AppError> {
    let user_id = PasswordAuth::new(state.db.clone())
        .register(&req.username, &req.email, &req.password)
        .await?;
    let jar = establish_session(&state, jar, &user_id).await?;

    Ok((StatusCode::CREATED, jar, Json(json!({ "success": true }))))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), AppError> {
    let ip = addr.ip();
    if !state.login_limiter.check_rate_limit(ip) {
        return Err(AppError::AuthRateLimited);
    }

    match PasswordAuth::new(state.db.clone())
        .login(&req.email, &req.password)
        .await
    {
        Ok(user_id) => {
            state.login_limiter.record_success(ip);
            let jar = establish_session(&state, jar, &user_id).await?;
            Ok((jar, Json(json!({ "success": true }))))
        },
        Err(AppError::InvalidCredentials) => {
            state.login_limiter.record_failed_attempt(ip);
            Err(AppError::InvalidCredentials)
        },
        Err(e) => Err(e),
    }
}

/// `POST /auth/logout`
///
/// Invalidates the session row (if any) and clears the cookie; always lands
/// back on the login entry point.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        state
            .sessions
            .invalidate(&hash_session_token(cookie.value()))
            .await?;
    }
    let jar = jar.add(clear_session_cookie(state.settings.secure_cookies));

    Ok((jar, Redirect::to("/auth/login")))
}

/// `GET /api/me`
pub async fn me(RequireIdentity(identity): RequireIdentity) -> Json<SessionUser> {
    Json(SessionUser {
        id: identity.user_id,
        username: identity.username,
    })
}
