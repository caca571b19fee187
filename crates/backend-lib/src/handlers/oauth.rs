// ============================
// scribe-backend-lib/src/handlers/oauth.rs
// ============================
//! Google OAuth entry point and callback.
use axum::extract::{Query, State};
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::auth::oauth::{CODE_VERIFIER_COOKIE, OAUTH_COOKIE_MAX_AGE_SECS, OAUTH_STATE_COOKIE};
use crate::auth::{generate_session_token, session_cookie, Session};
use crate::error::AppError;
use crate::AppState;

/// Query parameters Google sends to the callback
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

fn oauth_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(OAUTH_COOKIE_MAX_AGE_SECS))
        .build()
}

fn clear_oauth_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

/// `GET /login/google`
///
/// Starts the authorization flow: stashes the state and PKCE verifier in
/// short-lived cookies and redirects to the provider.
pub async fn google_start(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let secure = state.settings.secure_cookies;
    let start = state.oauth.begin_authorization()?;

    let jar = jar
        .add(oauth_cookie(OAUTH_STATE_COOKIE, start.state, secure))
        .add(oauth_cookie(CODE_VERIFIER_COOKIE, start.code_verifier, secure));

    Ok((jar, Redirect::to(&start.authorization_url)))
}

/// `GET /login/google/callback`
///
/// Completes the exchange. Success redirects to the dashboard with a fresh
/// session cookie; every failure is caught, leaves no session behind, and
/// redirects back to the login entry point.
pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let secure = state.settings.secure_cookies;

    let state_cookie = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_owned());
    let verifier_cookie = jar.get(CODE_VERIFIER_COOKIE).map(|c| c.value().to_owned());

    // The one-shot cookies are cleared whichever way the callback goes
    let jar = jar
        .add(clear_oauth_cookie(OAUTH_STATE_COOKIE, secure))
        .add(clear_oauth_cookie(CODE_VERIFIER_COOKIE, secure));

    match run_callback(&state, query, state_cookie, verifier_cookie).await {
        Ok((token, session)) => {
            let jar = jar.add(session_cookie(&token, session.expires_at, secure));
            (jar, Redirect::to("/dashboard"))
        },
        Err(e) => {
            warn!(error = %e, "google oauth callback failed");
            (jar, Redirect::to("/auth/login"))
        },
    }
}

async fn run_callback(
    state: &AppState,
    query: CallbackQuery,
    state_cookie: Option<String>,
    verifier_cookie: Option<String>,
) -> Result<(String, Session), AppError> {
    let (Some(code), Some(query_state)) = (query.code, query.state) else {
        return Err(AppError::InvalidInput(
            "missing code or state parameter".to_string(),
        ));
    };
    let Some(expected_state) = state_cookie else {
        return Err(AppError::InvalidInput("missing state cookie".to_string()));
    };
    // Anti-CSRF: the state round-tripped through the provider must match
    // the one stashed at the start of the flow
    if expected_state != query_state {
        return Err(AppError::InvalidInput("state mismatch".to_string()));
    }
    let Some(code_verifier) = verifier_cookie else {
        return Err(AppError::InvalidInput(
            "missing code verifier cookie".to_string(),
        ));
    };

    let user_id = state
        .oauth
        .complete_authorization(&state.db, &code, &code_verifier)
        .await?;

    let token = generate_session_token();
    let session = state.sessions.create(&token, &user_id).await?;

    Ok((token, session))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_cookie_attributes() {
        let cookie = oauth_cookie(OAUTH_STATE_COOKIE, "state-value".into(), true);

        assert_eq!(cookie.name(), "google_oauth_state");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(600))
        );
    }

    #[test]
    fn test_clear_oauth_cookie_zeroes_max_age() {
        let cookie = clear_oauth_cookie(CODE_VERIFIER_COOKIE, false);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
