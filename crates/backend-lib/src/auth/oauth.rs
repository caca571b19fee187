// ============================
// scribe-backend-lib/src/auth/oauth.rs
// ============================
//! Google OAuth2 authorization-code flow with PKCE, and provisioning of
//! local accounts from provider identities.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use regex::Regex;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::auth::token::{generate_urlsafe_secret, generate_user_id};
use crate::config::GoogleSettings;
use crate::error::AppError;
use crate::store::{Db, NewUser};

/// Cookie holding the state parameter between redirect and callback
pub const OAUTH_STATE_COOKIE: &str = "google_oauth_state";
/// Cookie holding the PKCE code verifier between redirect and callback
pub const CODE_VERIFIER_COOKIE: &str = "google_code_verifier";
/// Lifetime of both OAuth cookies in seconds
pub const OAUTH_COOKIE_MAX_AGE_SECS: i64 = 600;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Everything the caller must hold onto between the authorization redirect
/// and the provider callback.
#[derive(Debug, Clone)]
pub struct AuthorizationStart {
    pub authorization_url: String,
    pub state: String,
    pub code_verifier: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
    name: Option<String>,
}

/// Google OAuth client driving the authorization-code + PKCE exchange.
#[derive(Clone)]
pub struct GoogleOAuth {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleOAuth {
    pub fn new(settings: &GoogleSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            redirect_uri: settings.redirect_uri.clone(),
        }
    }

    /// Begin the authorization flow.
    ///
    /// The caller must stash `state` and `code_verifier` in short-lived
    /// cookies and compare `state` on the callback; that comparison is the
    /// anti-CSRF check and is not optional.
    pub fn begin_authorization(&self) -> Result<AuthorizationStart, AppError> {
        let state = generate_urlsafe_secret(16);
        let code_verifier = generate_urlsafe_secret(32);
        let code_challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(code_verifier.as_bytes()));

        let mut url = Url::parse(AUTHORIZATION_ENDPOINT)
            .map_err(|e| AppError::Internal(format!("authorization endpoint: {e}")))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", "openid profile email")
            .append_pair("state", &state)
            .append_pair("code_challenge", &code_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(AuthorizationStart {
            authorization_url: url.into(),
            state,
            code_verifier,
        })
    }

    /// Complete the authorization flow: exchange the code, fetch the
    /// provider's user info, and resolve or provision a local user.
    ///
    /// Any failure here leaves no partial state behind; in particular no
    /// session exists until the caller creates one from the returned id.
    pub async fn complete_authorization(
        &self,
        db: &Db,
        code: &str,
        code_verifier: &str,
    ) -> Result<String, AppError> {
        let access_token = self.exchange_code(code, code_verifier).await?;

        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(|e| AppError::OAuthExchangeFailed(format!("userinfo fetch: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::OAuthExchangeFailed(format!(
                "userinfo endpoint returned {}",
                response.status()
            )));
        }
        let info: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| AppError::OAuthExchangeFailed(format!("userinfo decode: {e}")))?;

        let Some(email) = info.email.filter(|e| !e.is_empty()) else {
            return Err(AppError::MissingEmail);
        };

        resolve_or_provision_user(db, &email, info.name.as_deref()).await
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("code_verifier", code_verifier),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("redirect_uri", &self.redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| AppError::OAuthExchangeFailed(format!("token exchange: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::OAuthExchangeFailed(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }
        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::OAuthExchangeFailed(format!("token decode: {e}")))?;
        Ok(tokens.access_token)
    }
}

/// Look up a local user by provider email, provisioning one if absent.
///
/// Existing accounts (including password-based ones) are linked by email and
/// left untouched. Provisioned accounts get a generated id, a best-effort
/// username from the provider display name, and no password hash. A racing
/// duplicate insert falls back to the lookup.
pub async fn resolve_or_provision_user(
    db: &Db,
    email: &str,
    display_name: Option<&str>,
) -> Result<String, AppError> {
    if let Some(existing) = db.user_by_email(email).await? {
        return Ok(existing.id);
    }

    let user_id = generate_user_id();
    let username = display_name.and_then(collapse_display_name);

    let inserted = db
        .insert_user(&NewUser {
            id: &user_id,
            username: username.as_deref(),
            email,
            password_hash: None,
        })
        .await;

    match inserted {
        Ok(()) => {
            debug!(user_id, "provisioned user from oauth identity");
            Ok(user_id)
        },
        Err(AppError::DuplicateEmail) => {
            // Lost the provisioning race to a concurrent callback
            let existing = db
                .user_by_email(email)
                .await?
                .ok_or(AppError::DuplicateEmail)?;
            Ok(existing.id)
        },
        Err(e) => Err(e),
    }
}

/// Collapse a provider display name into a username: whitespace runs become
/// `_` and the result is lowercased. Empty names yield no username.
fn collapse_display_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(WHITESPACE_RUN.replace_all(trimmed, "_").to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client() -> GoogleOAuth {
        GoogleOAuth::new(&GoogleSettings {
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            redirect_uri: "http://localhost:3000/login/google/callback".into(),
        })
    }

    #[test]
    fn test_authorization_url_carries_pkce_and_state() {
        let start = client().begin_authorization().unwrap();

        let url = Url::parse(&start.authorization_url).unwrap();
        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client-id");
        assert_eq!(params["scope"], "openid profile email");
        assert_eq!(params["state"], start.state);
        assert_eq!(params["code_challenge_method"], "S256");

        // The challenge must be the S256 transform of the verifier
        let expected =
            URL_SAFE_NO_PAD.encode(Sha256::digest(start.code_verifier.as_bytes()));
        assert_eq!(params["code_challenge"], expected);
    }

    #[test]
    fn test_verifier_and_state_are_fresh_per_start() {
        let oauth = client();
        let a = oauth.begin_authorization().unwrap();
        let b = oauth.begin_authorization().unwrap();

        assert_ne!(a.state, b.state);
        assert_ne!(a.code_verifier, b.code_verifier);
        // Canonical PKCE verifier length for 32 bytes of entropy
        assert_eq!(a.code_verifier.len(), 43);
    }

    #[test]
    fn test_collapse_display_name() {
        assert_eq!(
            collapse_display_name("Ada  Lovelace").as_deref(),
            Some("ada_lovelace")
        );
        assert_eq!(
            collapse_display_name("  Grace\tHopper ").as_deref(),
            Some("grace_hopper")
        );
        assert_eq!(collapse_display_name("   "), None);
        assert_eq!(collapse_display_name(""), None);
    }
}
