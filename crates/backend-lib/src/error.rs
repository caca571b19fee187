// ============================
// scribe-backend-lib/src/error.rs
// ============================
//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    /// Format validation failed before any store access was attempted
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Wrong password, unknown email, or password-less account.
    /// Deliberately undifferentiated to avoid account enumeration.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Registration hit the unique constraint on email
    #[error("Email address already in use")]
    DuplicateEmail,

    /// No valid session accompanied the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Valid session, but the resource belongs to another user
    #[error("Forbidden")]
    Forbidden,

    /// The OAuth provider rejected or failed the code exchange
    #[error("OAuth exchange failed: {0}")]
    OAuthExchangeFailed(String),

    /// The OAuth provider returned no email for the account
    #[error("OAuth provider returned no email")]
    MissingEmail,

    /// Too many failed login attempts
    #[error("Authentication rate limit exceeded")]
    AuthRateLimited,

    /// Store transport/database failure, not user-correctable
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Schema migration failure at startup
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::Unauthenticated => StatusCode::SEE_OTHER,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::AuthRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::OAuthExchangeFailed(_) | AppError::MissingEmail => StatusCode::BAD_GATEWAY,
            AppError::Store(_) | AppError::Migration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "VAL_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::DuplicateEmail => "AUTH_002",
            AppError::Unauthenticated => "AUTH_003",
            AppError::Forbidden => "AUTH_004",
            AppError::AuthRateLimited => "RATE_001",
            AppError::OAuthExchangeFailed(_) => "OAUTH_001",
            AppError::MissingEmail => "OAUTH_002",
            AppError::Store(_) => "STORE_001",
            AppError::Migration(_) => "STORE_002",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::InvalidCredentials => "Incorrect email or password".to_string(),
            AppError::DuplicateEmail => "Email address already in use".to_string(),
            AppError::Unauthenticated => "Authentication required".to_string(),
            AppError::Forbidden => "Forbidden".to_string(),
            AppError::AuthRateLimited => {
                "Too many authentication attempts, please try again later".to_string()
            },
            AppError::OAuthExchangeFailed(_) | AppError::MissingEmail => {
                "Sign-in with the external provider failed".to_string()
            },
            AppError::Store(_) | AppError::Migration(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The boundary maps a missing identity to the login entry point rather
        // than a bare 401, matching how browser clients consume this API.
        if matches!(self, AppError::Unauthenticated) {
            return Redirect::to("/auth/login").into_response();
        }

        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_display() {
        assert_eq!(
            AppError::InvalidCredentials.to_string(),
            "Incorrect email or password"
        );
        assert_eq!(
            AppError::InvalidInput("username too short".to_string()).to_string(),
            "Invalid input: username too short"
        );
        assert_eq!(
            AppError::OAuthExchangeFailed("token endpoint returned 500".to_string()).to_string(),
            "OAuth exchange failed: token endpoint returned 500"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::AuthRateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::MissingEmail.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_app_error_error_codes() {
        assert_eq!(AppError::InvalidCredentials.error_code(), "AUTH_001");
        assert_eq!(AppError::DuplicateEmail.error_code(), "AUTH_002");
        assert_eq!(AppError::Forbidden.error_code(), "AUTH_004");
        assert_eq!(
            AppError::InvalidInput("test".to_string()).error_code(),
            "VAL_001"
        );
        assert_eq!(AppError::MissingEmail.error_code(), "OAUTH_002");
    }

    #[test]
    fn test_credential_failures_stay_undifferentiated() {
        // Unknown email, wrong password, and password-less accounts must all
        // surface exactly the same message and status.
        let err = AppError::InvalidCredentials;
        assert_eq!(err.sanitized_message(), "Incorrect email or password");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let response = AppError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/auth/login"
        );
    }

    #[test]
    fn test_app_error_into_response_is_json() {
        let response = AppError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("application/json"));
    }
}
