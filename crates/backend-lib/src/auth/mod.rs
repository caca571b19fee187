// ============================
// scribe-backend-lib/src/auth/mod.rs
// ============================
//! Authentication module: token codec, session lifecycle, password and
//! OAuth identity establishment, login rate limiting.

pub mod oauth;
pub mod password;
pub mod rate_limit;
pub mod session;
pub mod token;

pub use password::{hash_password, verify_password, PasswordAuth};
pub use session::{
    clear_session_cookie, session_cookie, Session, SessionManager, SESSION_COOKIE_NAME,
};
pub use token::{generate_session_token, generate_user_id, hash_session_token};
