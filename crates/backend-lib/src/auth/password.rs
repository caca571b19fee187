// ============================
// scribe-backend-lib/src/auth/password.rs
// ============================
//! Password hashing, verification, and the password-based login flows.
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::debug;

use crate::auth::token::generate_user_id;
use crate::error::AppError;
use crate::store::{Db, NewUser};
use crate::validation::{validate_email, validate_password, validate_username};

/// Argon2id memory cost in KiB
const MEMORY_COST_KIB: u32 = 19_456;
/// Argon2id iteration count
const TIME_COST: u32 = 2;
/// Argon2id lanes
const PARALLELISM: u32 = 1;
/// Digest length in bytes
const OUTPUT_LEN: usize = 32;

fn hasher() -> Result<Argon2<'static>, AppError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| AppError::Internal(format!("argon2 params: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password into a PHC string with the parameters embedded
pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("password hash: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// Re-applies the function with the hash's embedded parameters; the digest
/// comparison is constant-time.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Password-based identity establishment: registration and login.
#[derive(Clone)]
pub struct PasswordAuth {
    db: Db,
}

impl PasswordAuth {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Register a new user with a password credential.
    ///
    /// Format guards run before any store access; a uniqueness violation on
    /// email surfaces as [`AppError::DuplicateEmail`], distinguished from
    /// generic store failures.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AppError> {
        validate_username(username)?;
        validate_email(email)?;
        validate_password(password)?;

        let user_id = generate_user_id();
        let password_hash = hash_password(password)?;

        self.db
            .insert_user(&NewUser {
                id: &user_id,
                username: Some(username),
                email,
                password_hash: Some(&password_hash),
            })
            .await?;

        debug!(user_id, "user registered");
        Ok(user_id)
    }

    /// Verify an email/password pair and return the owning user id.
    ///
    /// Unknown email, an account with no password (OAuth-provisioned), and a
    /// failed verification all collapse into [`AppError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        validate_email(email)?;
        validate_password(password)?;

        let Some(user) = self.db.user_by_email(email).await? else {
            return Err(AppError::InvalidCredentials);
        };
        let Some(stored_hash) = user.password_hash.as_deref() else {
            return Err(AppError::InvalidCredentials);
        };
        if !verify_password(stored_hash, password) {
            return Err(AppError::InvalidCredentials);
        }

        debug!(user_id = %user.id, "password login succeeded");
        Ok(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_roundtrip() {
        let hash = hash_password("secret1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "secret1"));
        assert!(!verify_password(&hash, "wrong_password"));
    }

    #[test]
    fn test_hash_embeds_tuned_parameters() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.contains("m=19456,t=2,p=1"));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("not-a-phc-string", "secret1"));
        assert!(!verify_password("", "secret1"));
    }

    #[test]
    fn test_same_password_hashes_differently_per_salt() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
        assert!(verify_password(&a, "secret1"));
        assert!(verify_password(&b, "secret1"));
    }
}
