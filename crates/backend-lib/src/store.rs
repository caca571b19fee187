// ============================
// scribe-backend-lib/src/store.rs
// ============================
//! Persistence boundary for user and session records.
//!
//! All access goes through a bounded connection pool; every statement is
//! parameterized, and rows are mapped to domain types at this boundary
//! rather than trusted implicitly.
use chrono::{DateTime, Utc};
use scribe_common::SessionUser;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::{debug, info};

use crate::auth::session::Session;
use crate::error::AppError;

/// A user row mapped to the domain.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email: String,
}

/// Fields of a user row to insert.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub id: &'a str,
    pub username: Option<&'a str>,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
}

#[derive(Debug, FromRow)]
struct SessionUserRow {
    session_id: String,
    user_id: String,
    expires_at: DateTime<Utc>,
    username: Option<String>,
}

impl SessionUserRow {
    fn into_domain(self) -> (Session, SessionUser) {
        let session = Session {
            id: self.session_id,
            user_id: self.user_id.clone(),
            expires_at: self.expires_at,
        };
        // Restricted projection: no email, no password hash
        let user = SessionUser {
            id: self.user_id,
            username: self.username,
        };
        (session, user)
    }
}

/// Credential store over a pooled SQLite connection.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open (or create) the database at `database_url` and run migrations.
    pub async fn open(database_url: &str) -> Result<Self, AppError> {
        info!(database_url, "opening credential store");

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!("credential store ready");

        Ok(Self { pool })
    }

    /// Open an in-memory database (for testing).
    pub async fn open_in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .pragma("foreign_keys", "ON");

        // A single connection keeps the in-memory state shared
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ---- users ----

    /// Insert a user row. A uniqueness violation (email) maps to
    /// [`AppError::DuplicateEmail`].
    pub async fn insert_user(&self, user: &NewUser<'_>) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO user (id, username, password_hash, email) VALUES (?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.email)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, email FROM user WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, email FROM user WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // ---- sessions ----

    pub async fn insert_session(&self, session: &Session) -> Result<(), AppError> {
        sqlx::query("INSERT INTO session (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&session.id)
            .bind(&session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Fetch a session and its owning user in one round trip.
    pub async fn session_with_user(
        &self,
        session_id: &str,
    ) -> Result<Option<(Session, SessionUser)>, AppError> {
        let row = sqlx::query_as::<_, SessionUserRow>(
            "SELECT s.id AS session_id, s.user_id, s.expires_at, u.username \
             FROM session s \
             INNER JOIN user u ON s.user_id = u.id \
             WHERE s.id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionUserRow::into_domain))
    }

    pub async fn update_session_expiry(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE session SET expires_at = ? WHERE id = ?")
            .bind(expires_at)
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a session row; deleting a non-existent id is not an error.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM session WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            AppError::DuplicateEmail
        },
        _ => AppError::from(e),
    }
}
