// ============================
// scribe-backend-lib/src/records.rs
// ============================
//! Owner-scoped record access.
//!
//! Every query here carries the owning user id in its predicate. A
//! mutation that matches zero rows because the predicate excluded a
//! foreign-owned row reports `Forbidden`; the store never distinguishes
//! "doesn't exist" from "exists but isn't yours".
use chrono::{DateTime, Utc};
use scribe_common::{FieldAction, RecordField, RecordItem};
use sqlx::FromRow;

use crate::error::AppError;
use crate::store::Db;

#[derive(Debug, FromRow)]
struct RecordRow {
    record_id: i64,
    title: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct FieldRow {
    field_id: i64,
    record_id: i64,
    name: String,
    field_action: Option<String>,
}

impl FieldRow {
    fn into_domain(self) -> RecordField {
        RecordField {
            field_id: self.field_id,
            record_id: self.record_id,
            name: self.name,
            field_action: self.field_action.as_deref().and_then(parse_action),
        }
    }
}

fn parse_action(s: &str) -> Option<FieldAction> {
    match s {
        "YES" => Some(FieldAction::Yes),
        "NO" => Some(FieldAction::No),
        _ => None,
    }
}

fn action_as_str(action: FieldAction) -> &'static str {
    match action {
        FieldAction::Yes => "YES",
        FieldAction::No => "NO",
    }
}

impl Db {
    /// Create a record owned by `user_id`, returning its id.
    pub async fn create_record(
        &self,
        user_id: &str,
        title: Option<&str>,
    ) -> Result<i64, AppError> {
        let result =
            sqlx::query("INSERT INTO records (user_id, title, created_at) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(title)
                .bind(Utc::now())
                .execute(self.pool())
                .await?;

        Ok(result.last_insert_rowid())
    }

    /// Add a field to a record. The record must belong to `user_id`.
    pub async fn add_field(
        &self,
        user_id: &str,
        record_id: i64,
        name: &str,
    ) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO record_fields (record_id, name) \
             SELECT record_id, ? FROM records WHERE record_id = ? AND user_id = ?",
        )
        .bind(name)
        .bind(record_id)
        .bind(user_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Forbidden);
        }
        Ok(result.last_insert_rowid())
    }

    /// List all records owned by `user_id`, each with its fields.
    ///
    /// The fields query joins on the records table instead of interpolating
    /// an `IN (...)` list of ids, so the ownership predicate is parameterized
    /// end to end.
    pub async fn list_records(&self, user_id: &str) -> Result<Vec<RecordItem>, AppError> {
        let record_rows = sqlx::query_as::<_, RecordRow>(
            "SELECT record_id, title, created_at FROM records \
             WHERE user_id = ? ORDER BY record_id ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        if record_rows.is_empty() {
            return Ok(Vec::new());
        }

        let field_rows = sqlx::query_as::<_, FieldRow>(
            "SELECT f.field_id, f.record_id, f.name, f.field_action \
             FROM record_fields f \
             INNER JOIN records r ON f.record_id = r.record_id \
             WHERE r.user_id = ? \
             ORDER BY f.field_id ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        let mut items: Vec<RecordItem> = record_rows
            .into_iter()
            .map(|r| RecordItem {
                record_id: r.record_id,
                title: r.title,
                created_at: r.created_at,
                fields: Vec::new(),
            })
            .collect();

        for field in field_rows {
            let field = field.into_domain();
            if let Some(item) = items.iter_mut().find(|i| i.record_id == field.record_id) {
                item.fields.push(field);
            }
        }

        Ok(items)
    }

    /// Set the action on a field, scoped to the owning user.
    ///
    /// Zero affected rows means the field does not exist for this owner and
    /// reports `Forbidden` without confirming whether it exists at all.
    pub async fn update_field_action(
        &self,
        user_id: &str,
        field_id: i64,
        action: FieldAction,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE record_fields SET field_action = ? \
             WHERE field_id = ? \
               AND record_id IN (SELECT record_id FROM records WHERE user_id = ?)",
        )
        .bind(action_as_str(action))
        .bind(field_id)
        .bind(user_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Forbidden);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_encoding_roundtrip() {
        assert_eq!(action_as_str(FieldAction::Yes), "YES");
        assert_eq!(parse_action("NO"), Some(FieldAction::No));
        assert_eq!(parse_action("maybe"), None);
    }
}
