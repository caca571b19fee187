// ================
// common/src/lib.rs
// ================
//! Shared request/response types exchanged between the Scribe backend and its
//! clients: authentication forms, the session user projection, and the
//! record/field payloads served by the owner-scoped API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registration form body
/// # Fields
/// * `username` - Display name (3-31 chars, lowercase alphanumerics/`_`/`-`)
/// * `email` - Email address (unique per account)
/// * `password` - Plaintext password (6-255 chars, hashed server side)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Restricted user projection returned to authenticated clients.
///
/// Deliberately excludes the email and password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub username: Option<String>,
}

/// Review decision recorded on a single field of a record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAction {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

/// One field belonging to a record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecordField {
    pub field_id: i64,
    pub record_id: i64,
    pub name: String,
    pub field_action: Option<FieldAction>,
}

/// A record together with its fields, as served by `GET /api/records`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RecordItem {
    pub record_id: i64,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub fields: Vec<RecordField>,
}

/// Body of `PUT /api/fields`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateFieldRequest {
    pub field_id: i64,
    pub field_action: FieldAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_action_uses_uppercase_wire_names() {
        assert_eq!(serde_json::to_string(&FieldAction::Yes).unwrap(), "\"YES\"");
        assert_eq!(serde_json::to_string(&FieldAction::No).unwrap(), "\"NO\"");

        let req: UpdateFieldRequest =
            serde_json::from_str(r#"{"field_id": 7, "field_action": "NO"}"#).unwrap();
        assert_eq!(req.field_id, 7);
        assert_eq!(req.field_action, FieldAction::No);
    }

    #[test]
    fn session_user_roundtrip() {
        let user = SessionUser {
            id: "abc123".into(),
            username: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        let back: SessionUser = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}
