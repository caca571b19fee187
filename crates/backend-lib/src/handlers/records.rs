// ============================
// scribe-backend-lib/src/handlers/records.rs
// ============================
//! Owner-scoped record endpoints.
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use scribe_common::{RecordItem, UpdateFieldRequest};
use std::sync::Arc;

use crate::error::AppError;
use crate::identity::RequireIdentity;
use crate::AppState;

/// `GET /api/records`
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<Vec<RecordItem>>, AppError> {
    let items = state.db.list_records(&identity.user_id).await?;
    Ok(Json(items))
}

/// `PUT /api/fields`
pub async fn update_field(
    State(state): State<Arc<AppState>>,
    RequireIdentity(identity): RequireIdentity,
    Json(req): Json<UpdateFieldRequest>,
) -> Result<StatusCode, AppError> {
    state
        .db
        .update_field_action(&identity.user_id, req.field_id, req.field_action)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
