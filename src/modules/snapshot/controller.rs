use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use super::crud::SnapshotCrud;
use super::interface::SnapshotRepository;
use super::schema::ErrorResponse;
use crate::AppState;

// =============================================================================
// POST /snapshots/{id}/resolve - Operator acknowledges an alert
// =============================================================================

pub async fn resolve_snapshot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let crud = SnapshotCrud::new(state.db.clone());

    let resolved = crud.mark_resolved(&id, Utc::now()).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    if !resolved {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Snapshot not found")),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// DELETE /snapshots/{id}
// =============================================================================

pub async fn delete_snapshot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let crud = SnapshotCrud::new(state.db.clone());

    let deleted = crud.delete(&id).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    if !deleted {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Snapshot not found")),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}
