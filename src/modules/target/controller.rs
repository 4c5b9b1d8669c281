use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::crud::TargetCrud;
use super::model::Target;
use super::schema::{
    CheckResponse, CreateTargetRequest, ErrorResponse, TargetResponse, UpdateTargetRequest,
};
use crate::modules::snapshot::crud::SnapshotCrud;
use crate::modules::snapshot::interface::SnapshotRepository;
use crate::modules::snapshot::schema::SnapshotResponse;
use crate::services::checker::CheckError;
use crate::services::scheduler::{RunError, SchedulerReport};
use crate::AppState;

// =============================================================================
// POST /targets - Register a URL to watch
// =============================================================================

pub async fn create_target(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTargetRequest>,
) -> Result<(StatusCode, Json<TargetResponse>), (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = req.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.to_string())),
        ));
    }

    let now = Utc::now();
    let target = Target {
        id: Uuid::new_v4().to_string(),
        url: req.url,
        name: req.name,
        check_frequency_hours: req.check_frequency_hours,
        is_active: req.is_active,
        yellow_threshold: req.yellow_threshold,
        red_threshold: req.red_threshold,
        webhook_url: req.webhook_url,
        webhook_payload: req.webhook_payload,
        render_js: req.render_js,
        last_checked_at: None,
        created_at: now,
        updated_at: now,
    };

    let crud = TargetCrud::new(state.db.clone());
    crud.create(&target).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    tracing::info!(target_id = %target.id, url = %target.url, "Target registered");

    Ok((StatusCode::CREATED, Json(target.into())))
}

// =============================================================================
// GET /targets - List all targets
// =============================================================================

pub async fn list_targets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TargetResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let crud = TargetCrud::new(state.db.clone());

    let targets = crud.list_all().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    Ok(Json(targets.into_iter().map(Into::into).collect()))
}

// =============================================================================
// GET /targets/{id}
// =============================================================================

pub async fn get_target(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TargetResponse>, (StatusCode, Json<ErrorResponse>)> {
    let crud = TargetCrud::new(state.db.clone());

    let target = crud
        .get(&id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Target not found")),
            )
        })?;

    Ok(Json(target.into()))
}

// =============================================================================
// PUT /targets/{id}
// =============================================================================

pub async fn update_target(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTargetRequest>,
) -> Result<Json<TargetResponse>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = req.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.to_string())),
        ));
    }

    let crud = TargetCrud::new(state.db.clone());

    let updated = crud
        .update(&id, &req)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Target not found")),
            )
        })?;

    Ok(Json(updated.into()))
}

// =============================================================================
// DELETE /targets/{id}
// =============================================================================

pub async fn delete_target(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let crud = TargetCrud::new(state.db.clone());

    let deleted = crud.delete(&id).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    if !deleted {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Target not found")),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// POST /targets/{id}/check - Trigger one check immediately
// =============================================================================

pub async fn trigger_check(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CheckResponse>, (StatusCode, Json<ErrorResponse>)> {
    let crud = TargetCrud::new(state.db.clone());

    let target = crud
        .get(&id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Target not found")),
            )
        })?;

    match state.scheduler.run_target(&target).await {
        Ok(outcome) => Ok(Json(CheckResponse {
            success: true,
            alert_level: outcome.tier,
            change_percentage: outcome.change_percentage,
            status_code: outcome.http_status,
        })),
        Err(RunError::Busy) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(
                "A check for this target is already in flight",
            )),
        )),
        Err(RunError::Check(e)) => {
            let status = match &e {
                CheckError::Fetch(_) => StatusCode::BAD_GATEWAY,
                CheckError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((
                status,
                Json(ErrorResponse::new(format!(
                    "Check failed while {}: {}",
                    e.stage(),
                    e
                ))),
            ))
        }
    }
}

// =============================================================================
// GET /targets/{id}/snapshots - Capture history, newest first
// =============================================================================

pub async fn list_target_snapshots(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SnapshotResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let targets = TargetCrud::new(state.db.clone());

    if targets
        .get(&id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
        })?
        .is_none()
    {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Target not found")),
        ));
    }

    let snapshots = SnapshotCrud::new(state.db.clone());
    let history = snapshots.list_for(&id).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    Ok(Json(history.into_iter().map(Into::into).collect()))
}

// =============================================================================
// POST /checks/run - Evaluate and check every due target
// =============================================================================

pub async fn run_scheduled_checks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SchedulerReport>, (StatusCode, Json<ErrorResponse>)> {
    let report = state
        .scheduler
        .run_due_checks(Utc::now())
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
        })?;

    Ok(Json(report))
}
