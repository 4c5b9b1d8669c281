use axum::{
    routing::{delete, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn snapshot_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{id}/resolve", post(controller::resolve_snapshot))
        .route("/{id}", delete(controller::delete_snapshot))
}
