use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn target_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            post(controller::create_target).get(controller::list_targets),
        )
        .route(
            "/{id}",
            get(controller::get_target)
                .put(controller::update_target)
                .delete(controller::delete_target),
        )
        .route("/{id}/check", post(controller::trigger_check))
        .route("/{id}/snapshots", get(controller::list_target_snapshots))
}
