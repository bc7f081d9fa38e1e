use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/items", get(controller::list_items))
        .route("/action", post(controller::perform_action))
}
