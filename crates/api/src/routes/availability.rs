use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/contractors/:id/availability",
            put(handlers::availability::set_availability),
        )
        .route(
            "/api/contractors/:id/availability",
            get(handlers::availability::get_availability),
        )
}
