use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/jobs/:id/schedule", post(handlers::schedule::schedule_job))
        .route(
            "/api/jobs/:id/reschedule",
            post(handlers::schedule::reschedule_job),
        )
        .route(
            "/api/contractors/:id/calendar",
            get(handlers::schedule::contractor_calendar),
        )
}
