//! iCalendar export handler.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use jobsync_core::errors::SchedulingError;

use crate::services::calendar::job_to_ics;
use crate::{middleware::error_handling::AppError, ApiState};

/// Serves one job as an iCalendar document.
///
/// # Endpoint
///
/// ```text
/// GET /api/calendar/job/:id.ics
/// ```
#[axum::debug_handler]
pub async fn job_ics(
    State(state): State<Arc<ApiState>>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let job_id: Uuid = file
        .strip_suffix(".ics")
        .unwrap_or(&file)
        .parse()
        .map_err(|_| SchedulingError::Validation(format!("Invalid job id: {}", file)))?;

    let job = jobsync_db::repositories::job::get_job(&state.db_pool, job_id)
        .await
        .map_err(SchedulingError::Database)?
        .ok_or_else(|| SchedulingError::NotFound(format!("Job {} not found", job_id)))?
        .into_job()
        .map_err(SchedulingError::Database)?;

    let time_zone =
        jobsync_db::repositories::availability::get_profile(&state.db_pool, job.contractor_id)
            .await
            .map_err(SchedulingError::Database)?
            .map(|p| p.time_zone)
            .unwrap_or_else(|| "UTC".to_string());

    let body = job_to_ics(&job, &time_zone);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"job.ics\"",
            ),
        ],
        body,
    )
        .into_response())
}
