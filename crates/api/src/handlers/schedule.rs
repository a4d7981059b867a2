//! # Scheduling Handlers
//!
//! The booking orchestrator: validates a candidate against the contractor's
//! availability, commits it, and fans out the best-effort side effects
//! (calendar export, notifications, route re-optimization). The database
//! exclusion constraint backs up the validator, so two concurrent requests
//! for overlapping windows cannot both commit.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use jobsync_core::booking::{self, BookingCandidate, BookingRejection, ConflictReason};
use jobsync_core::errors::SchedulingError;
use jobsync_core::models::availability::{AvailabilityProfile, BlockedDate};
use jobsync_core::models::job::{
    CalendarEntry, JobStatus, RequestedBy, RescheduleJobRequest, ScheduleJobRequest,
    ScheduleJobResponse, ScheduledJob,
};

use crate::services::calendar::job_to_ics;
use crate::services::notify::{notify_best_effort, NotificationMessage};
use crate::services::optimizer;
use crate::{middleware::error_handling::AppError, ApiState};

/// Query parameters for the contractor calendar listing.
#[derive(Debug, Deserialize)]
pub struct CalendarRangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

struct BookingContext {
    profile: AvailabilityProfile,
    blocked: Vec<BlockedDate>,
    active_jobs: Vec<ScheduledJob>,
    today: NaiveDate,
}

/// Loads everything the validator needs for one contractor-day. "Today" is
/// computed in the contractor's own time zone.
async fn load_booking_context(
    state: &ApiState,
    contractor_id: Uuid,
    date: NaiveDate,
) -> Result<BookingContext, AppError> {
    let profile = jobsync_db::repositories::availability::get_profile(&state.db_pool, contractor_id)
        .await
        .map_err(SchedulingError::Database)?
        .ok_or_else(|| {
            SchedulingError::NotFound(format!(
                "Availability profile for contractor {} not found",
                contractor_id
            ))
        })?
        .into_profile()
        .map_err(SchedulingError::Database)?;

    let tz = profile.timezone()?;
    let today = Utc::now().with_timezone(&tz).date_naive();

    let blocked = jobsync_db::repositories::availability::get_blocked_dates(
        &state.db_pool,
        contractor_id,
        date,
        date,
    )
    .await
    .map_err(SchedulingError::Database)?
    .into_iter()
    .map(BlockedDate::from)
    .collect();

    let active_jobs = jobsync_db::repositories::job::active_jobs_for_day(
        &state.db_pool,
        contractor_id,
        date,
    )
    .await
    .map_err(SchedulingError::Database)?
    .into_iter()
    .map(|row| row.into_job())
    .collect::<Result<Vec<_>, _>>()
    .map_err(SchedulingError::Database)?;

    Ok(BookingContext {
        profile,
        blocked,
        active_jobs,
        today,
    })
}

/// A commit that lost the race to a concurrent overlapping insert surfaces
/// as an exclusion violation; report it like any other conflict.
fn map_commit_error(err: eyre::Report) -> AppError {
    if jobsync_db::repositories::job::is_exclusion_violation(&err) {
        AppError(SchedulingError::Conflict(BookingRejection {
            reason: ConflictReason::Conflict,
            message: "Booking overlaps a concurrently committed job".to_string(),
            conflicting_job_id: None,
        }))
    } else {
        AppError(SchedulingError::Database(err))
    }
}

fn spawn_route_optimization(state: &Arc<ApiState>, contractor_id: Uuid, date: NaiveDate) {
    let state = Arc::clone(state);
    tokio::spawn(async move {
        if let Err(e) = optimizer::optimize_day(state, contractor_id, date).await {
            tracing::warn!(
                "Route optimization for {}/{} skipped: {}",
                contractor_id,
                date,
                e
            );
        }
    });
}

/// Books a job into a contractor's schedule.
///
/// # Endpoint
///
/// ```text
/// POST /api/jobs/:id/schedule
/// ```
///
/// Responds 200 with the committed job and its calendar event, 409 with a
/// structured reason code when the slot is not bookable, 422 on malformed
/// input, and 404 when the contractor has no availability profile. Side
/// effects (notifications, route optimization) are best-effort and never
/// roll back the booking.
#[axum::debug_handler]
pub async fn schedule_job(
    State(state): State<Arc<ApiState>>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<ScheduleJobRequest>,
) -> Result<Json<ScheduleJobResponse>, AppError> {
    // End time wins over a disagreeing duration, so the validated interval
    // is always the stored one.
    let (end_time, duration_hours) = payload
        .resolve_window()
        .map_err(SchedulingError::Validation)?;

    let ctx = load_booking_context(&state, payload.contractor_id, payload.date).await?;

    let candidate = BookingCandidate {
        date: payload.date,
        start: payload.start_time,
        duration_hours,
        exclude_job_id: None,
    };
    booking::validate_booking(
        &ctx.profile,
        &ctx.blocked,
        &ctx.active_jobs,
        ctx.today,
        &candidate,
    )
    .map_err(SchedulingError::Conflict)?;

    let job = ScheduledJob {
        id: job_id,
        contractor_id: payload.contractor_id,
        customer_id: payload.customer_id,
        date: payload.date,
        start_time: payload.start_time,
        end_time,
        duration_hours,
        status: JobStatus::Assigned,
        latitude: payload.latitude,
        longitude: payload.longitude,
        urgency: payload.urgency,
        notes: payload.notes,
    };

    let committed = jobsync_db::repositories::job::assign_job(&state.db_pool, &job)
        .await
        .map_err(map_commit_error)?
        .into_job()
        .map_err(SchedulingError::Database)?;

    let calendar_event = job_to_ics(&committed, &ctx.profile.time_zone);

    // Best-effort fan-out; the booking stands whatever happens below.
    notify_best_effort(
        &state,
        committed.customer_id,
        NotificationMessage::job_scheduled(&committed),
    )
    .await;
    notify_best_effort(
        &state,
        committed.contractor_id,
        NotificationMessage::job_scheduled(&committed),
    )
    .await;
    spawn_route_optimization(&state, committed.contractor_id, committed.date);

    Ok(Json(ScheduleJobResponse {
        job: committed,
        calendar_event,
    }))
}

/// Moves an existing booking to a new window, auditing the change.
///
/// # Endpoint
///
/// ```text
/// POST /api/jobs/:id/reschedule
/// ```
///
/// The job's own window is excluded from conflict checks, so rescheduling a
/// job onto its current slot succeeds. Job status never changes here. The
/// party that did not ask for the change gets notified.
#[axum::debug_handler]
pub async fn reschedule_job(
    State(state): State<Arc<ApiState>>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<RescheduleJobRequest>,
) -> Result<Json<ScheduleJobResponse>, AppError> {
    if payload.new_end <= payload.new_start {
        return Err(AppError(SchedulingError::Validation(
            "new_end must be after new_start".to_string(),
        )));
    }

    let existing = jobsync_db::repositories::job::get_job(&state.db_pool, job_id)
        .await
        .map_err(SchedulingError::Database)?
        .ok_or_else(|| SchedulingError::NotFound(format!("Job {} not found", job_id)))?
        .into_job()
        .map_err(SchedulingError::Database)?;

    let ctx = load_booking_context(&state, existing.contractor_id, payload.new_date).await?;

    let duration_hours =
        (payload.new_end - payload.new_start).num_minutes() as f64 / 60.0;
    let candidate = BookingCandidate {
        date: payload.new_date,
        start: payload.new_start,
        duration_hours,
        exclude_job_id: Some(job_id),
    };
    booking::validate_booking(
        &ctx.profile,
        &ctx.blocked,
        &ctx.active_jobs,
        ctx.today,
        &candidate,
    )
    .map_err(SchedulingError::Conflict)?;

    let updated = jobsync_db::repositories::job::reschedule_job(
        &state.db_pool,
        job_id,
        payload.new_date,
        payload.new_start,
        payload.new_end,
        duration_hours,
    )
    .await
    .map_err(map_commit_error)?
    .into_job()
    .map_err(SchedulingError::Database)?;

    jobsync_db::repositories::reschedule::insert_record(&state.db_pool, &existing, &payload)
        .await
        .map_err(SchedulingError::Database)?;

    // Tell the party that did not request the change.
    let recipient = match payload.requested_by {
        RequestedBy::Contractor => updated.customer_id,
        RequestedBy::Customer => updated.contractor_id,
    };
    notify_best_effort(
        &state,
        recipient,
        NotificationMessage::job_rescheduled(&updated),
    )
    .await;
    spawn_route_optimization(&state, updated.contractor_id, updated.date);

    let calendar_event = job_to_ics(&updated, &ctx.profile.time_zone);
    Ok(Json(ScheduleJobResponse {
        job: updated,
        calendar_event,
    }))
}

/// Lists a contractor's scheduled events for display.
///
/// # Endpoint
///
/// ```text
/// GET /api/contractors/:id/calendar?start=2026-09-01&end=2026-09-30
/// ```
#[axum::debug_handler]
pub async fn contractor_calendar(
    State(state): State<Arc<ApiState>>,
    Path(contractor_id): Path<Uuid>,
    Query(range): Query<CalendarRangeQuery>,
) -> Result<Json<Vec<CalendarEntry>>, AppError> {
    if range.end < range.start {
        return Err(AppError(SchedulingError::Validation(
            "Range end must not precede start".to_string(),
        )));
    }

    let entries = jobsync_db::repositories::job::listed_jobs_in_range(
        &state.db_pool,
        contractor_id,
        range.start,
        range.end,
    )
    .await
    .map_err(SchedulingError::Database)?
    .into_iter()
    .map(|row| row.into_job().map(CalendarEntry::from))
    .collect::<Result<Vec<_>, _>>()
    .map_err(SchedulingError::Database)?;

    Ok(Json(entries))
}
