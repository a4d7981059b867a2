//! # Availability Handlers
//!
//! Contractor-facing endpoints for declaring working hours and for listing
//! the open slots those hours produce. Slot generation itself is pure logic
//! in `jobsync_core::slots`; these handlers load the inputs and shape the
//! response.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use jobsync_core::errors::SchedulingError;
use jobsync_core::models::availability::{
    AvailabilityProfile, BlockedDate, DayAvailability, SetAvailabilityRequest,
    SetAvailabilityResponse,
};
use jobsync_core::slots;

use crate::{middleware::error_handling::AppError, ApiState};

/// Query parameters for the slot listing endpoint.
#[derive(Debug, Deserialize)]
pub struct SlotRangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Replaces a contractor's availability profile and blocked-date set.
///
/// # Endpoint
///
/// ```text
/// PUT /api/contractors/:id/availability
/// ```
///
/// Returns 422 when the working hours are malformed (an enabled day with
/// start >= end, an unknown time zone, or a non-positive daily cap).
#[axum::debug_handler]
pub async fn set_availability(
    State(state): State<Arc<ApiState>>,
    Path(contractor_id): Path<Uuid>,
    Json(payload): Json<SetAvailabilityRequest>,
) -> Result<Json<SetAvailabilityResponse>, AppError> {
    let profile = AvailabilityProfile {
        contractor_id,
        working_hours: payload.working_hours,
        time_zone: payload.time_zone,
        break_duration_minutes: payload.break_duration_minutes,
        max_jobs_per_day: payload.max_jobs_per_day,
        advance_booking_days: payload.advance_booking_days,
        emergency_available: payload.emergency_available,
    };
    profile.validate()?;

    let blocked: Vec<BlockedDate> = payload
        .blocked_dates
        .into_iter()
        .map(|b| BlockedDate {
            contractor_id,
            date: b.date,
            reason: b.reason,
            all_day: b.all_day,
        })
        .collect();

    let row = jobsync_db::repositories::availability::upsert_profile(
        &state.db_pool,
        &profile,
        &blocked,
    )
    .await
    .map_err(SchedulingError::Database)?;

    Ok(Json(SetAvailabilityResponse {
        contractor_id: row.contractor_id,
        updated_at: row.updated_at,
    }))
}

/// Lists a contractor's open slots per day across a date range.
///
/// # Endpoint
///
/// ```text
/// GET /api/contractors/:id/availability?start=2026-09-01&end=2026-09-07
/// ```
///
/// Every day in the range appears in the response; disabled weekdays and
/// blocked dates carry an empty slot list.
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path(contractor_id): Path<Uuid>,
    Query(range): Query<SlotRangeQuery>,
) -> Result<Json<Vec<DayAvailability>>, AppError> {
    if range.end < range.start {
        return Err(AppError(SchedulingError::Validation(
            "Range end must not precede start".to_string(),
        )));
    }

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

    let blocked = jobsync_db::repositories::availability::get_blocked_dates(
        &state.db_pool,
        contractor_id,
        range.start,
        range.end,
    )
    .await
    .map_err(SchedulingError::Database)?
    .into_iter()
    .map(BlockedDate::from)
    .collect::<Vec<_>>();

    let jobs = jobsync_db::repositories::job::active_jobs_in_range(
        &state.db_pool,
        contractor_id,
        range.start,
        range.end,
    )
    .await
    .map_err(SchedulingError::Database)?
    .into_iter()
    .map(|row| row.into_job())
    .collect::<Result<Vec<_>, _>>()
    .map_err(SchedulingError::Database)?;

    let days = slots::generate_slots(
        &profile,
        &blocked,
        &jobs,
        range.start,
        range.end,
        state.config.slot_increment_minutes,
    );

    Ok(Json(days))
}
