//! Route optimizer.
//!
//! After a successful booking the scheduler triggers `optimize_day` for the
//! affected contractor-day. The day's active visits go to the routing
//! service; the reordered schedule is committed only when it beats the naive
//! baseline by at least 15% (`jobsync_core::routeplan::ACCEPTANCE_RATIO`),
//! so marginal gains never churn times both parties were already told.
//!
//! Runs for the same (contractor, date) are serialized through a Postgres
//! advisory lock, which holds across service instances.

use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use jobsync_core::errors::{SchedulingError, SchedulingResult};
use jobsync_core::models::job::ScheduledJob;
use jobsync_core::models::route::{Coordinates, RouteOptimizationResult, RouteStop};
use jobsync_core::routeplan;

use crate::services::notify::{notify_best_effort, NotificationMessage};
use crate::ApiState;

/// Re-optimizes one contractor-day. Returns the decision record; only an
/// accepted optimization mutates job windows.
pub async fn optimize_day(
    state: Arc<ApiState>,
    contractor_id: Uuid,
    date: NaiveDate,
) -> SchedulingResult<RouteOptimizationResult> {
    let lock = jobsync_db::repositories::job::lock_day(&state.db_pool, contractor_id, date)
        .await
        .map_err(SchedulingError::Database)?;

    let result = optimize_day_locked(&state, contractor_id, date).await;

    if let Err(e) =
        jobsync_db::repositories::job::unlock_day(lock, contractor_id, date).await
    {
        tracing::warn!("Failed to release day lock for {}/{}: {}", contractor_id, date, e);
    }

    result
}

async fn optimize_day_locked(
    state: &ApiState,
    contractor_id: Uuid,
    date: NaiveDate,
) -> SchedulingResult<RouteOptimizationResult> {
    let jobs: Vec<ScheduledJob> =
        jobsync_db::repositories::job::active_jobs_for_day(&state.db_pool, contractor_id, date)
            .await
            .map_err(SchedulingError::Database)?
            .into_iter()
            .map(|row| row.into_job())
            .collect::<Result<_, _>>()
            .map_err(SchedulingError::Database)?;

    let routable: Vec<&ScheduledJob> = jobs.iter().filter(|j| j.has_coordinates()).collect();
    let original_order: Vec<Uuid> = routable.iter().map(|j| j.id).collect();

    if routable.len() < 2 {
        return Ok(RouteOptimizationResult::skipped(
            contractor_id,
            date,
            original_order,
        ));
    }

    let stops: Vec<RouteStop> = routable
        .iter()
        .map(|job| RouteStop {
            job_id: job.id,
            coordinates: Coordinates {
                latitude: job.latitude.unwrap_or_default(),
                longitude: job.longitude.unwrap_or_default(),
            },
        })
        .collect();
    let origin = stops[0].coordinates;

    let owned: Vec<ScheduledJob> = routable.into_iter().cloned().collect();
    let naive_total = routeplan::naive_total_minutes(&owned);

    let route = tokio::time::timeout(
        state.config.external_timeout,
        state.routing.get_optimized_route(origin, stops),
    )
    .await
    .map_err(|_| SchedulingError::ExternalService("Routing request timed out".to_string()))??;

    if !routeplan::should_accept(route.total_duration_minutes, naive_total) {
        tracing::debug!(
            "Rejecting optimization for {}/{}: {:.0}min vs naive {:.0}min",
            contractor_id,
            date,
            route.total_duration_minutes,
            naive_total
        );
        return Ok(RouteOptimizationResult {
            contractor_id,
            date,
            original_order: original_order.clone(),
            optimized_order: original_order,
            estimated_time_savings_minutes: (naive_total - route.total_duration_minutes).max(0.0),
            accepted: false,
        });
    }

    let windows = routeplan::rewrite_windows(&owned, &route).ok_or_else(|| {
        SchedulingError::ExternalService("Routing response is not a valid reordering".to_string())
    })?;

    jobsync_db::repositories::job::rewrite_day_windows(&state.db_pool, &windows)
        .await
        .map_err(SchedulingError::Database)?;

    let optimized_order: Vec<Uuid> = windows.iter().map(|w| w.job_id).collect();
    tracing::info!(
        "Accepted route optimization for {}/{}: saved {:.0} minutes",
        contractor_id,
        date,
        naive_total - route.total_duration_minutes
    );

    // Both parties of every moved job hear about the new time, best-effort.
    // Messages carry the rewritten windows, never the pre-rewrite ones.
    for window in &windows {
        if let Some(job) = owned.iter().find(|j| j.id == window.job_id) {
            let moved = window.apply_to(job);
            let message = NotificationMessage::schedule_updated(&moved);
            notify_best_effort(state, moved.customer_id, message).await;
        }
    }
    if let Some(window) = windows.first() {
        if let Some(job) = owned.iter().find(|j| j.id == window.job_id) {
            let moved = window.apply_to(job);
            let message = NotificationMessage::schedule_updated(&moved);
            notify_best_effort(state, moved.contractor_id, message).await;
        }
    }

    Ok(RouteOptimizationResult {
        contractor_id,
        date,
        original_order,
        optimized_order,
        estimated_time_savings_minutes: naive_total - route.total_duration_minutes,
        accepted: true,
    })
}
