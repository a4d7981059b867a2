//! Route optimization arithmetic.
//!
//! The acceptance decision and the sequential rewrite of a day's job windows
//! are pure functions here; the `jobsync-api` optimizer service wires them to
//! the routing client and the repositories.

use chrono::{Duration, NaiveTime};
use uuid::Uuid;

use crate::models::job::ScheduledJob;
use crate::models::route::{OptimizedRoute, RouteLeg};

/// Assumed travel between consecutive stops when no real leg is available.
pub const INTER_STOP_BUFFER_MINUTES: i64 = 30;

/// An optimized day must beat the naive baseline by at least 15%; smaller
/// gains are not worth churning schedules both parties were already told.
pub const ACCEPTANCE_RATIO: f64 = 0.85;

/// All rewritten days restart from this contractor-local anchor.
pub fn day_start_anchor() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).expect("08:00 is a valid time")
}

/// Baseline total for the day as currently ordered: fixed 30-minute travel
/// between stops plus the job durations themselves.
pub fn naive_total_minutes(jobs: &[ScheduledJob]) -> f64 {
    if jobs.is_empty() {
        return 0.0;
    }
    let travel = (jobs.len() as i64 - 1) * INTER_STOP_BUFFER_MINUTES;
    let work: f64 = jobs.iter().map(|j| j.duration_hours * 60.0).sum();
    travel as f64 + work
}

pub fn should_accept(optimized_total_minutes: f64, naive_total_minutes: f64) -> bool {
    optimized_total_minutes < ACCEPTANCE_RATIO * naive_total_minutes
}

/// A job's new window after an accepted optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewrittenWindow {
    pub job_id: Uuid,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl RewrittenWindow {
    /// The job as it stands after this rewrite. Notifications about the
    /// change must be built from this, not from the pre-rewrite job.
    pub fn apply_to(&self, job: &ScheduledJob) -> ScheduledJob {
        let mut moved = job.clone();
        moved.start_time = self.start;
        moved.end_time = self.end;
        moved
    }
}

/// Lays the day's jobs out sequentially from the 08:00 anchor in the
/// optimized order. Inter-stop gaps use the routing response's actual leg
/// durations where present, falling back to the 30-minute constant.
///
/// Returns `None` when the optimized order is not a valid permutation of the
/// submitted jobs; callers treat that as a rejected optimization.
pub fn rewrite_windows(jobs: &[ScheduledJob], route: &OptimizedRoute) -> Option<Vec<RewrittenWindow>> {
    if route.optimized_order.len() != jobs.len() {
        return None;
    }
    let mut seen = vec![false; jobs.len()];
    for &idx in &route.optimized_order {
        if idx >= jobs.len() || seen[idx] {
            return None;
        }
        seen[idx] = true;
    }

    let mut windows = Vec::with_capacity(jobs.len());
    let mut cursor = day_start_anchor();
    for (position, &idx) in route.optimized_order.iter().enumerate() {
        let job = &jobs[idx];
        let (end, wrapped) = cursor.overflowing_add_signed(Duration::minutes(job.duration_minutes()));
        if wrapped != 0 {
            return None;
        }
        windows.push(RewrittenWindow {
            job_id: job.id,
            start: cursor,
            end,
        });

        if position + 1 < route.optimized_order.len() {
            let gap = leg_minutes(route.legs.get(position));
            let (next, wrapped) = end.overflowing_add_signed(Duration::minutes(gap));
            if wrapped != 0 {
                return None;
            }
            cursor = next;
        }
    }
    Some(windows)
}

fn leg_minutes(leg: Option<&RouteLeg>) -> i64 {
    match leg {
        Some(leg) if leg.duration_minutes.is_finite() && leg.duration_minutes >= 0.0 => {
            leg.duration_minutes.round() as i64
        }
        _ => INTER_STOP_BUFFER_MINUTES,
    }
}
