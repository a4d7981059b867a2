//! Booking validation.
//!
//! `validate_booking` evaluates one candidate booking against a contractor's
//! availability profile, blocked dates, and the day's active jobs. Checks run
//! in a fixed order and short-circuit at the first failure; every rejection
//! carries a machine-readable [`ConflictReason`] so callers never have to
//! parse message text.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::availability::{AvailabilityProfile, BlockedDate};
use crate::models::job::ScheduledJob;

/// Machine-readable rejection codes, serialized as stable wire constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictReason {
    PastDate,
    TooFarInAdvance,
    DayUnavailable,
    OutsideHours,
    Conflict,
    DailyLimit,
}

impl ConflictReason {
    pub fn code(self) -> &'static str {
        match self {
            ConflictReason::PastDate => "PAST_DATE",
            ConflictReason::TooFarInAdvance => "TOO_FAR_IN_ADVANCE",
            ConflictReason::DayUnavailable => "DAY_UNAVAILABLE",
            ConflictReason::OutsideHours => "OUTSIDE_HOURS",
            ConflictReason::Conflict => "CONFLICT",
            ConflictReason::DailyLimit => "DAILY_LIMIT",
        }
    }
}

/// A structured rejection: the reason code, a human-readable message, and the
/// conflicting job when the reason is `Conflict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRejection {
    pub reason: ConflictReason,
    pub message: String,
    pub conflicting_job_id: Option<Uuid>,
}

impl BookingRejection {
    fn new(reason: ConflictReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            conflicting_job_id: None,
        }
    }
}

impl std::fmt::Display for BookingRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.reason.code(), self.message)
    }
}

/// One candidate booking to validate. `exclude_job_id` skips a job in the
/// conflict and daily-cap checks, used when rescheduling that same job.
#[derive(Debug, Clone, Copy)]
pub struct BookingCandidate {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub duration_hours: f64,
    pub exclude_job_id: Option<Uuid>,
}

/// Half-open interval overlap: `[a_start, a_end)` intersects `[b_start, b_end)`.
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// A job's interval widened by the contractor's break buffer on both sides,
/// clamped to the day.
pub fn padded_window(job: &ScheduledJob, break_minutes: i32) -> (NaiveTime, NaiveTime) {
    let buffer = Duration::minutes(i64::from(break_minutes.max(0)));
    let (start, start_wrap) = job.start_time.overflowing_sub_signed(buffer);
    let (end, end_wrap) = job.end_time.overflowing_add_signed(buffer);
    let start = if start_wrap != 0 { NaiveTime::MIN } else { start };
    let end = if end_wrap != 0 {
        NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(job.end_time)
    } else {
        end
    };
    (start, end)
}

/// Validates one candidate booking. `today` must already be the current date
/// in the contractor's time zone. `active_jobs` are the contractor's active
/// jobs on `candidate.date`.
pub fn validate_booking(
    profile: &AvailabilityProfile,
    blocked: &[BlockedDate],
    active_jobs: &[ScheduledJob],
    today: NaiveDate,
    candidate: &BookingCandidate,
) -> Result<(), BookingRejection> {
    // Advance-booking window.
    let days_ahead = (candidate.date - today).num_days();
    if days_ahead < 0 {
        return Err(BookingRejection::new(
            ConflictReason::PastDate,
            "Requested date is in the past",
        ));
    }
    if days_ahead > i64::from(profile.advance_booking_days) {
        return Err(BookingRejection::new(
            ConflictReason::TooFarInAdvance,
            format!(
                "Bookings may be placed at most {} days ahead",
                profile.advance_booking_days
            ),
        ));
    }

    // Weekday enabled and date not blocked.
    let weekday = candidate.date.weekday();
    let hours = profile.working_hours.for_weekday(weekday);
    if !hours.enabled {
        return Err(BookingRejection::new(
            ConflictReason::DayUnavailable,
            format!("Contractor does not work on {:?}", weekday),
        ));
    }
    // Only an all-day block makes the date unbookable; a partial block
    // carries no time window and stays advisory.
    if blocked.iter().any(|b| b.date == candidate.date && b.all_day) {
        return Err(BookingRejection::new(
            ConflictReason::DayUnavailable,
            "Contractor has blocked this date",
        ));
    }

    // Candidate interval fully inside the working window.
    let duration = Duration::minutes((candidate.duration_hours * 60.0).round() as i64);
    if duration <= Duration::zero() {
        return Err(BookingRejection::new(
            ConflictReason::OutsideHours,
            "Booking duration must be positive",
        ));
    }
    let (end, wrapped) = candidate.start.overflowing_add_signed(duration);
    if wrapped != 0 || candidate.start < hours.start || end > hours.end {
        return Err(BookingRejection::new(
            ConflictReason::OutsideHours,
            format!(
                "Requested window is outside working hours {}-{}",
                hours.start.format("%H:%M"),
                hours.end.format("%H:%M")
            ),
        ));
    }

    // Conflict against existing active jobs, break-padded.
    let relevant = active_jobs
        .iter()
        .filter(|job| job.status.is_active() && job.date == candidate.date)
        .filter(|job| Some(job.id) != candidate.exclude_job_id);
    for job in relevant.clone() {
        let (busy_start, busy_end) = padded_window(job, profile.break_duration_minutes);
        if intervals_overlap(candidate.start, end, busy_start, busy_end) {
            return Err(BookingRejection {
                reason: ConflictReason::Conflict,
                message: format!(
                    "Overlaps existing booking {}-{}",
                    job.start_time.format("%H:%M"),
                    job.end_time.format("%H:%M")
                ),
                conflicting_job_id: Some(job.id),
            });
        }
    }

    // Daily cap.
    let booked = relevant.count() as i32;
    if booked >= profile.max_jobs_per_day {
        return Err(BookingRejection::new(
            ConflictReason::DailyLimit,
            format!(
                "Contractor already has {} jobs on this date (limit {})",
                booked, profile.max_jobs_per_day
            ),
        ));
    }

    Ok(())
}
