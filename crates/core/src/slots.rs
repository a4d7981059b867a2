//! Open-slot generation.
//!
//! Walks a date range and produces, for every calendar day, the fixed-size
//! windows inside the contractor's working hours that do not collide with an
//! active job. Days on a disabled weekday or a date blocked all-day come back
//! with an empty slot list, so the output always has one entry per day in
//! range.

use chrono::{Datelike, Duration, NaiveDate};

use crate::booking::{intervals_overlap, padded_window};
use crate::models::availability::{AvailabilityProfile, BlockedDate, DayAvailability, SlotWindow};
use crate::models::job::ScheduledJob;

/// Default slot width when the deployment does not configure one.
pub const DEFAULT_SLOT_INCREMENT_MINUTES: i64 = 60;

fn weekday_name(date: NaiveDate) -> String {
    // chrono's Debug form already matches the short names; the UI wants the
    // full English name.
    match date.weekday() {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    }
    .to_string()
}

/// Generates per-day open slots for `[start_date, end_date]` inclusive.
///
/// `jobs` may span the whole range; only active jobs on the day under
/// consideration are held against candidate slots, each padded by the
/// profile's `break_duration_minutes`. A trailing remainder shorter than one
/// increment is dropped, so a 08:00-16:30 window at 60 minutes yields eight
/// slots.
pub fn generate_slots(
    profile: &AvailabilityProfile,
    blocked: &[BlockedDate],
    jobs: &[ScheduledJob],
    start_date: NaiveDate,
    end_date: NaiveDate,
    increment_minutes: i64,
) -> Vec<DayAvailability> {
    let increment = Duration::minutes(increment_minutes.max(1));
    let mut days = Vec::new();

    let mut date = start_date;
    while date <= end_date {
        days.push(day_slots(profile, blocked, jobs, date, increment));
        date += Duration::days(1);
    }
    days
}

fn day_slots(
    profile: &AvailabilityProfile,
    blocked: &[BlockedDate],
    jobs: &[ScheduledJob],
    date: NaiveDate,
    increment: Duration,
) -> DayAvailability {
    let hours = profile.working_hours.for_weekday(date.weekday());
    let is_blocked = blocked.iter().any(|b| b.date == date && b.all_day);

    let mut slots = Vec::new();
    if hours.enabled && !is_blocked {
        let mut busy: Vec<_> = jobs
            .iter()
            .filter(|job| job.status.is_active() && job.date == date)
            .map(|job| padded_window(job, profile.break_duration_minutes))
            .collect();
        busy.sort_by_key(|(start, _)| *start);

        let mut cursor = hours.start;
        loop {
            let (slot_end, wrapped) = cursor.overflowing_add_signed(increment);
            if wrapped != 0 || slot_end > hours.end {
                break;
            }
            let free = !busy
                .iter()
                .any(|&(b_start, b_end)| intervals_overlap(cursor, slot_end, b_start, b_end));
            if free {
                slots.push(SlotWindow {
                    start: cursor,
                    end: slot_end,
                });
            }
            cursor = slot_end;
        }
    }

    DayAvailability {
        date,
        day_of_week: weekday_name(date),
        slots,
    }
}
