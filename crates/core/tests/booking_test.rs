use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use jobsync_core::booking::{validate_booking, BookingCandidate, ConflictReason};
use jobsync_core::models::availability::{
    AvailabilityProfile, BlockedDate, DayHours, WeeklyHours,
};
use jobsync_core::models::job::{JobStatus, ScheduledJob};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn open(start: NaiveTime, end: NaiveTime) -> DayHours {
    DayHours {
        enabled: true,
        start,
        end,
    }
}

/// Monday-Friday 08:00-17:00, weekend off, 14-day advance window, cap of 3.
fn profile() -> AvailabilityProfile {
    let workday = open(t(8, 0), t(17, 0));
    AvailabilityProfile {
        contractor_id: Uuid::new_v4(),
        working_hours: WeeklyHours {
            monday: workday,
            tuesday: workday,
            wednesday: workday,
            thursday: workday,
            friday: workday,
            saturday: DayHours::closed(),
            sunday: DayHours::closed(),
        },
        time_zone: "America/Chicago".to_string(),
        break_duration_minutes: 0,
        max_jobs_per_day: 3,
        advance_booking_days: 14,
        emergency_available: false,
    }
}

// 2026-01-05 is a Monday.
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

fn job_at(date: NaiveDate, start: NaiveTime, end: NaiveTime, status: JobStatus) -> ScheduledJob {
    ScheduledJob {
        id: Uuid::new_v4(),
        contractor_id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        date,
        start_time: start,
        end_time: end,
        duration_hours: (end - start).num_minutes() as f64 / 60.0,
        status,
        latitude: None,
        longitude: None,
        urgency: None,
        notes: None,
    }
}

fn candidate(date: NaiveDate, start: NaiveTime, duration_hours: f64) -> BookingCandidate {
    BookingCandidate {
        date,
        start,
        duration_hours,
        exclude_job_id: None,
    }
}

#[test]
fn accepts_booking_within_working_hours() {
    let result = validate_booking(
        &profile(),
        &[],
        &[],
        today(),
        &candidate(today(), t(9, 0), 2.0),
    );
    assert!(result.is_ok());
}

#[test]
fn rejects_past_date() {
    let yesterday = today().pred_opt().unwrap();
    let err = validate_booking(&profile(), &[], &[], today(), &candidate(yesterday, t(9, 0), 1.0))
        .unwrap_err();
    assert_eq!(err.reason, ConflictReason::PastDate);
}

#[test]
fn advance_window_boundary_is_inclusive() {
    // today + 14 lands on a Monday again, so the weekday check passes.
    let boundary = today() + chrono::Duration::days(14);
    let result = validate_booking(
        &profile(),
        &[],
        &[],
        today(),
        &candidate(boundary, t(9, 0), 1.0),
    );
    assert!(result.is_ok());

    let too_far = boundary.succ_opt().unwrap();
    let err = validate_booking(&profile(), &[], &[], today(), &candidate(too_far, t(9, 0), 1.0))
        .unwrap_err();
    assert_eq!(err.reason, ConflictReason::TooFarInAdvance);
}

#[test]
fn rejects_disabled_weekday() {
    // today + 6 is a Sunday.
    let sunday = today() + chrono::Duration::days(6);
    let err = validate_booking(&profile(), &[], &[], today(), &candidate(sunday, t(9, 0), 1.0))
        .unwrap_err();
    assert_eq!(err.reason, ConflictReason::DayUnavailable);
}

#[test]
fn rejects_blocked_date() {
    let profile = profile();
    let blocked = vec![BlockedDate {
        contractor_id: profile.contractor_id,
        date: today(),
        reason: Some("Training day".to_string()),
        all_day: true,
    }];
    let err = validate_booking(&profile, &blocked, &[], today(), &candidate(today(), t(9, 0), 1.0))
        .unwrap_err();
    assert_eq!(err.reason, ConflictReason::DayUnavailable);
}

#[test]
fn partial_day_block_does_not_reject_bookings() {
    let profile = profile();
    let blocked = vec![BlockedDate {
        contractor_id: profile.contractor_id,
        date: today(),
        reason: Some("Dentist in the morning".to_string()),
        all_day: false,
    }];
    let result = validate_booking(
        &profile,
        &blocked,
        &[],
        today(),
        &candidate(today(), t(9, 0), 1.0),
    );
    assert!(result.is_ok());
}

#[test]
fn rejects_window_outside_working_hours() {
    let before = validate_booking(&profile(), &[], &[], today(), &candidate(today(), t(7, 0), 1.0))
        .unwrap_err();
    assert_eq!(before.reason, ConflictReason::OutsideHours);

    // Starts inside but runs past closing.
    let overrun = validate_booking(&profile(), &[], &[], today(), &candidate(today(), t(16, 0), 2.0))
        .unwrap_err();
    assert_eq!(overrun.reason, ConflictReason::OutsideHours);
}

#[test]
fn touching_intervals_do_not_conflict() {
    let existing = job_at(today(), t(9, 0), t(10, 0), JobStatus::Assigned);
    let result = validate_booking(
        &profile(),
        &[],
        &[existing],
        today(),
        &candidate(today(), t(10, 0), 2.0),
    );
    assert!(result.is_ok());
}

#[test]
fn overlapping_interval_reports_the_conflicting_job() {
    let existing = job_at(today(), t(9, 0), t(10, 0), JobStatus::Assigned);
    let existing_id = existing.id;
    let err = validate_booking(
        &profile(),
        &[],
        &[existing],
        today(),
        &candidate(today(), t(9, 30), 1.5),
    )
    .unwrap_err();
    assert_eq!(err.reason, ConflictReason::Conflict);
    assert_eq!(err.conflicting_job_id, Some(existing_id));
}

#[test]
fn completed_and_cancelled_jobs_do_not_conflict() {
    let done = job_at(today(), t(9, 0), t(10, 0), JobStatus::Completed);
    let gone = job_at(today(), t(10, 0), t(11, 0), JobStatus::Cancelled);
    let result = validate_booking(
        &profile(),
        &[],
        &[done, gone],
        today(),
        &candidate(today(), t(9, 30), 1.0),
    );
    assert!(result.is_ok());
}

#[test]
fn daily_limit_rejects_the_fourth_active_job() {
    let jobs = vec![
        job_at(today(), t(8, 0), t(9, 0), JobStatus::Assigned),
        job_at(today(), t(9, 0), t(10, 0), JobStatus::InProgress),
        job_at(today(), t(10, 0), t(11, 0), JobStatus::Assigned),
    ];
    let err = validate_booking(
        &profile(),
        &[],
        &jobs,
        today(),
        &candidate(today(), t(13, 0), 1.0),
    )
    .unwrap_err();
    assert_eq!(err.reason, ConflictReason::DailyLimit);
}

#[test]
fn rescheduling_onto_own_slot_is_allowed() {
    let existing = job_at(today(), t(9, 0), t(10, 0), JobStatus::Assigned);
    let own = BookingCandidate {
        date: today(),
        start: t(9, 0),
        duration_hours: 1.0,
        exclude_job_id: Some(existing.id),
    };
    let result = validate_booking(&profile(), &[], &[existing], today(), &own);
    assert!(result.is_ok());
}

#[test]
fn excluded_job_does_not_count_toward_the_daily_cap() {
    let jobs = vec![
        job_at(today(), t(8, 0), t(9, 0), JobStatus::Assigned),
        job_at(today(), t(9, 0), t(10, 0), JobStatus::Assigned),
        job_at(today(), t(10, 0), t(11, 0), JobStatus::Assigned),
    ];
    let moved = BookingCandidate {
        date: today(),
        start: t(13, 0),
        duration_hours: 1.0,
        exclude_job_id: Some(jobs[2].id),
    };
    let result = validate_booking(&profile(), &[], &jobs, today(), &moved);
    assert!(result.is_ok());
}

#[test]
fn break_buffer_pads_existing_bookings() {
    let mut profile = profile();
    profile.break_duration_minutes = 30;
    let existing = job_at(today(), t(9, 0), t(10, 0), JobStatus::Assigned);

    // 10:00 start now falls inside the padded window.
    let err = validate_booking(
        &profile,
        &[],
        &[existing.clone()],
        today(),
        &candidate(today(), t(10, 0), 1.0),
    )
    .unwrap_err();
    assert_eq!(err.reason, ConflictReason::Conflict);

    // 10:30 clears the buffer.
    let result = validate_booking(
        &profile,
        &[],
        &[existing],
        today(),
        &candidate(today(), t(10, 30), 1.0),
    );
    assert!(result.is_ok());
}
