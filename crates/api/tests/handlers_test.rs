//! Handler-flow tests against mock repositories: the load-validate-commit
//! path of the scheduling handlers, with the store replaced by
//! `jobsync_db::mock` so no database is needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{NaiveDate, NaiveTime, Utc};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use jobsync_api::middleware::error_handling::AppError;
use jobsync_core::booking::{self, BookingCandidate, ConflictReason};
use jobsync_core::errors::SchedulingError;
use jobsync_core::models::availability::{BlockedDate, DayHours, WeeklyHours};
use jobsync_core::models::job::{CalendarEntry, RequestedBy, RescheduleJobRequest};
use jobsync_db::mock::repositories::{MockAvailabilityRepo, MockJobRepo, MockRescheduleRepo};
use jobsync_db::models::{DbAvailabilityProfile, DbRescheduleRecord, DbScheduledJob};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// 2026-01-05 is a Monday.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

fn profile_row(contractor_id: Uuid) -> DbAvailabilityProfile {
    let workday = DayHours {
        enabled: true,
        start: t(8, 0),
        end: t(17, 0),
    };
    let hours = WeeklyHours {
        monday: workday,
        tuesday: workday,
        wednesday: workday,
        thursday: workday,
        friday: workday,
        saturday: DayHours::closed(),
        sunday: DayHours::closed(),
    };
    DbAvailabilityProfile {
        contractor_id,
        working_hours: serde_json::to_value(hours).unwrap(),
        time_zone: "UTC".to_string(),
        break_duration_minutes: 0,
        max_jobs_per_day: 3,
        advance_booking_days: 14,
        emergency_available: false,
        updated_at: Utc::now(),
    }
}

fn job_row(contractor_id: Uuid, start: NaiveTime, end: NaiveTime) -> DbScheduledJob {
    DbScheduledJob {
        id: Uuid::new_v4(),
        contractor_id,
        customer_id: Uuid::new_v4(),
        scheduled_date: monday(),
        start_time: start,
        end_time: end,
        duration_hours: (end - start).num_minutes() as f64 / 60.0,
        status: "assigned".to_string(),
        latitude: None,
        longitude: None,
        urgency: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Mirrors the handler's load-then-validate sequence against the mock store.
async fn validate_through_store(
    availability: &MockAvailabilityRepo,
    jobs: &MockJobRepo,
    contractor_id: Uuid,
    candidate: BookingCandidate,
) -> Result<(), AppError> {
    let profile = availability
        .get_profile(contractor_id)
        .await?
        .ok_or_else(|| {
            SchedulingError::NotFound(format!(
                "Availability profile for contractor {} not found",
                contractor_id
            ))
        })?
        .into_profile()
        .map_err(SchedulingError::Database)?;

    let blocked: Vec<BlockedDate> = availability
        .get_blocked_dates(contractor_id, candidate.date, candidate.date)
        .await?
        .into_iter()
        .map(BlockedDate::from)
        .collect();

    let active = jobs
        .active_jobs_for_day(contractor_id, candidate.date)
        .await?
        .into_iter()
        .map(|row| row.into_job())
        .collect::<Result<Vec<_>, _>>()
        .map_err(SchedulingError::Database)?;

    booking::validate_booking(&profile, &blocked, &active, monday(), &candidate)
        .map_err(SchedulingError::Conflict)?;
    Ok(())
}

/// Mirrors the reschedule handler: load the job, validate the new window
/// with the job itself excluded, then commit and append the audit record.
async fn reschedule_through_store(
    availability: &MockAvailabilityRepo,
    jobs: &MockJobRepo,
    reschedules: &MockRescheduleRepo,
    job_id: Uuid,
    request: RescheduleJobRequest,
) -> Result<(), AppError> {
    let existing = jobs
        .get_job(job_id)
        .await?
        .ok_or_else(|| SchedulingError::NotFound(format!("Job {} not found", job_id)))?
        .into_job()
        .map_err(SchedulingError::Database)?;

    let duration_hours = (request.new_end - request.new_start).num_minutes() as f64 / 60.0;
    let candidate = BookingCandidate {
        date: request.new_date,
        start: request.new_start,
        duration_hours,
        exclude_job_id: Some(job_id),
    };
    validate_through_store(availability, jobs, existing.contractor_id, candidate).await?;

    jobs.reschedule_job(
        job_id,
        request.new_date,
        request.new_start,
        request.new_end,
        duration_hours,
    )
    .await?;
    reschedules.insert_record(existing, request).await?;
    Ok(())
}

#[tokio::test]
async fn missing_profile_surfaces_as_not_found() {
    let mut availability = MockAvailabilityRepo::new();
    availability.expect_get_profile().returning(|_| Ok(None));
    let jobs = MockJobRepo::new();

    let candidate = BookingCandidate {
        date: monday(),
        start: t(9, 0),
        duration_hours: 1.0,
        exclude_job_id: None,
    };
    let err = validate_through_store(&availability, &jobs, Uuid::new_v4(), candidate)
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stored_booking_conflicts_with_an_overlapping_request() {
    let contractor_id = Uuid::new_v4();

    let mut availability = MockAvailabilityRepo::new();
    let row = profile_row(contractor_id);
    availability
        .expect_get_profile()
        .returning(move |_| Ok(Some(row.clone())));
    availability
        .expect_get_blocked_dates()
        .returning(|_, _, _| Ok(vec![]));

    let mut jobs = MockJobRepo::new();
    let busy = job_row(contractor_id, t(9, 0), t(10, 0));
    jobs.expect_active_jobs_for_day()
        .returning(move |_, _| Ok(vec![busy.clone()]));

    // 09:30-11:00 overlaps the stored 09:00-10:00 booking.
    let overlapping = BookingCandidate {
        date: monday(),
        start: t(9, 30),
        duration_hours: 1.5,
        exclude_job_id: None,
    };
    let err = validate_through_store(&availability, &jobs, contractor_id, overlapping)
        .await
        .unwrap_err();
    match err.0 {
        SchedulingError::Conflict(rejection) => {
            assert_eq!(rejection.reason, ConflictReason::Conflict);
            assert!(rejection.conflicting_job_id.is_some());
        }
        other => panic!("Expected a conflict, got {:?}", other),
    }

    // 10:00-12:00 merely touches it and is fine.
    let touching = BookingCandidate {
        date: monday(),
        start: t(10, 0),
        duration_hours: 2.0,
        exclude_job_id: None,
    };
    assert!(validate_through_store(&availability, &jobs, contractor_id, touching)
        .await
        .is_ok());
}

#[tokio::test]
async fn reschedule_excludes_the_job_being_moved() {
    let contractor_id = Uuid::new_v4();

    let mut availability = MockAvailabilityRepo::new();
    let row = profile_row(contractor_id);
    availability
        .expect_get_profile()
        .returning(move |_| Ok(Some(row.clone())));
    availability
        .expect_get_blocked_dates()
        .returning(|_, _, _| Ok(vec![]));

    let mut jobs = MockJobRepo::new();
    let own = job_row(contractor_id, t(9, 0), t(10, 0));
    let own_id = own.id;
    jobs.expect_active_jobs_for_day()
        .returning(move |_, _| Ok(vec![own.clone()]));

    // Moving the job onto its current window must succeed.
    let same_slot = BookingCandidate {
        date: monday(),
        start: t(9, 0),
        duration_hours: 1.0,
        exclude_job_id: Some(own_id),
    };
    assert!(validate_through_store(&availability, &jobs, contractor_id, same_slot)
        .await
        .is_ok());
}

#[tokio::test]
async fn daily_cap_counts_only_active_jobs() {
    let contractor_id = Uuid::new_v4();

    let mut availability = MockAvailabilityRepo::new();
    let row = profile_row(contractor_id);
    availability
        .expect_get_profile()
        .returning(move |_| Ok(Some(row.clone())));
    availability
        .expect_get_blocked_dates()
        .returning(|_, _, _| Ok(vec![]));

    let mut jobs = MockJobRepo::new();
    let day: Vec<DbScheduledJob> = vec![
        job_row(contractor_id, t(8, 0), t(9, 0)),
        job_row(contractor_id, t(9, 0), t(10, 0)),
        job_row(contractor_id, t(10, 0), t(11, 0)),
    ];
    jobs.expect_active_jobs_for_day()
        .returning(move |_, _| Ok(day.clone()));

    let fourth = BookingCandidate {
        date: monday(),
        start: t(13, 0),
        duration_hours: 1.0,
        exclude_job_id: None,
    };
    let err = validate_through_store(&availability, &jobs, contractor_id, fourth)
        .await
        .unwrap_err();
    match err.0 {
        SchedulingError::Conflict(rejection) => {
            assert_eq!(rejection.reason, ConflictReason::DailyLimit)
        }
        other => panic!("Expected a daily-limit rejection, got {:?}", other),
    }
}

fn reschedule_request(start: NaiveTime, end: NaiveTime) -> RescheduleJobRequest {
    RescheduleJobRequest {
        new_date: monday(),
        new_start: start,
        new_end: end,
        reason: Some("Customer asked to move".to_string()),
        requested_by: RequestedBy::Customer,
    }
}

#[tokio::test]
async fn successful_reschedule_appends_exactly_one_audit_record() {
    let contractor_id = Uuid::new_v4();

    let mut availability = MockAvailabilityRepo::new();
    let row = profile_row(contractor_id);
    availability
        .expect_get_profile()
        .returning(move |_| Ok(Some(row.clone())));
    availability
        .expect_get_blocked_dates()
        .returning(|_, _, _| Ok(vec![]));

    let mut jobs = MockJobRepo::new();
    let own = job_row(contractor_id, t(9, 0), t(10, 0));
    let own_id = own.id;
    let stored = own.clone();
    jobs.expect_get_job()
        .returning(move |_| Ok(Some(stored.clone())));
    let day = own.clone();
    jobs.expect_active_jobs_for_day()
        .returning(move |_, _| Ok(vec![day.clone()]));
    jobs.expect_reschedule_job()
        .times(1)
        .returning(move |_, new_date, new_start, new_end, duration_hours| {
            let mut updated = own.clone();
            updated.scheduled_date = new_date;
            updated.start_time = new_start;
            updated.end_time = new_end;
            updated.duration_hours = duration_hours;
            Ok(updated)
        });

    let mut reschedules = MockRescheduleRepo::new();
    reschedules
        .expect_insert_record()
        .times(1)
        .returning(|old, request| {
            Ok(DbRescheduleRecord {
                id: Uuid::new_v4(),
                job_id: old.id,
                requested_by: request.requested_by.as_str().to_string(),
                old_date: old.date,
                old_start: old.start_time,
                old_end: old.end_time,
                new_date: request.new_date,
                new_start: request.new_start,
                new_end: request.new_end,
                reason: request.reason,
                created_at: Utc::now(),
            })
        });

    let result = reschedule_through_store(
        &availability,
        &jobs,
        &reschedules,
        own_id,
        reschedule_request(t(13, 0), t(14, 0)),
    )
    .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn rejected_reschedule_writes_no_audit_record() {
    let contractor_id = Uuid::new_v4();

    let mut availability = MockAvailabilityRepo::new();
    let row = profile_row(contractor_id);
    availability
        .expect_get_profile()
        .returning(move |_| Ok(Some(row.clone())));
    availability
        .expect_get_blocked_dates()
        .returning(|_, _, _| Ok(vec![]));

    let mut jobs = MockJobRepo::new();
    let own = job_row(contractor_id, t(9, 0), t(10, 0));
    let own_id = own.id;
    let other = job_row(contractor_id, t(13, 0), t(14, 0));
    let stored = own.clone();
    jobs.expect_get_job()
        .returning(move |_| Ok(Some(stored.clone())));
    let day = vec![own, other];
    jobs.expect_active_jobs_for_day()
        .returning(move |_, _| Ok(day.clone()));
    jobs.expect_reschedule_job().times(0);

    let mut reschedules = MockRescheduleRepo::new();
    reschedules.expect_insert_record().times(0);

    // 13:30-14:30 collides with the 13:00-14:00 booking.
    let err = reschedule_through_store(
        &availability,
        &jobs,
        &reschedules,
        own_id,
        reschedule_request(t(13, 30), t(14, 30)),
    )
    .await
    .unwrap_err();
    match err.0 {
        SchedulingError::Conflict(rejection) => {
            assert_eq!(rejection.reason, ConflictReason::Conflict)
        }
        other => panic!("Expected a conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn calendar_listing_keeps_completed_jobs() {
    let contractor_id = Uuid::new_v4();

    let mut jobs = MockJobRepo::new();
    let mut finished = job_row(contractor_id, t(8, 0), t(9, 0));
    finished.status = "completed".to_string();
    let upcoming = job_row(contractor_id, t(10, 0), t(11, 0));
    let listed = vec![finished.clone(), upcoming.clone()];
    jobs.expect_listed_jobs_in_range()
        .returning(move |_, _, _| Ok(listed.clone()));

    // Mirrors the calendar handler's row-to-entry mapping.
    let entries: Vec<CalendarEntry> = jobs
        .listed_jobs_in_range(contractor_id, monday(), monday())
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.into_job().map(CalendarEntry::from))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].job_id, finished.id);
    assert_eq!(entries[0].status, jobsync_core::models::job::JobStatus::Completed);
}
