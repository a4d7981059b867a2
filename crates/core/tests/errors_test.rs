use pretty_assertions::assert_eq;

use jobsync_core::booking::{BookingRejection, ConflictReason};
use jobsync_core::errors::SchedulingError;

#[test]
fn error_display_includes_context() {
    let not_found = SchedulingError::NotFound("contractor 42".to_string());
    assert_eq!(not_found.to_string(), "Resource not found: contractor 42");

    let validation = SchedulingError::Validation("bad hours".to_string());
    assert_eq!(validation.to_string(), "Validation error: bad hours");
}

#[test]
fn conflict_display_leads_with_the_reason_code() {
    let rejection = BookingRejection {
        reason: ConflictReason::DailyLimit,
        message: "Contractor already has 3 jobs on this date (limit 3)".to_string(),
        conflicting_job_id: None,
    };
    let err = SchedulingError::Conflict(rejection);
    assert!(err.to_string().starts_with("Booking rejected: DAILY_LIMIT:"));
}

#[test]
fn eyre_reports_convert_into_database_errors() {
    let report = eyre::eyre!("connection refused");
    let err: SchedulingError = report.into();
    assert!(matches!(err, SchedulingError::Database(_)));
}
