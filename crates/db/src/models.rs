use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use jobsync_core::models::availability::{AvailabilityProfile, BlockedDate, WeeklyHours};
use jobsync_core::models::job::{JobStatus, RescheduleRecord, ScheduledJob};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAvailabilityProfile {
    pub contractor_id: Uuid,
    /// `WeeklyHours` stored as JSONB.
    pub working_hours: serde_json::Value,
    pub time_zone: String,
    pub break_duration_minutes: i32,
    pub max_jobs_per_day: i32,
    pub advance_booking_days: i32,
    pub emergency_available: bool,
    pub updated_at: DateTime<Utc>,
}

impl DbAvailabilityProfile {
    pub fn into_profile(self) -> eyre::Result<AvailabilityProfile> {
        let working_hours: WeeklyHours = serde_json::from_value(self.working_hours)
            .map_err(|e| eyre!("Corrupt working_hours for {}: {}", self.contractor_id, e))?;
        Ok(AvailabilityProfile {
            contractor_id: self.contractor_id,
            working_hours,
            time_zone: self.time_zone,
            break_duration_minutes: self.break_duration_minutes,
            max_jobs_per_day: self.max_jobs_per_day,
            advance_booking_days: self.advance_booking_days,
            emergency_available: self.emergency_available,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBlockedDate {
    pub contractor_id: Uuid,
    pub blocked_on: NaiveDate,
    pub reason: Option<String>,
    pub all_day: bool,
}

impl From<DbBlockedDate> for BlockedDate {
    fn from(row: DbBlockedDate) -> Self {
        BlockedDate {
            contractor_id: row.contractor_id,
            date: row.blocked_on,
            reason: row.reason,
            all_day: row.all_day,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbScheduledJob {
    pub id: Uuid,
    pub contractor_id: Uuid,
    pub customer_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_hours: f64,
    pub status: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub urgency: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbScheduledJob {
    pub fn into_job(self) -> eyre::Result<ScheduledJob> {
        let status = JobStatus::parse(&self.status)
            .ok_or_else(|| eyre!("Unknown job status '{}' for {}", self.status, self.id))?;
        Ok(ScheduledJob {
            id: self.id,
            contractor_id: self.contractor_id,
            customer_id: self.customer_id,
            date: self.scheduled_date,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_hours: self.duration_hours,
            status,
            latitude: self.latitude,
            longitude: self.longitude,
            urgency: self.urgency,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRescheduleRecord {
    pub id: Uuid,
    pub job_id: Uuid,
    pub requested_by: String,
    pub old_date: NaiveDate,
    pub old_start: NaiveTime,
    pub old_end: NaiveTime,
    pub new_date: NaiveDate,
    pub new_start: NaiveTime,
    pub new_end: NaiveTime,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DbRescheduleRecord> for RescheduleRecord {
    fn from(row: DbRescheduleRecord) -> Self {
        RescheduleRecord {
            id: row.id,
            job_id: row.job_id,
            requested_by: row.requested_by,
            old_date: row.old_date,
            old_start: row.old_start,
            old_end: row.old_end,
            new_date: row.new_date,
            new_start: row.new_start,
            new_end: row.new_end,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}
