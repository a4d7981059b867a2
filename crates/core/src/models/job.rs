use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a scheduled job. The scheduling engine reads these but
/// never drives the transitions; only `Assigned` and `InProgress` count
/// toward conflicts and the daily cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Assigned | JobStatus::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Assigned => "assigned",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "assigned" => Some(JobStatus::Assigned),
            "in_progress" => Some(JobStatus::InProgress),
            "completed" => Some(JobStatus::Completed),
            "cancelled" => Some(JobStatus::Cancelled),
            _ => None,
        }
    }
}

/// The timing-relevant projection of a job. Intervals are half-open
/// `[start_time, end_time)` on `date` in the contractor's time zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: Uuid,
    pub contractor_id: Uuid,
    pub customer_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_hours: f64,
    pub status: JobStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub urgency: Option<String>,
    pub notes: Option<String>,
}

impl ScheduledJob {
    pub fn duration_minutes(&self) -> i64 {
        (self.duration_hours * 60.0).round() as i64
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Which party asked for a reschedule; the other party gets notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedBy {
    Contractor,
    Customer,
}

impl RequestedBy {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestedBy::Contractor => "contractor",
            RequestedBy::Customer => "customer",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleJobRequest {
    pub contractor_id: Uuid,
    pub customer_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "super::availability::hhmm")]
    pub start_time: NaiveTime,
    #[serde(default, with = "optional_hhmm")]
    pub end_time: Option<NaiveTime>,
    pub duration_hours: Option<f64>,
    pub notes: Option<String>,
    pub urgency: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ScheduleJobRequest {
    /// Resolves the booked window from the request. `end_time` is
    /// authoritative when present: `duration_hours` is re-derived from it, so
    /// the interval that gets validated is always the interval that gets
    /// stored, even when a client sends both fields and they disagree.
    /// Without `end_time`, a positive `duration_hours` is required and the
    /// window must not run past midnight.
    pub fn resolve_window(&self) -> Result<(NaiveTime, f64), String> {
        match (self.end_time, self.duration_hours) {
            (Some(end), _) => {
                if end <= self.start_time {
                    return Err("end_time must be after start_time".to_string());
                }
                let minutes = (end - self.start_time).num_minutes();
                Ok((end, minutes as f64 / 60.0))
            }
            (None, Some(duration)) if duration > 0.0 => {
                let minutes = Duration::minutes((duration * 60.0).round() as i64);
                let (end, wrapped) = self.start_time.overflowing_add_signed(minutes);
                if wrapped != 0 {
                    return Err("Booking must not run past midnight".to_string());
                }
                Ok((end, duration))
            }
            _ => Err("Either end_time or a positive duration_hours is required".to_string()),
        }
    }
}

/// Serde helper mirroring `availability::hhmm` for optional times.
mod optional_hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, ser: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => ser.serialize_some(&t.format("%H:%M").to_string()),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(de)?;
        match raw {
            None => Ok(None),
            Some(raw) => NaiveTime::parse_from_str(&raw, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleJobResponse {
    pub job: ScheduledJob,
    /// Rendered iCalendar event for the committed booking.
    pub calendar_event: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleJobRequest {
    pub new_date: NaiveDate,
    #[serde(with = "super::availability::hhmm")]
    pub new_start: NaiveTime,
    #[serde(with = "super::availability::hhmm")]
    pub new_end: NaiveTime,
    pub reason: Option<String>,
    pub requested_by: RequestedBy,
}

/// Immutable audit row appended on every successful reschedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRecord {
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

/// Display entry for a contractor's calendar listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub job_id: Uuid,
    pub customer_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "super::availability::hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "super::availability::hhmm")]
    pub end_time: NaiveTime,
    pub status: JobStatus,
    pub urgency: Option<String>,
    pub notes: Option<String>,
}

impl From<ScheduledJob> for CalendarEntry {
    fn from(job: ScheduledJob) -> Self {
        Self {
            job_id: job.id,
            customer_id: job.customer_id,
            date: job.date,
            start_time: job.start_time,
            end_time: job.end_time,
            status: job.status,
            urgency: job.urgency,
            notes: job.notes,
        }
    }
}
