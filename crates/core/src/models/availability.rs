use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{SchedulingError, SchedulingResult};

/// Serde helper accepting `HH:MM` as well as `HH:MM:SS`, emitting `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(de)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

/// Working window for a single weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub enabled: bool,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl DayHours {
    pub fn closed() -> Self {
        Self {
            enabled: false,
            start: NaiveTime::MIN,
            end: NaiveTime::MIN,
        }
    }
}

/// Working hours for every day of the week. All seven days are required by
/// construction; a day the contractor does not work is carried with
/// `enabled: false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl WeeklyHours {
    pub fn for_weekday(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    fn days(&self) -> [(&'static str, &DayHours); 7] {
        [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
            ("sunday", &self.sunday),
        ]
    }

    /// Every enabled day must have a non-empty window.
    pub fn validate(&self) -> SchedulingResult<()> {
        for (name, hours) in self.days() {
            if hours.enabled && hours.start >= hours.end {
                return Err(SchedulingError::Validation(format!(
                    "Working hours for {} must have start before end",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// A contractor's declared availability. Replaced wholesale on update, never
/// hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityProfile {
    pub contractor_id: Uuid,
    pub working_hours: WeeklyHours,
    pub time_zone: String,
    pub break_duration_minutes: i32,
    pub max_jobs_per_day: i32,
    pub advance_booking_days: i32,
    pub emergency_available: bool,
}

impl AvailabilityProfile {
    pub fn timezone(&self) -> SchedulingResult<chrono_tz::Tz> {
        self.time_zone.parse().map_err(|_| {
            SchedulingError::Validation(format!("Unknown time zone: {}", self.time_zone))
        })
    }

    pub fn validate(&self) -> SchedulingResult<()> {
        self.working_hours.validate()?;
        self.timezone()?;
        if self.break_duration_minutes < 0 {
            return Err(SchedulingError::Validation(
                "break_duration_minutes must not be negative".to_string(),
            ));
        }
        if self.max_jobs_per_day < 1 {
            return Err(SchedulingError::Validation(
                "max_jobs_per_day must be at least 1".to_string(),
            ));
        }
        if self.advance_booking_days < 0 {
            return Err(SchedulingError::Validation(
                "advance_booking_days must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// A date on which the contractor takes no bookings. The set is replaced
/// wholesale on every availability update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedDate {
    pub contractor_id: Uuid,
    pub date: NaiveDate,
    pub reason: Option<String>,
    #[serde(default = "default_all_day")]
    pub all_day: bool,
}

fn default_all_day() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedDateRequest {
    pub date: NaiveDate,
    pub reason: Option<String>,
    #[serde(default = "default_all_day")]
    pub all_day: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAvailabilityRequest {
    pub working_hours: WeeklyHours,
    pub time_zone: String,
    #[serde(default)]
    pub break_duration_minutes: i32,
    pub max_jobs_per_day: i32,
    pub advance_booking_days: i32,
    #[serde(default)]
    pub emergency_available: bool,
    #[serde(default)]
    pub blocked_dates: Vec<BlockedDateRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAvailabilityResponse {
    pub contractor_id: Uuid,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// One bookable window inside a contractor's working hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

/// Slot listing for a single calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub slots: Vec<SlotWindow>,
}
