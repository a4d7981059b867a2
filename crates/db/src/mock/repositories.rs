use chrono::{NaiveDate, NaiveTime};
use mockall::mock;
use uuid::Uuid;

use jobsync_core::models::availability::{AvailabilityProfile, BlockedDate};
use jobsync_core::models::job::{RescheduleJobRequest, ScheduledJob};
use jobsync_core::routeplan::RewrittenWindow;

use crate::models::{DbAvailabilityProfile, DbBlockedDate, DbRescheduleRecord, DbScheduledJob};

// Mock repositories for testing
mock! {
    pub AvailabilityRepo {
        pub async fn upsert_profile(
            &self,
            profile: AvailabilityProfile,
            blocked: Vec<BlockedDate>,
        ) -> eyre::Result<DbAvailabilityProfile>;

        pub async fn get_profile(
            &self,
            contractor_id: Uuid,
        ) -> eyre::Result<Option<DbAvailabilityProfile>>;

        pub async fn get_blocked_dates(
            &self,
            contractor_id: Uuid,
            start: NaiveDate,
            end: NaiveDate,
        ) -> eyre::Result<Vec<DbBlockedDate>>;
    }
}

mock! {
    pub JobRepo {
        pub async fn get_job(&self, id: Uuid) -> eyre::Result<Option<DbScheduledJob>>;

        pub async fn active_jobs_for_day(
            &self,
            contractor_id: Uuid,
            date: NaiveDate,
        ) -> eyre::Result<Vec<DbScheduledJob>>;

        pub async fn active_jobs_in_range(
            &self,
            contractor_id: Uuid,
            start: NaiveDate,
            end: NaiveDate,
        ) -> eyre::Result<Vec<DbScheduledJob>>;

        pub async fn listed_jobs_in_range(
            &self,
            contractor_id: Uuid,
            start: NaiveDate,
            end: NaiveDate,
        ) -> eyre::Result<Vec<DbScheduledJob>>;

        pub async fn assign_job(&self, job: ScheduledJob) -> eyre::Result<DbScheduledJob>;

        pub async fn reschedule_job(
            &self,
            id: Uuid,
            new_date: NaiveDate,
            new_start: NaiveTime,
            new_end: NaiveTime,
            duration_hours: f64,
        ) -> eyre::Result<DbScheduledJob>;

        pub async fn rewrite_day_windows(
            &self,
            windows: Vec<RewrittenWindow>,
        ) -> eyre::Result<()>;
    }
}

mock! {
    pub RescheduleRepo {
        pub async fn insert_record(
            &self,
            old: ScheduledJob,
            request: RescheduleJobRequest,
        ) -> eyre::Result<DbRescheduleRecord>;

        pub async fn records_for_job(
            &self,
            job_id: Uuid,
        ) -> eyre::Result<Vec<DbRescheduleRecord>>;
    }
}
