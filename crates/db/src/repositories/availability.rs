use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use jobsync_core::models::availability::{AvailabilityProfile, BlockedDate};

use crate::models::{DbAvailabilityProfile, DbBlockedDate};

/// Upserts a contractor's profile and replaces their blocked-date set in one
/// transaction. The blocked list is wholesale: whatever was stored before is
/// gone after this call.
pub async fn upsert_profile(
    pool: &Pool<Postgres>,
    profile: &AvailabilityProfile,
    blocked: &[BlockedDate],
) -> Result<DbAvailabilityProfile> {
    let now = Utc::now();

    tracing::debug!(
        "Upserting availability profile: contractor_id={}, blocked_dates={}",
        profile.contractor_id,
        blocked.len()
    );

    let working_hours = serde_json::to_value(&profile.working_hours)?;

    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, DbAvailabilityProfile>(
        r#"
        INSERT INTO availability_profiles (
            contractor_id, working_hours, time_zone, break_duration_minutes,
            max_jobs_per_day, advance_booking_days, emergency_available, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (contractor_id) DO UPDATE SET
            working_hours = EXCLUDED.working_hours,
            time_zone = EXCLUDED.time_zone,
            break_duration_minutes = EXCLUDED.break_duration_minutes,
            max_jobs_per_day = EXCLUDED.max_jobs_per_day,
            advance_booking_days = EXCLUDED.advance_booking_days,
            emergency_available = EXCLUDED.emergency_available,
            updated_at = EXCLUDED.updated_at
        RETURNING contractor_id, working_hours, time_zone, break_duration_minutes,
                  max_jobs_per_day, advance_booking_days, emergency_available, updated_at
        "#,
    )
    .bind(profile.contractor_id)
    .bind(working_hours)
    .bind(&profile.time_zone)
    .bind(profile.break_duration_minutes)
    .bind(profile.max_jobs_per_day)
    .bind(profile.advance_booking_days)
    .bind(profile.emergency_available)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM blocked_dates WHERE contractor_id = $1")
        .bind(profile.contractor_id)
        .execute(&mut *tx)
        .await?;

    for date in blocked {
        sqlx::query(
            r#"
            INSERT INTO blocked_dates (contractor_id, blocked_on, reason, all_day)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(profile.contractor_id)
        .bind(date.date)
        .bind(&date.reason)
        .bind(date.all_day)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(
        "Availability profile stored: contractor_id={}",
        profile.contractor_id
    );
    Ok(row)
}

pub async fn get_profile(
    pool: &Pool<Postgres>,
    contractor_id: Uuid,
) -> Result<Option<DbAvailabilityProfile>> {
    tracing::debug!("Getting availability profile: contractor_id={}", contractor_id);

    let profile = crate::retry::with_retry(|| {
        sqlx::query_as::<_, DbAvailabilityProfile>(
            r#"
            SELECT contractor_id, working_hours, time_zone, break_duration_minutes,
                   max_jobs_per_day, advance_booking_days, emergency_available, updated_at
            FROM availability_profiles
            WHERE contractor_id = $1
            "#,
        )
        .bind(contractor_id)
        .fetch_optional(pool)
    })
    .await?;

    Ok(profile)
}

pub async fn get_blocked_dates(
    pool: &Pool<Postgres>,
    contractor_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DbBlockedDate>> {
    let dates = crate::retry::with_retry(|| {
        sqlx::query_as::<_, DbBlockedDate>(
            r#"
            SELECT contractor_id, blocked_on, reason, all_day
            FROM blocked_dates
            WHERE contractor_id = $1 AND blocked_on BETWEEN $2 AND $3
            ORDER BY blocked_on
            "#,
        )
        .bind(contractor_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
    })
    .await?;

    Ok(dates)
}
