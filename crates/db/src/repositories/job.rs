use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use eyre::Result;
use sqlx::pool::PoolConnection;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use jobsync_core::models::job::ScheduledJob;
use jobsync_core::routeplan::RewrittenWindow;

use crate::models::DbScheduledJob;

const ACTIVE_STATUSES: &str = "('assigned', 'in_progress')";

/// SQLSTATE for exclusion-constraint violations; a booking that lost the
/// commit race against a concurrent overlapping insert lands here.
const EXCLUSION_VIOLATION: &str = "23P01";

pub fn is_exclusion_violation(err: &eyre::Report) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|db| db.code())
        .map(|code| code == EXCLUSION_VIOLATION)
        .unwrap_or(false)
}

pub async fn get_job(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbScheduledJob>> {
    tracing::debug!("Getting scheduled job: id={}", id);

    let job = crate::retry::with_retry(|| {
        sqlx::query_as::<_, DbScheduledJob>(
            r#"
            SELECT id, contractor_id, customer_id, scheduled_date, start_time, end_time,
                   duration_hours, status, latitude, longitude, urgency, notes,
                   created_at, updated_at
            FROM scheduled_jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
    })
    .await?;

    Ok(job)
}

/// Active jobs for one contractor on one date, ordered by start time.
pub async fn active_jobs_for_day(
    pool: &Pool<Postgres>,
    contractor_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<DbScheduledJob>> {
    let sql = format!(
        r#"
        SELECT id, contractor_id, customer_id, scheduled_date, start_time, end_time,
               duration_hours, status, latitude, longitude, urgency, notes,
               created_at, updated_at
        FROM scheduled_jobs
        WHERE contractor_id = $1 AND scheduled_date = $2 AND status IN {ACTIVE_STATUSES}
        ORDER BY start_time
        "#
    );
    let jobs = crate::retry::with_retry(|| {
        sqlx::query_as::<_, DbScheduledJob>(&sql)
            .bind(contractor_id)
            .bind(date)
            .fetch_all(pool)
    })
    .await?;

    Ok(jobs)
}

/// Active jobs for one contractor across a date range, for slot generation.
pub async fn active_jobs_in_range(
    pool: &Pool<Postgres>,
    contractor_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DbScheduledJob>> {
    let sql = format!(
        r#"
        SELECT id, contractor_id, customer_id, scheduled_date, start_time, end_time,
               duration_hours, status, latitude, longitude, urgency, notes,
               created_at, updated_at
        FROM scheduled_jobs
        WHERE contractor_id = $1
          AND scheduled_date BETWEEN $2 AND $3
          AND status IN {ACTIVE_STATUSES}
        ORDER BY scheduled_date, start_time
        "#
    );
    let jobs = crate::retry::with_retry(|| {
        sqlx::query_as::<_, DbScheduledJob>(&sql)
            .bind(contractor_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
    })
    .await?;

    Ok(jobs)
}

/// Jobs for a contractor's display calendar: everything but cancelled, so a
/// visit stays listed after its status flips to completed.
pub async fn listed_jobs_in_range(
    pool: &Pool<Postgres>,
    contractor_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DbScheduledJob>> {
    let jobs = crate::retry::with_retry(|| {
        sqlx::query_as::<_, DbScheduledJob>(
            r#"
            SELECT id, contractor_id, customer_id, scheduled_date, start_time, end_time,
                   duration_hours, status, latitude, longitude, urgency, notes,
                   created_at, updated_at
            FROM scheduled_jobs
            WHERE contractor_id = $1
              AND scheduled_date BETWEEN $2 AND $3
              AND status <> 'cancelled'
            ORDER BY scheduled_date, start_time
            "#,
        )
        .bind(contractor_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
    })
    .await?;

    Ok(jobs)
}

/// Commits a validated booking: writes the timing fields and sets the job to
/// `assigned`. Upsert on the job id, since the job row may already exist in
/// an unscheduled state. An overlap that slipped past validation under
/// concurrency surfaces as an exclusion violation (see
/// [`is_exclusion_violation`]).
pub async fn assign_job(pool: &Pool<Postgres>, job: &ScheduledJob) -> Result<DbScheduledJob> {
    let now = Utc::now();

    tracing::debug!(
        "Assigning job: id={}, contractor_id={}, date={}, window={}-{}",
        job.id,
        job.contractor_id,
        job.date,
        job.start_time,
        job.end_time
    );

    let row = sqlx::query_as::<_, DbScheduledJob>(
        r#"
        INSERT INTO scheduled_jobs (
            id, contractor_id, customer_id, scheduled_date, start_time, end_time,
            duration_hours, status, latitude, longitude, urgency, notes,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'assigned', $8, $9, $10, $11, $12, $12)
        ON CONFLICT (id) DO UPDATE SET
            contractor_id = EXCLUDED.contractor_id,
            customer_id = EXCLUDED.customer_id,
            scheduled_date = EXCLUDED.scheduled_date,
            start_time = EXCLUDED.start_time,
            end_time = EXCLUDED.end_time,
            duration_hours = EXCLUDED.duration_hours,
            status = 'assigned',
            latitude = EXCLUDED.latitude,
            longitude = EXCLUDED.longitude,
            urgency = EXCLUDED.urgency,
            notes = EXCLUDED.notes,
            updated_at = EXCLUDED.updated_at
        RETURNING id, contractor_id, customer_id, scheduled_date, start_time, end_time,
                  duration_hours, status, latitude, longitude, urgency, notes,
                  created_at, updated_at
        "#,
    )
    .bind(job.id)
    .bind(job.contractor_id)
    .bind(job.customer_id)
    .bind(job.date)
    .bind(job.start_time)
    .bind(job.end_time)
    .bind(job.duration_hours)
    .bind(job.latitude)
    .bind(job.longitude)
    .bind(&job.urgency)
    .bind(&job.notes)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Overwrites a job's timing fields. Status is deliberately untouched.
pub async fn reschedule_job(
    pool: &Pool<Postgres>,
    id: Uuid,
    new_date: NaiveDate,
    new_start: NaiveTime,
    new_end: NaiveTime,
    duration_hours: f64,
) -> Result<DbScheduledJob> {
    tracing::debug!(
        "Rescheduling job: id={}, new_date={}, window={}-{}",
        id,
        new_date,
        new_start,
        new_end
    );

    let row = sqlx::query_as::<_, DbScheduledJob>(
        r#"
        UPDATE scheduled_jobs
        SET scheduled_date = $2, start_time = $3, end_time = $4,
            duration_hours = $5, updated_at = NOW()
        WHERE id = $1
        RETURNING id, contractor_id, customer_id, scheduled_date, start_time, end_time,
                  duration_hours, status, latitude, longitude, urgency, notes,
                  created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(new_date)
    .bind(new_start)
    .bind(new_end)
    .bind(duration_hours)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies an accepted route optimization: rewrites every window of the day
/// in one transaction with the overlap constraint deferred to commit, so the
/// intermediate states of the reshuffle cannot trip it.
pub async fn rewrite_day_windows(
    pool: &Pool<Postgres>,
    windows: &[RewrittenWindow],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("SET CONSTRAINTS no_active_overlap DEFERRED")
        .execute(&mut *tx)
        .await?;

    for window in windows {
        sqlx::query(
            r#"
            UPDATE scheduled_jobs
            SET start_time = $2, end_time = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(window.job_id)
        .bind(window.start)
        .bind(window.end)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!("Rewrote {} job windows", windows.len());
    Ok(())
}

/// Stable advisory-lock key for one contractor-day.
fn day_lock_key(contractor_id: Uuid, date: NaiveDate) -> i64 {
    let bits = contractor_id.as_u128();
    ((bits >> 64) as i64) ^ (bits as i64) ^ i64::from(date.num_days_from_ce())
}

/// Serializes route optimization per (contractor, date) with a Postgres
/// advisory lock, which holds across service instances. The lock lives on the
/// returned connection; drop it through [`unlock_day`].
pub async fn lock_day(
    pool: &Pool<Postgres>,
    contractor_id: Uuid,
    date: NaiveDate,
) -> Result<PoolConnection<Postgres>> {
    let mut conn = pool.acquire().await?;
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(day_lock_key(contractor_id, date))
        .execute(&mut *conn)
        .await?;
    Ok(conn)
}

pub async fn unlock_day(
    mut conn: PoolConnection<Postgres>,
    contractor_id: Uuid,
    date: NaiveDate,
) -> Result<()> {
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(day_lock_key(contractor_id, date))
        .execute(&mut *conn)
        .await?;
    Ok(())
}
