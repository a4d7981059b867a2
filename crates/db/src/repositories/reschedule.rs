use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use jobsync_core::models::job::{RescheduleJobRequest, ScheduledJob};

use crate::models::DbRescheduleRecord;

/// Appends one audit row for a successful reschedule. The old window comes
/// from the job as it stood before the update.
pub async fn insert_record(
    pool: &Pool<Postgres>,
    old: &ScheduledJob,
    request: &RescheduleJobRequest,
) -> Result<DbRescheduleRecord> {
    let id = Uuid::new_v4();

    tracing::debug!("Recording reschedule: job_id={}, record_id={}", old.id, id);

    let row = sqlx::query_as::<_, DbRescheduleRecord>(
        r#"
        INSERT INTO reschedule_records (
            id, job_id, requested_by,
            old_date, old_start, old_end,
            new_date, new_start, new_end,
            reason, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
        RETURNING id, job_id, requested_by,
                  old_date, old_start, old_end,
                  new_date, new_start, new_end,
                  reason, created_at
        "#,
    )
    .bind(id)
    .bind(old.id)
    .bind(request.requested_by.as_str())
    .bind(old.date)
    .bind(old.start_time)
    .bind(old.end_time)
    .bind(request.new_date)
    .bind(request.new_start)
    .bind(request.new_end)
    .bind(&request.reason)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn records_for_job(pool: &Pool<Postgres>, job_id: Uuid) -> Result<Vec<DbRescheduleRecord>> {
    let records = crate::retry::with_retry(|| {
        sqlx::query_as::<_, DbRescheduleRecord>(
            r#"
            SELECT id, job_id, requested_by,
                   old_date, old_start, old_end,
                   new_date, new_start, new_end,
                   reason, created_at
            FROM reschedule_records
            WHERE job_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(job_id)
        .fetch_all(pool)
    })
    .await?;

    Ok(records)
}
