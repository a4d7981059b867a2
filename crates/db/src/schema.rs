use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // gist over uuid equality needs btree_gist.
    sqlx::query("CREATE EXTENSION IF NOT EXISTS btree_gist;")
        .execute(pool)
        .await?;

    // Create availability_profiles table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availability_profiles (
            contractor_id UUID PRIMARY KEY,
            working_hours JSONB NOT NULL,
            time_zone VARCHAR(64) NOT NULL,
            break_duration_minutes INT NOT NULL DEFAULT 0,
            max_jobs_per_day INT NOT NULL,
            advance_booking_days INT NOT NULL,
            emergency_available BOOLEAN NOT NULL DEFAULT FALSE,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create blocked_dates table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blocked_dates (
            contractor_id UUID NOT NULL REFERENCES availability_profiles(contractor_id),
            blocked_on DATE NOT NULL,
            reason TEXT NULL,
            all_day BOOLEAN NOT NULL DEFAULT TRUE,
            PRIMARY KEY (contractor_id, blocked_on)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create scheduled_jobs table. The exclusion constraint is the
    // concurrency backstop: two active jobs of one contractor can never hold
    // intersecting windows, whatever the request interleaving. It is
    // deferrable so a whole-day rewrite can reorder windows in one
    // transaction.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scheduled_jobs (
            id UUID PRIMARY KEY,
            contractor_id UUID NOT NULL,
            customer_id UUID NOT NULL,
            scheduled_date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            duration_hours DOUBLE PRECISION NOT NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'assigned',
            latitude DOUBLE PRECISION NULL,
            longitude DOUBLE PRECISION NULL,
            urgency VARCHAR(32) NULL,
            notes TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_time > start_time),
            CONSTRAINT known_status CHECK (status IN ('assigned', 'in_progress', 'completed', 'cancelled')),
            CONSTRAINT no_active_overlap EXCLUDE USING gist (
                contractor_id WITH =,
                tsrange(scheduled_date + start_time, scheduled_date + end_time) WITH &&
            ) WHERE (status IN ('assigned', 'in_progress'))
            DEFERRABLE INITIALLY IMMEDIATE
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create reschedule_records table (append-only audit)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reschedule_records (
            id UUID PRIMARY KEY,
            job_id UUID NOT NULL REFERENCES scheduled_jobs(id),
            requested_by VARCHAR(32) NOT NULL,
            old_date DATE NOT NULL,
            old_start TIME NOT NULL,
            old_end TIME NOT NULL,
            new_date DATE NOT NULL,
            new_start TIME NOT NULL,
            new_end TIME NOT NULL,
            reason TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_scheduled_jobs_contractor_date ON scheduled_jobs(contractor_id, scheduled_date);",
        "CREATE INDEX IF NOT EXISTS idx_scheduled_jobs_customer_id ON scheduled_jobs(customer_id);",
        "CREATE INDEX IF NOT EXISTS idx_blocked_dates_contractor_id ON blocked_dates(contractor_id);",
        "CREATE INDEX IF NOT EXISTS idx_reschedule_records_job_id ON reschedule_records(job_id);",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
