use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Runs idempotent startup migrations.
///
/// `users` is the identity store the access gate reads; the rows are
/// populated by the account service, not by this API. `scan_records` and
/// `scan_analyses` are the two linked tables written by the analysis
/// pipeline — an analysis row exists only alongside its record (the write
/// path inserts both in one transaction, the admin delete removes both).
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scan_records (
            resume_id BIGSERIAL PRIMARY KEY,
            job_id BIGSERIAL,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            file_name TEXT NOT NULL,
            file_type TEXT NOT NULL,
            resume_file BYTEA NOT NULL,
            job_description TEXT NOT NULL,
            scanned_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scan_analyses (
            resume_id BIGINT NOT NULL REFERENCES scan_records(resume_id),
            job_id BIGINT NOT NULL,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            match_score DOUBLE PRECISION NOT NULL,
            profile_summary TEXT NOT NULL,
            strengths TEXT[] NOT NULL,
            recommendations TEXT NOT NULL,
            missing_skills TEXT[] NOT NULL,
            soft_skill_issues TEXT[] NOT NULL,
            formatting_issues TEXT[] NOT NULL,
            keyword_issues TEXT[] NOT NULL,
            bias_note TEXT NOT NULL,
            recruiter_tips TEXT[] NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (resume_id, job_id, user_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_scan_records_user ON scan_records(user_id);")
        .execute(pool)
        .await?;

    info!("Database migrations completed");
    Ok(())
}
