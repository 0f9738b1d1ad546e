//! Persistence Coordinator — writes the scan record and its analysis as one
//! atomic unit.
//!
//! Both inserts run inside a single transaction: either the pair commits or
//! neither row survives. A dropped transaction (error path, caller
//! cancellation before commit) rolls back automatically, so no orphaned
//! record or analysis is ever visible to readers. There is no deduplication
//! — identical submissions create independent row pairs.

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::scan::AnalysisResult;

/// Database-generated identifiers for one persisted scan.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScanIds {
    pub resume_id: i64,
    pub job_id: i64,
}

/// Parameters for persisting one scan record.
pub struct ScanWriteParams<'a> {
    pub caller_id: i64,
    pub file_name: &'a str,
    pub file_type: &'a str,
    pub document: &'a [u8],
    pub job_description: &'a str,
}

/// Creates one `scan_records` row and its linked `scan_analyses` row.
/// Returns the generated identifiers on commit.
pub async fn persist_scan(
    pool: &PgPool,
    params: ScanWriteParams<'_>,
    analysis: &AnalysisResult,
) -> Result<ScanIds, AppError> {
    let ScanWriteParams {
        caller_id,
        file_name,
        file_type,
        document,
        job_description,
    } = params;

    let mut tx = pool.begin().await?;

    let (resume_id, job_id): (i64, i64) = sqlx::query_as(
        r#"
        INSERT INTO scan_records (user_id, file_name, file_type, resume_file, job_description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING resume_id, job_id
        "#,
    )
    .bind(caller_id)
    .bind(file_name)
    .bind(file_type)
    .bind(document)
    .bind(job_description)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO scan_analyses
            (resume_id, job_id, user_id, match_score, profile_summary, strengths,
             recommendations, missing_skills, soft_skill_issues, formatting_issues,
             keyword_issues, bias_note, recruiter_tips)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(resume_id)
    .bind(job_id)
    .bind(caller_id)
    .bind(analysis.match_score)
    .bind(&analysis.profile_summary)
    .bind(&analysis.strengths)
    .bind(&analysis.recommendations)
    .bind(&analysis.missing_skills)
    .bind(&analysis.soft_skill_issues)
    .bind(&analysis.formatting_issues)
    .bind(&analysis.keyword_issues)
    .bind(&analysis.bias_note)
    .bind(&analysis.recruiter_tips)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("Persisted scan {resume_id} (job {job_id}) for caller {caller_id}");

    Ok(ScanIds { resume_id, job_id })
}

/// Removes one scan and its analysis in the same transaction.
/// Returns false when no record matched.
pub async fn delete_scan(pool: &PgPool, resume_id: i64) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM scan_analyses WHERE resume_id = $1")
        .bind(resume_id)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM scan_records WHERE resume_id = $1")
        .bind(resume_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let removed = deleted.rows_affected() > 0;
    if removed {
        info!("Deleted scan {resume_id} and its analysis");
    }

    Ok(removed)
}
