//! Axum route handlers for the Scan API.
//!
//! Every handler runs behind the `AuthenticatedCaller` gate; a request that
//! fails authentication never reaches a handler body.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::AuthenticatedCaller;
use crate::errors::AppError;
use crate::models::scan::{AnalysisResult, ScanAnalysisRow, ScanSummaryRow};
use crate::models::user::Role;
use crate::scan::persistence::delete_scan;
use crate::scan::pipeline::{run_analysis, AnalysisRequest, UploadedDocument};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubmitScanResponse {
    pub resume_id: i64,
    pub job_id: i64,
    pub analysis: AnalysisResult,
    /// Raw inference-service text, returned for audit and debugging.
    pub raw_response: String,
}

#[derive(Debug, Serialize)]
pub struct ScanDetailResponse {
    pub scan: ScanSummaryRow,
    pub analysis: AnalysisResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/scans
///
/// Submits a résumé document and job description for analysis. Multipart
/// fields: `file` (the document) and `job_description` (text).
pub async fn handle_submit_scan(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    mut multipart: Multipart,
) -> Result<Json<SubmitScanResponse>, AppError> {
    let mut job_description: Option<String> = None;
    let mut document: Option<UploadedDocument> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable job_description: {e}")))?;
                job_description = Some(text);
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/pdf")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable file upload: {e}")))?
                    .to_vec();
                document = Some(UploadedDocument {
                    data,
                    file_name,
                    mime_type,
                });
            }
            _ => {} // unknown fields are ignored
        }
    }

    let job_description = job_description
        .ok_or_else(|| AppError::Validation("job_description field is required".to_string()))?;
    let document =
        document.ok_or_else(|| AppError::Validation("file field is required".to_string()))?;

    let outcome = run_analysis(
        &state.db,
        &state.llm,
        &caller,
        AnalysisRequest {
            job_description,
            document,
        },
    )
    .await?;

    Ok(Json(SubmitScanResponse {
        resume_id: outcome.resume_id,
        job_id: outcome.job_id,
        analysis: outcome.analysis,
        raw_response: outcome.raw_response,
    }))
}

/// GET /api/v1/scans
///
/// Lists the caller's scans, newest first, without the stored document bytes.
pub async fn handle_list_scans(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<Json<Vec<ScanSummaryRow>>, AppError> {
    let scans = sqlx::query_as::<_, ScanSummaryRow>(
        r#"
        SELECT resume_id, job_id, user_id, file_name, file_type, job_description, scanned_at
        FROM scan_records
        WHERE user_id = $1
        ORDER BY scanned_at DESC
        "#,
    )
    .bind(caller.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(scans))
}

/// GET /api/v1/scans/:resume_id
///
/// Returns one of the caller's scans together with its stored analysis.
pub async fn handle_get_scan(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(resume_id): Path<i64>,
) -> Result<Json<ScanDetailResponse>, AppError> {
    let scan = sqlx::query_as::<_, ScanSummaryRow>(
        r#"
        SELECT resume_id, job_id, user_id, file_name, file_type, job_description, scanned_at
        FROM scan_records
        WHERE resume_id = $1 AND user_id = $2
        "#,
    )
    .bind(resume_id)
    .bind(caller.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Scan {resume_id} not found")))?;

    // The write path guarantees the analysis row exists alongside the record.
    let analysis = sqlx::query_as::<_, ScanAnalysisRow>(
        "SELECT * FROM scan_analyses WHERE resume_id = $1 AND user_id = $2",
    )
    .bind(resume_id)
    .bind(caller.id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(ScanDetailResponse {
        scan,
        analysis: analysis.into_result(),
    }))
}

/// DELETE /api/v1/scans/:resume_id
///
/// Admin-only: removes a scan and its analysis in one transaction.
pub async fn handle_delete_scan(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(resume_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    caller.require_role(Role::Admin)?;

    if !delete_scan(&state.db, resume_id).await? {
        return Err(AppError::NotFound(format!("Scan {resume_id} not found")));
    }

    Ok(Json(json!({ "deleted": resume_id })))
}
