//! Orchestrates the full analysis pipeline for one authenticated request.
//!
//! Flow: validate request → render first page → compile prompt → inference
//! call → normalize → persist. Strictly sequential; suspension happens only
//! at the inference call and the database writes. A failure at any step
//! leaves zero persisted rows, because persistence runs last and is itself
//! transactional.

use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::GeminiClient;
use crate::models::scan::AnalysisResult;
use crate::models::user::Caller;
use crate::scan::normalizer::normalize_report;
use crate::scan::persistence::{persist_scan, ScanWriteParams};
use crate::scan::prompts::build_analysis_prompt;
use crate::scan::renderer::render_first_page;

/// An uploaded document exactly as received: raw bytes plus the declared
/// filename and MIME type. Request-scoped and never mutated.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub data: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

/// One analysis submission from an authenticated caller.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub job_description: String,
    pub document: UploadedDocument,
}

impl AnalysisRequest {
    /// Boundary invariants: job description and document are non-empty.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.job_description.trim().is_empty() {
            return Err(AppError::Validation(
                "job_description cannot be empty".to_string(),
            ));
        }
        if self.document.data.is_empty() {
            return Err(AppError::EmptyInput);
        }
        Ok(())
    }
}

/// Result of one successful pipeline run. The raw model text rides along
/// for audit and debugging.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub resume_id: i64,
    pub job_id: i64,
    pub analysis: AnalysisResult,
    pub raw_response: String,
}

/// Runs the pipeline for one request.
pub async fn run_analysis(
    pool: &PgPool,
    llm: &GeminiClient,
    caller: &Caller,
    request: AnalysisRequest,
) -> Result<ScanOutcome, AppError> {
    request.validate()?;

    info!(
        "Rendering '{}' ({} bytes) for caller {}",
        request.document.file_name,
        request.document.data.len(),
        caller.id
    );

    // pdfium is not async-safe; rasterize on the blocking pool.
    let document_bytes = request.document.data.clone();
    let page = tokio::task::spawn_blocking(move || render_first_page(&document_bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    let prompt = build_analysis_prompt(&request.job_description);

    let raw_response = llm
        .generate(&prompt, &page.mime_type, &page.data, &request.job_description)
        .await
        .map_err(|e| AppError::InferenceUnavailable(e.to_string()))?;

    let analysis = normalize_report(&raw_response)?;

    let ids = persist_scan(
        pool,
        ScanWriteParams {
            caller_id: caller.id,
            file_name: &request.document.file_name,
            file_type: &request.document.mime_type,
            document: &request.document.data,
            job_description: &request.job_description,
        },
        &analysis,
    )
    .await?;

    info!(
        "Scan {} scored {:.1} for caller {}",
        ids.resume_id, analysis.match_score, caller.id
    );

    Ok(ScanOutcome {
        resume_id: ids.resume_id,
        job_id: ids.job_id,
        analysis,
        raw_response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(job_description: &str, data: &[u8]) -> AnalysisRequest {
        AnalysisRequest {
            job_description: job_description.to_string(),
            document: UploadedDocument {
                data: data.to_vec(),
                file_name: "resume.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
            },
        }
    }

    #[test]
    fn test_blank_job_description_fails_validation() {
        let err = request("   ", b"%PDF-1.7").validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_empty_document_is_empty_input() {
        let err = request("Backend engineer", b"").validate().unwrap_err();
        assert!(matches!(err, AppError::EmptyInput));
    }

    #[test]
    fn test_well_formed_request_validates() {
        assert!(request("Backend engineer", b"%PDF-1.7").validate().is_ok());
    }
}
