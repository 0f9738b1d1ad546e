use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Normalized analysis report extracted from raw inference-service output.
///
/// Every list field is always present (possibly empty); `match_score` is a
/// 0–100 value carried to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub match_score: f64,
    pub profile_summary: String,
    pub strengths: Vec<String>,
    pub recommendations: String,
    pub missing_skills: Vec<String>,
    pub soft_skill_issues: Vec<String>,
    pub formatting_issues: Vec<String>,
    pub keyword_issues: Vec<String>,
    pub bias_note: String,
    pub recruiter_tips: Vec<String>,
}

/// Listing projection of `scan_records` without the stored document bytes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScanSummaryRow {
    pub resume_id: i64,
    pub job_id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub file_type: String,
    pub job_description: String,
    pub scanned_at: DateTime<Utc>,
}

/// A persisted analysis, keyed by (resume_id, job_id, user_id).
/// Exists iff the matching `scan_records` row exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScanAnalysisRow {
    pub resume_id: i64,
    pub job_id: i64,
    pub user_id: i64,
    pub match_score: f64,
    pub profile_summary: String,
    pub strengths: Vec<String>,
    pub recommendations: String,
    pub missing_skills: Vec<String>,
    pub soft_skill_issues: Vec<String>,
    pub formatting_issues: Vec<String>,
    pub keyword_issues: Vec<String>,
    pub bias_note: String,
    pub recruiter_tips: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ScanAnalysisRow {
    /// Projects the stored columns back into the wire-level report shape.
    pub fn into_result(self) -> AnalysisResult {
        AnalysisResult {
            match_score: self.match_score,
            profile_summary: self.profile_summary,
            strengths: self.strengths,
            recommendations: self.recommendations,
            missing_skills: self.missing_skills,
            soft_skill_issues: self.soft_skill_issues,
            formatting_issues: self.formatting_issues,
            keyword_issues: self.keyword_issues,
            bias_note: self.bias_note,
            recruiter_tips: self.recruiter_tips,
        }
    }
}
