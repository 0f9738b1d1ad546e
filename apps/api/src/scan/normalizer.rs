//! Response Normalizer — turns raw inference-service text into a validated
//! `AnalysisResult`.
//!
//! The raw text is untrusted: the model may wrap the object in markdown
//! fences, drop fields, or mangle the score. Each failure mode has its own
//! error kind, and every kind carries the raw text for diagnostics. The
//! whole pass is pure — re-running it on the same input yields the same
//! result or the same failure.

use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::scan::AnalysisResult;

/// The ten fields the prompt instructs the model to emit, in declaration
/// order. A missing-field failure names the first one absent.
const REQUIRED_FIELDS: [&str; 10] = [
    "JD Match",
    "Profile Summary",
    "STRENGTHS",
    "RECOMMENDATIONS",
    "Missing Skills",
    "Soft Skill Issues",
    "Formatting Issues",
    "Keyword Issues",
    "Bias Detection",
    "Recruiter Tips",
];

/// Normalizes one raw model reply.
pub fn normalize_report(raw: &str) -> Result<AnalysisResult, AppError> {
    let text = strip_json_fences(raw);

    let value: Value = serde_json::from_str(text).map_err(|e| AppError::MalformedModelOutput {
        detail: e.to_string(),
        raw: raw.to_string(),
    })?;

    let map = value.as_object().ok_or_else(|| AppError::MalformedModelOutput {
        detail: "expected a single JSON object".to_string(),
        raw: raw.to_string(),
    })?;

    for field in REQUIRED_FIELDS {
        if !map.contains_key(field) {
            return Err(AppError::IncompleteModelOutput {
                missing_field: field,
                raw: raw.to_string(),
            });
        }
    }

    let match_score =
        parse_match_score(&field_string(map, "JD Match")).map_err(|value| {
            AppError::InvalidScoreFormat {
                value,
                raw: raw.to_string(),
            }
        })?;

    Ok(AnalysisResult {
        match_score,
        profile_summary: field_string(map, "Profile Summary"),
        strengths: field_list(map, "STRENGTHS"),
        recommendations: field_string(map, "RECOMMENDATIONS"),
        missing_skills: field_list(map, "Missing Skills"),
        soft_skill_issues: field_list(map, "Soft Skill Issues"),
        formatting_issues: field_list(map, "Formatting Issues"),
        keyword_issues: field_list(map, "Keyword Issues"),
        bias_note: field_string(map, "Bias Detection"),
        recruiter_tips: field_list(map, "Recruiter Tips"),
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Extracts the match score: trim, drop one trailing percent sign, parse as
/// a decimal in [0, 100], round to one decimal place. On failure returns
/// the offending value for the error report.
fn parse_match_score(raw_score: &str) -> Result<f64, String> {
    let trimmed = raw_score.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    let score: f64 = digits.parse().map_err(|_| raw_score.to_string())?;

    if !(0.0..=100.0).contains(&score) {
        return Err(raw_score.to_string());
    }

    Ok((score * 10.0).round() / 10.0)
}

/// Scalar field, tolerant of non-string JSON values.
fn field_string(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// List field; a non-array value degrades to an empty list rather than
/// failing the whole report.
fn field_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}
