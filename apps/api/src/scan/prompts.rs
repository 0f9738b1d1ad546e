//! Prompt Compiler — builds the instruction payload for the inference call.
//!
//! Pure template substitution: the same job description always compiles to
//! the same prompt. The job description is embedded verbatim; non-empty
//! checks happen upstream at the pipeline boundary.

/// Evaluation prompt. Replace `{job_description}` before sending.
/// The field names in the schema below are load-bearing: the normalizer
/// validates the model's reply against exactly these ten keys.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Act as a skilled and very experienced ATS (Applicant Tracking System) with a deep understanding of the tech field, software engineering, data science, data analysis, and big data engineering. Your task is to evaluate the resume against the given job description. The job market is very competitive, and you should provide the best assistance for improving the resume. Assign the percentage match based on the job description and identify the missing keywords with high accuracy.

Resume: provided as the attached page image.
Job Description: {job_description}

I want the response as one single JSON object having exactly the following structure:
{
  "JD Match": "% Match Score",
  "Profile Summary": "",
  "STRENGTHS": [],
  "RECOMMENDATIONS": "",
  "Missing Skills": [],
  "Soft Skill Issues": [],
  "Formatting Issues": [],
  "Keyword Issues": [],
  "Bias Detection": "",
  "Recruiter Tips": []
}"#;

/// Compiles the evaluation prompt for one job description.
pub fn build_analysis_prompt(job_description: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE.replace("{job_description}", job_description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        let jd = "Backend engineer, Go, PostgreSQL";
        assert_eq!(build_analysis_prompt(jd), build_analysis_prompt(jd));
    }

    #[test]
    fn test_prompt_embeds_job_description_verbatim() {
        let jd = "Senior Rust Engineer — 5+ years, distributed systems";
        let prompt = build_analysis_prompt(jd);
        assert!(prompt.contains(jd));
        assert!(!prompt.contains("{job_description}"));
    }

    #[test]
    fn test_prompt_names_every_schema_field() {
        let prompt = build_analysis_prompt("any");
        for field in [
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
        ] {
            assert!(prompt.contains(field), "prompt lost the '{field}' field");
        }
    }
}
