//! Screening prompt.
//!
//! The prompt is a single user message made of three parts:
//! 1. Recruiter role and evaluation rubric (fixed)
//! 2. Job description and resume (interpolated verbatim)
//! 3. Output format directive (fixed)
//!
//! The field names in [`OUTPUT_FORMAT`] are the keys the response parser
//! looks for. Change them together.

/// Role instruction placed at the top of every prompt.
pub const RECRUITER_ROLE: &str = r#"You are a Senior Technical Recruiter with 20 years of experience.
Act as an experienced technical recruiter: your goal is to objectively
evaluate a candidate based on a Job Description (JD)."#;

/// Matching guidance given after the inputs.
pub const EVALUATION_TASK: &str = r#"TASK:
Analyze the resume against the JD. Look for key skills, experience levels, and project relevance.
Be strict but fair. Treat near-identical technology names as equivalent:
"React" matches "React.js". "AWS" matches "Amazon Web Services"."#;

/// Output directive. The model must answer with this JSON object only.
pub const OUTPUT_FORMAT: &str = r#"OUTPUT FORMAT:
Provide the response in valid JSON format only. Do not add any conversational text.
Respond with a single JSON object with exactly this structure:
{
    "candidate_name": "extracted name",
    "match_score": 0-100,
    "key_strengths": ["list of 3 key strengths"],
    "missing_critical_skills": ["list of missing skills"],
    "recommendation": "Interview" or "Reject",
    "reasoning": "A 2-sentence summary of why."
}"#;

/// Build the screening prompt.
///
/// Pure and deterministic. Neither input is truncated or escaped.
pub fn build(job_description: &str, resume_text: &str) -> String {
    format!(
        "{RECRUITER_ROLE}\n\n\
         JOB DESCRIPTION:\n{job_description}\n\n\
         CANDIDATE RESUME:\n{resume_text}\n\n\
         {EVALUATION_TASK}\n\n\
         {OUTPUT_FORMAT}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_embeds_inputs_verbatim() {
        let jd = "Must have:\n- Rust {async}\n- \"SQL\"";
        let resume = "Jane Doe\nSkills: Rust, PostgreSQL";
        let prompt = build(jd, resume);

        assert!(prompt.contains(jd));
        assert!(prompt.contains(resume));
    }

    #[test]
    fn test_build_orders_sections() {
        let prompt = build("THE-JD", "THE-RESUME");
        let role = prompt.find("experienced technical recruiter").unwrap();
        let jd = prompt.find("THE-JD").unwrap();
        let resume = prompt.find("THE-RESUME").unwrap();
        let format = prompt.find("OUTPUT FORMAT").unwrap();

        assert!(role < jd);
        assert!(jd < resume);
        assert!(resume < format);
    }

    #[test]
    fn test_build_is_deterministic() {
        assert_eq!(build("a", "b"), build("a", "b"));
    }

    #[test]
    fn test_output_format_names_every_field() {
        for field in [
            "candidate_name",
            "match_score",
            "key_strengths",
            "missing_critical_skills",
            "recommendation",
            "reasoning",
        ] {
            assert!(OUTPUT_FORMAT.contains(field), "missing {field}");
        }
        assert!(OUTPUT_FORMAT.contains("Do not add any conversational text"));
    }

    #[test]
    fn test_synonym_guidance_present() {
        assert!(EVALUATION_TASK.contains("React.js"));
        assert!(EVALUATION_TASK.contains("Amazon Web Services"));
    }
}
