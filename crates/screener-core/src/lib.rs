//! # screener-core
//!
//! Deterministic building blocks for LLM-assisted resume screening.
//!
//! This crate owns everything around the model call:
//! - Reading resume text from a document
//! - Building the screening prompt
//! - Parsing and validating the model's JSON answer
//! - Rendering the report
//!
//! ## Key Guarantees
//!
//! 1. **No network calls**: Model invocation lives in `screener-runtime`
//! 2. **Deterministic**: Same prompt inputs and same response produce the same report
//! 3. **Graceful degradation**: A missing field never aborts a run; it is defaulted and noted
//!
//! ## Example
//!
//! ```rust
//! use screener_core::{parse, render, Recommendation};
//!
//! let raw = "```json\n{\"candidate_name\": \"A\", \"match_score\": 80, \"recommendation\": \"interview\"}\n```";
//! let report = parse(raw).unwrap();
//!
//! assert_eq!(report.result.recommendation, Recommendation::Interview);
//! println!("{}", render(&report.result));
//! ```

pub mod prompt;
pub mod render;
pub mod response;
pub mod sample;
pub mod source;
pub mod types;

// Re-export main types at crate root
pub use render::{render, render_report, render_unparsed};
pub use response::{parse, ParseError, ResponseField};
pub use sample::SAMPLE_JOB_DESCRIPTION;
pub use source::{extract_text, DocumentKind, SourceError};
pub use types::{
    EvaluationRequest, Recommendation, ScreeningReport, ScreeningResult, ValidationNote,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_prompt() {
        let request = EvaluationRequest::new("Jane Doe, Python", SAMPLE_JOB_DESCRIPTION);
        let prompt = request.prompt();

        assert!(prompt.contains("Jane Doe, Python"));
        assert!(prompt.contains("Junior Data Scientist"));
    }

    #[test]
    fn test_parse_then_render() {
        let raw = r#"{"candidate_name": "Jane", "match_score": 64, "key_strengths": ["SQL"],
            "missing_critical_skills": [], "recommendation": "Reject", "reasoning": "Too junior."}"#;
        let report = parse(raw).unwrap();
        let text = render(&report.result);

        assert!(text.contains("Candidate: Jane"));
        assert!(text.contains("Score: 64/100"));
        assert!(text.contains("Decision: REJECT"));
        assert!(text.contains("Missing Skills: \n"));
    }
}
