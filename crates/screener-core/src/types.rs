//! Core data model for a screening run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inputs for one screening run.
///
/// Constructed once from the extracted resume and the job description,
/// then consumed by the prompt builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Plain text extracted from the candidate's resume
    pub resume_text: String,

    /// The job description the candidate is measured against
    pub job_description: String,
}

impl EvaluationRequest {
    pub fn new(resume_text: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            job_description: job_description.into(),
        }
    }

    /// Build the screening prompt for this request.
    pub fn prompt(&self) -> String {
        crate::prompt::build(&self.job_description, &self.resume_text)
    }
}

/// Hiring recommendation produced by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Recommendation {
    Interview,
    Reject,
    /// The model gave no recognizable recommendation
    #[default]
    Unknown,
}

impl Recommendation {
    /// Match a model-supplied label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("interview") {
            Some(Self::Interview)
        } else if label.eq_ignore_ascii_case("reject") {
            Some(Self::Reject)
        } else {
            None
        }
    }

    /// Canonical label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interview => "Interview",
            Self::Reject => "Reject",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether the model made an actual decision.
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate name used when the model does not supply one.
pub const UNKNOWN_CANDIDATE: &str = "Unknown";

/// Normalized screening result.
///
/// Every field has a safe default, so a result always exists once a JSON
/// object has been located in the model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningResult {
    /// Candidate name as extracted by the model
    pub candidate_name: String,

    /// Match score in [0, 100], `None` when the model gave nothing usable
    pub match_score: Option<u8>,

    /// Strengths relevant to the job, in model order
    pub key_strengths: Vec<String>,

    /// Required skills the candidate appears to lack, in model order
    pub missing_critical_skills: Vec<String>,

    /// Final recommendation
    pub recommendation: Recommendation,

    /// Short justification
    pub reasoning: String,
}

impl Default for ScreeningResult {
    fn default() -> Self {
        Self {
            candidate_name: UNKNOWN_CANDIDATE.to_string(),
            match_score: None,
            key_strengths: Vec::new(),
            missing_critical_skills: Vec::new(),
            recommendation: Recommendation::Unknown,
            reasoning: String::new(),
        }
    }
}

/// A non-fatal degradation recorded while normalizing a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationNote {
    /// Response field the note refers to (e.g., "match_score")
    pub field: String,

    /// What was wrong and which default was applied
    pub message: String,
}

impl ValidationNote {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Successful parse: the normalized result plus any notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub result: ScreeningResult,

    #[serde(default)]
    pub notes: Vec<ValidationNote>,
}

impl ScreeningReport {
    /// True when every field was taken from the response without substitution.
    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }

    /// Notes recorded for a specific field.
    pub fn notes_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationNote> {
        self.notes.iter().filter(move |n| n.field == field)
    }
}
