//! Human-readable report rendering.

use std::fmt::Write;

use crate::response::ParseError;
use crate::types::{ScreeningReport, ScreeningResult};

/// Report banner.
pub const REPORT_HEADER: &str = "--- SCREENING REPORT ---";

/// Marker printed instead of a report when the response could not be parsed.
pub const UNPARSED_MARKER: &str = "Could not parse the model response";

/// Render a screening result.
///
/// Empty lists render as an empty string after the label.
pub fn render(result: &ScreeningResult) -> String {
    let score = match result.match_score {
        Some(score) => format!("{score}/100"),
        None => "n/a".to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "{REPORT_HEADER}");
    let _ = writeln!(out, "Candidate: {}", result.candidate_name);
    let _ = writeln!(out, "Score: {score}");
    let _ = writeln!(
        out,
        "Decision: {}",
        result.recommendation.as_str().to_uppercase()
    );
    let _ = writeln!(out, "Reasoning: {}", result.reasoning);
    let _ = writeln!(out, "Key Strengths: {}", result.key_strengths.join(", "));
    let _ = writeln!(
        out,
        "Missing Skills: {}",
        result.missing_critical_skills.join(", ")
    );
    out
}

/// Render a report, followed by its validation notes when there are any.
pub fn render_report(report: &ScreeningReport) -> String {
    let mut out = render(&report.result);
    if !report.notes.is_empty() {
        let _ = writeln!(out, "\nValidation notes:");
        for note in &report.notes {
            let _ = writeln!(out, "  - {note}");
        }
    }
    out
}

/// Render the raw response in place of a report.
pub fn render_unparsed(error: &ParseError, raw: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{UNPARSED_MARKER} ({error}). Raw output:");
    let _ = writeln!(out, "{raw}");
    out
}
