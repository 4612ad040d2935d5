//! Model response parsing and validation.
//!
//! Model output is unreliable, not hostile. The parser degrades gracefully:
//! - A missing or mistyped field takes its default and leaves a note
//! - Only an unlocatable or syntactically invalid object is a hard failure
//!
//! Values are never invented. A field the model did not supply is reported
//! as defaulted, not filled with something plausible.

mod extract;
mod fields;

pub use extract::{extract_payload, locate_json, strip_fences};
pub use fields::ResponseField;

use serde_json::Value;
use thiserror::Error;

use crate::types::ScreeningReport;
use fields::FieldResolver;

/// Hard parse failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON object found in model response")]
    NoJsonFound,

    #[error("malformed JSON in model response: {reason}")]
    MalformedJson {
        /// The candidate object text that failed to decode
        payload: String,

        /// Decoder message
        reason: String,
    },
}

/// Parse a raw model response into a normalized report.
pub fn parse(raw: &str) -> Result<ScreeningReport, ParseError> {
    let payload = extract_payload(raw)?;

    let value: Value = serde_json::from_str(payload).map_err(|e| ParseError::MalformedJson {
        payload: payload.to_string(),
        reason: e.to_string(),
    })?;

    let Value::Object(object) = value else {
        return Err(ParseError::MalformedJson {
            payload: payload.to_string(),
            reason: "expected a JSON object".to_string(),
        });
    };

    let (result, notes) = FieldResolver::new(&object).resolve();

    for note in &notes {
        tracing::debug!(field = %note.field, "{}", note.message);
    }

    Ok(ScreeningReport { result, notes })
}
