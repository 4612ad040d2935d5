//! Per-field default resolution.
//!
//! Each field is read independently. A missing or mistyped field takes
//! its default and leaves a [`ValidationNote`]; nothing here fails.

use serde_json::{Map, Value};

use crate::types::{Recommendation, ScreeningResult, ValidationNote, UNKNOWN_CANDIDATE};

/// Fields the model is asked to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseField {
    CandidateName,
    MatchScore,
    KeyStrengths,
    MissingCriticalSkills,
    Recommendation,
    Reasoning,
}

impl ResponseField {
    /// All fields, in prompt order.
    pub const ALL: [ResponseField; 6] = [
        Self::CandidateName,
        Self::MatchScore,
        Self::KeyStrengths,
        Self::MissingCriticalSkills,
        Self::Recommendation,
        Self::Reasoning,
    ];

    /// Key requested in the prompt.
    pub fn key(self) -> &'static str {
        match self {
            Self::CandidateName => "candidate_name",
            Self::MatchScore => "match_score",
            Self::KeyStrengths => "key_strengths",
            Self::MissingCriticalSkills => "missing_critical_skills",
            Self::Recommendation => "recommendation",
            Self::Reasoning => "reasoning",
        }
    }

    /// camelCase spelling some models use instead.
    fn alias(self) -> &'static str {
        match self {
            Self::CandidateName => "candidateName",
            Self::MatchScore => "matchScore",
            Self::KeyStrengths => "keyStrengths",
            Self::MissingCriticalSkills => "missingCriticalSkills",
            Self::Recommendation => "recommendation",
            Self::Reasoning => "reasoning",
        }
    }
}

/// Score bounds.
const MIN_SCORE: i64 = 0;
const MAX_SCORE: i64 = 100;

/// Resolves fields of one decoded response object, collecting notes.
pub(crate) struct FieldResolver<'a> {
    object: &'a Map<String, Value>,
    notes: Vec<ValidationNote>,
}

impl<'a> FieldResolver<'a> {
    pub(crate) fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            notes: Vec::new(),
        }
    }

    /// Resolve every field and hand back the result with its notes.
    pub(crate) fn resolve(mut self) -> (ScreeningResult, Vec<ValidationNote>) {
        let result = ScreeningResult {
            candidate_name: self.candidate_name(),
            match_score: self.match_score(),
            key_strengths: self.string_list(ResponseField::KeyStrengths),
            missing_critical_skills: self.string_list(ResponseField::MissingCriticalSkills),
            recommendation: self.recommendation(),
            reasoning: self.reasoning(),
        };
        (result, self.notes)
    }

    fn lookup(&self, field: ResponseField) -> Option<&'a Value> {
        self.object
            .get(field.key())
            .or_else(|| self.object.get(field.alias()))
    }

    fn note(&mut self, field: ResponseField, message: impl Into<String>) {
        self.notes.push(ValidationNote::new(field.key(), message));
    }

    fn candidate_name(&mut self) -> String {
        let field = ResponseField::CandidateName;
        match self.lookup(field) {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                self.note(
                    field,
                    format!(
                        "expected a string, found {}; defaulted to \"{UNKNOWN_CANDIDATE}\"",
                        kind(other)
                    ),
                );
                UNKNOWN_CANDIDATE.to_string()
            }
            None => {
                self.note(field, format!("missing; defaulted to \"{UNKNOWN_CANDIDATE}\""));
                UNKNOWN_CANDIDATE.to_string()
            }
        }
    }

    fn match_score(&mut self) -> Option<u8> {
        let field = ResponseField::MatchScore;
        let value = match self.lookup(field) {
            Some(Value::Null) | None => {
                self.note(field, "missing; left unset");
                return None;
            }
            Some(value) => value,
        };

        let Some(score) = coerce_score(value) else {
            self.note(
                field,
                format!("could not coerce {value} to an integer; left unset"),
            );
            return None;
        };

        let clamped = score.clamp(MIN_SCORE, MAX_SCORE);
        if clamped != score {
            self.note(
                field,
                format!("{score} is outside {MIN_SCORE}-{MAX_SCORE}; clamped to {clamped}"),
            );
        }

        u8::try_from(clamped).ok()
    }

    fn string_list(&mut self, field: ResponseField) -> Vec<String> {
        let items = match self.lookup(field) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.note(
                    field,
                    format!(
                        "expected an array of strings, found {}; defaulted to empty",
                        kind(other)
                    ),
                );
                return Vec::new();
            }
            None => {
                self.note(field, "missing; defaulted to empty");
                return Vec::new();
            }
        };

        let kept: Vec<String> = items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect();

        let dropped = items.len() - kept.len();
        if dropped > 0 {
            self.note(field, format!("dropped {dropped} non-string element(s)"));
        }

        kept
    }

    fn recommendation(&mut self) -> Recommendation {
        let field = ResponseField::Recommendation;
        match self.lookup(field) {
            Some(Value::String(label)) => match Recommendation::from_label(label) {
                Some(recommendation) => recommendation,
                None => {
                    self.note(
                        field,
                        format!("\"{label}\" is not Interview or Reject; defaulted to Unknown"),
                    );
                    Recommendation::Unknown
                }
            },
            Some(other) => {
                self.note(
                    field,
                    format!("expected a string, found {}; defaulted to Unknown", kind(other)),
                );
                Recommendation::Unknown
            }
            None => {
                self.note(field, "missing; defaulted to Unknown");
                Recommendation::Unknown
            }
        }
    }

    fn reasoning(&mut self) -> String {
        let field = ResponseField::Reasoning;
        match self.lookup(field) {
            Some(Value::String(reasoning)) => reasoning.clone(),
            Some(other) => {
                self.note(
                    field,
                    format!("expected a string, found {}; defaulted to empty", kind(other)),
                );
                String::new()
            }
            None => {
                self.note(field, "missing; defaulted to empty");
                String::new()
            }
        }
    }
}

/// Coerce a number or numeric string to an integer score (unclamped).
///
/// Floats are rounded. Strings may carry surrounding whitespace and a
/// trailing `%`.
fn coerce_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else if n.as_u64().is_some() {
                Some(i64::MAX)
            } else {
                n.as_f64().and_then(round_finite)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            let s = s.strip_suffix('%').unwrap_or(s).trim_end();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(round_finite))
        }
        _ => None,
    }
}

fn round_finite(f: f64) -> Option<i64> {
    // `as` saturates at the i64 bounds.
    f.is_finite().then(|| f.round() as i64)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(value: Value) -> (ScreeningResult, Vec<ValidationNote>) {
        let object = value.as_object().unwrap().clone();
        FieldResolver::new(&object).resolve()
    }

    #[test]
    fn test_coerce_score_variants() {
        assert_eq!(coerce_score(&json!(80)), Some(80));
        assert_eq!(coerce_score(&json!(79.6)), Some(80));
        assert_eq!(coerce_score(&json!("75")), Some(75));
        assert_eq!(coerce_score(&json!(" 75 ")), Some(75));
        assert_eq!(coerce_score(&json!("75%")), Some(75));
        assert_eq!(coerce_score(&json!("82.4")), Some(82));
        assert_eq!(coerce_score(&json!(-5)), Some(-5));
        assert_eq!(coerce_score(&json!("0-100")), None);
        assert_eq!(coerce_score(&json!("high")), None);
        assert_eq!(coerce_score(&json!(true)), None);
        assert_eq!(coerce_score(&json!([80])), None);
    }

    #[test]
    fn test_coerce_score_huge_unsigned() {
        assert_eq!(coerce_score(&json!(u64::MAX)), Some(i64::MAX));
    }

    #[test]
    fn test_score_clamped_low() {
        let (result, notes) = resolve(json!({"match_score": -20}));
        assert_eq!(result.match_score, Some(0));
        assert!(notes.iter().any(|n| n.field == "match_score" && n.message.contains("clamped")));
    }

    #[test]
    fn test_score_null_is_unset() {
        let (result, notes) = resolve(json!({"match_score": null}));
        assert_eq!(result.match_score, None);
        assert!(notes.iter().any(|n| n.field == "match_score"));
    }

    #[test]
    fn test_score_placeholder_is_unset() {
        let (result, notes) = resolve(json!({"match_score": "0-100"}));
        assert_eq!(result.match_score, None);
        let note = notes.iter().find(|n| n.field == "match_score").unwrap();
        assert!(note.message.contains("\"0-100\""));
    }

    #[test]
    fn test_list_drops_non_strings() {
        let (result, notes) = resolve(json!({"key_strengths": ["Python", 3, null, "SQL"]}));
        assert_eq!(result.key_strengths, vec!["Python", "SQL"]);
        let note = notes.iter().find(|n| n.field == "key_strengths").unwrap();
        assert!(note.message.contains("dropped 2"));
    }

    #[test]
    fn test_list_wrong_type() {
        let (result, notes) = resolve(json!({"missing_critical_skills": "AWS, NLP"}));
        assert!(result.missing_critical_skills.is_empty());
        let note = notes
            .iter()
            .find(|n| n.field == "missing_critical_skills")
            .unwrap();
        assert!(note.message.contains("found string"));
    }

    #[test]
    fn test_recommendation_other_value() {
        let (result, notes) = resolve(json!({"recommendation": "Maybe"}));
        assert_eq!(result.recommendation, Recommendation::Unknown);
        assert!(notes.iter().any(|n| n.field == "recommendation" && n.message.contains("Maybe")));
    }

    #[test]
    fn test_candidate_name_non_string() {
        let (result, notes) = resolve(json!({"candidate_name": 42}));
        assert_eq!(result.candidate_name, "Unknown");
        assert!(notes.iter().any(|n| n.field == "candidate_name"));
    }

    #[test]
    fn test_candidate_name_string_kept_verbatim() {
        for name in ["", "  Jane "] {
            let report = crate::response::parse(
                &json!({
                    "candidate_name": name,
                    "match_score": 50,
                    "key_strengths": [],
                    "missing_critical_skills": [],
                    "recommendation": "Reject",
                    "reasoning": "x"
                })
                .to_string(),
            )
            .unwrap();
            assert_eq!(report.result.candidate_name, name);
            assert!(report.is_clean());
        }
    }

    #[test]
    fn test_camel_case_aliases() {
        let (result, notes) = resolve(json!({
            "candidateName": "Ada",
            "matchScore": 91,
            "keyStrengths": ["Rust"],
            "missingCriticalSkills": [],
            "recommendation": "Interview",
            "reasoning": "Strong."
        }));
        assert_eq!(result.candidate_name, "Ada");
        assert_eq!(result.match_score, Some(91));
        assert_eq!(result.key_strengths, vec!["Rust"]);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_empty_object_notes_every_field() {
        let (result, notes) = resolve(json!({}));
        assert_eq!(result, ScreeningResult::default());
        for field in ResponseField::ALL {
            assert!(
                notes.iter().any(|n| n.field == field.key()),
                "no note for {}",
                field.key()
            );
        }
    }
}
