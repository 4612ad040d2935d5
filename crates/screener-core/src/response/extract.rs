//! Payload extraction: locate the JSON object inside a model response.
//!
//! Two stages, each usable on its own:
//! 1. [`strip_fences`] removes code-fence markers around the response
//! 2. [`locate_json`] falls back to brace scanning when prose surrounds the object

use lazy_static::lazy_static;
use regex::Regex;

use super::ParseError;

lazy_static! {
    /// Opening fence with an optional language tag ("```", "```json", "```JSON5").
    static ref OPENING_FENCE: Regex =
        Regex::new(r"^```[A-Za-z0-9_+.-]*[ \t]*(?:\r?\n)?").unwrap();

    /// Closing fence, possibly on its own line.
    static ref CLOSING_FENCE: Regex = Regex::new(r"(?:\r?\n)?[ \t]*```$").unwrap();
}

/// Remove code-fence markers from the start and end of a response.
///
/// Either marker may be absent. The result is trimmed.
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();

    let text = match OPENING_FENCE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };

    let text = match CLOSING_FENCE.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    };

    text.trim()
}

/// Find the JSON object candidate in already-stripped text.
///
/// Text that is already brace-delimited is returned unchanged. Otherwise
/// the slice from the first `{` to the last `}` is returned, or `None`
/// when no such pair exists.
pub fn locate_json(text: &str) -> Option<&str> {
    if text.starts_with('{') && text.ends_with('}') {
        return Some(text);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;

    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Run both stages and return the candidate payload.
pub fn extract_payload(raw: &str) -> Result<&str, ParseError> {
    let stripped = strip_fences(raw);
    locate_json(stripped).ok_or(ParseError::NoJsonFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_single_line() {
        assert_eq!(strip_fences("```json{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_fences_unterminated() {
        assert_eq!(strip_fences("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_fences_crlf() {
        assert_eq!(strip_fences("```JSON\r\n{\"a\":1}\r\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_locate_json_passthrough() {
        assert_eq!(locate_json("{\"a\":1}"), Some("{\"a\":1}"));
    }

    #[test]
    fn test_locate_json_surrounded_by_prose() {
        let text = "Sure! {\"match_score\": \"75\"} Hope this helps!";
        assert_eq!(locate_json(text), Some("{\"match_score\": \"75\"}"));
    }

    #[test]
    fn test_locate_json_nested_uses_outer_braces() {
        let text = "Result: {\"a\": {\"b\": 1}} done";
        assert_eq!(locate_json(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_locate_json_none() {
        assert_eq!(locate_json("not json at all"), None);
        assert_eq!(locate_json("only { opening"), None);
        assert_eq!(locate_json("} reversed {"), None);
        assert_eq!(locate_json(""), None);
    }

    #[test]
    fn test_extract_payload_fence_after_prose() {
        let raw = "Here is the evaluation:\n```json\n{\"a\": 1}\n```";
        assert_eq!(extract_payload(raw).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_payload_empty_fence() {
        assert!(matches!(extract_payload("```\n```"), Err(ParseError::NoJsonFound)));
    }
}
