// Response parser: pulls the JSON advice object out of the model's
// free-form reply text.

use serde_json::Value;

use crate::model::{Recommendation, ReplyParseError};

/// Placeholder when the decoded object carries no usable `analysis` key.
pub const MISSING_ANALYSIS: &str = "No analysis provided.";

/// Structured advice extracted from a raw reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub analysis: String,
    pub recommendation: Recommendation,
}

/// Extracts the advice object from `raw`.
///
/// The JSON candidate is the slice from the first `{` to the last `}` of
/// the whole text, so prose or code fences around the object are ignored.
/// A `{` inside leading prose corrupts the slice and fails the decode;
/// that behavior is deliberate and covered by a test, since replies are
/// expected to embed exactly one object.
///
/// Missing keys never fail the parse: `analysis` falls back to a
/// placeholder and an absent or unknown recommendation label maps to
/// [`Recommendation::Error`].
pub fn extract_reply(raw: &str) -> Result<ParsedReply, ReplyParseError> {
    let (start, end) = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return Err(ReplyParseError::NoJsonObject {
                raw: raw.to_string(),
            });
        }
    };

    let candidate = &raw[start..=end];
    let value: Value =
        serde_json::from_str(candidate).map_err(|e| ReplyParseError::InvalidJson {
            message: e.to_string(),
            raw: raw.to_string(),
        })?;

    let analysis = value
        .get("analysis")
        .and_then(Value::as_str)
        .unwrap_or(MISSING_ANALYSIS)
        .to_string();
    let recommendation = value
        .get("recommendation")
        .and_then(Value::as_str)
        .and_then(Recommendation::from_label)
        .unwrap_or(Recommendation::Error);

    Ok(ParsedReply {
        analysis,
        recommendation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_object_despite_surrounding_noise() {
        let raw = r#"noise {"analysis":"x","recommendation":"Buy"} trailing"#;
        let reply = extract_reply(raw).unwrap();
        assert_eq!(reply.analysis, "x");
        assert_eq!(reply.recommendation, Recommendation::Buy);
    }

    #[test]
    fn handles_code_fenced_replies() {
        let raw = "```json\n{\"analysis\":\"looks weak\",\"recommendation\":\"Sell\"}\n```";
        let reply = extract_reply(raw).unwrap();
        assert_eq!(reply.analysis, "looks weak");
        assert_eq!(reply.recommendation, Recommendation::Sell);
    }

    #[test]
    fn no_braces_fails_and_embeds_the_raw_text() {
        let raw = "I cannot help with that.";
        let err = extract_reply(raw).unwrap_err();
        match &err {
            ReplyParseError::NoJsonObject { raw: captured } => assert_eq!(captured, raw),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains(raw));
    }

    #[test]
    fn inverted_braces_fail_the_same_way() {
        let err = extract_reply("} nothing here {").unwrap_err();
        assert!(matches!(err, ReplyParseError::NoJsonObject { .. }));
    }

    #[test]
    fn invalid_json_keeps_the_decode_error_and_raw_text() {
        let raw = "{not valid json}";
        let err = extract_reply(raw).unwrap_err();
        match &err {
            ReplyParseError::InvalidJson { message, raw: captured } => {
                assert!(!message.is_empty());
                assert_eq!(captured, raw);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let shown = err.to_string();
        assert!(shown.contains("JSON parsing error"));
        assert!(shown.contains(raw));
    }

    #[test]
    fn missing_keys_fall_back_to_placeholders() {
        let reply = extract_reply("{}").unwrap();
        assert_eq!(reply.analysis, MISSING_ANALYSIS);
        assert_eq!(reply.recommendation, Recommendation::Error);
    }

    #[test]
    fn non_string_values_count_as_missing() {
        let reply = extract_reply(r#"{"analysis":42,"recommendation":["Buy"]}"#).unwrap();
        assert_eq!(reply.analysis, MISSING_ANALYSIS);
        assert_eq!(reply.recommendation, Recommendation::Error);
    }

    #[test]
    fn unknown_labels_map_to_the_error_sentinel() {
        let reply =
            extract_reply(r#"{"analysis":"ok","recommendation":"Hold"}"#).unwrap();
        assert_eq!(reply.analysis, "ok");
        assert_eq!(reply.recommendation, Recommendation::Error);
    }

    #[test]
    fn labels_are_matched_case_insensitively() {
        let reply =
            extract_reply(r#"{"analysis":"ok","recommendation":"strong buy"}"#).unwrap();
        assert_eq!(reply.recommendation, Recommendation::StrongBuy);
    }

    #[test]
    fn brace_in_leading_prose_corrupts_the_slice() {
        let raw = r#"set {alpha} first {"analysis":"x","recommendation":"Buy"}"#;
        let err = extract_reply(raw).unwrap_err();
        assert!(matches!(err, ReplyParseError::InvalidJson { .. }));
    }
}
