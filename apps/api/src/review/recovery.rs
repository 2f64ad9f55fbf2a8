//! Completion recovery: turns raw backend text into a JSON object, one tier at a time.
//!
//! Tiers run in order and the first success wins:
//! 1. `Direct`: the text is already a JSON object
//! 2. `FenceStripped`: the object is wrapped in ``` fences (optional language tag)
//! 3. `BracketSpan`: first `{` through last `}`, dropping surrounding commentary
//! 4. `Repaired`: single quotes -> double quotes, trailing commas dropped
//!
//! Each tier is a plain function so it can be tested in isolation. When every
//! tier fails the caller gets `ParseOutcome::Failed` with one reason per tier;
//! synthesizing a record from that is the caller's job.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Which recovery step produced a record. `Synthesized` marks the terminal fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryTier {
    Direct,
    FenceStripped,
    BracketSpan,
    Repaired,
    Synthesized,
}

#[derive(Debug, Clone)]
pub struct TierFailure {
    pub tier: RecoveryTier,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Parsed {
        tier: RecoveryTier,
        record: Map<String, Value>,
    },
    Failed {
        failures: Vec<TierFailure>,
    },
}

type TierFn = fn(&str) -> Result<Map<String, Value>, String>;

const CHAIN: [(RecoveryTier, TierFn); 4] = [
    (RecoveryTier::Direct, parse_direct),
    (RecoveryTier::FenceStripped, parse_fence_stripped),
    (RecoveryTier::BracketSpan, parse_bracket_span),
    (RecoveryTier::Repaired, parse_repaired),
];

/// Runs the recovery chain over a raw completion.
pub fn recover_object(raw: &str) -> ParseOutcome {
    let mut failures = Vec::with_capacity(CHAIN.len());

    for (tier, attempt) in CHAIN {
        match attempt(raw) {
            Ok(record) => return ParseOutcome::Parsed { tier, record },
            Err(reason) => {
                debug!(?tier, %reason, "completion recovery tier failed");
                failures.push(TierFailure { tier, reason });
            }
        }
    }

    ParseOutcome::Failed { failures }
}

pub fn parse_direct(raw: &str) -> Result<Map<String, Value>, String> {
    parse_object(raw)
}

pub fn parse_fence_stripped(raw: &str) -> Result<Map<String, Value>, String> {
    let inner = strip_code_fences(raw).ok_or("no code fence found")?;
    parse_object(inner)
}

pub fn parse_bracket_span(raw: &str) -> Result<Map<String, Value>, String> {
    let span = bracket_span(raw).ok_or("no `{ ... }` span found")?;
    parse_object(span)
}

pub fn parse_repaired(raw: &str) -> Result<Map<String, Value>, String> {
    let candidate = bracket_span(raw).unwrap_or_else(|| raw.trim());
    parse_object(&repair_json(candidate))
}

fn parse_object(text: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(format!("expected a JSON object, got {}", value_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strips leading ```` ```lang ```` and trailing ```` ``` ```` markers.
/// Returns `None` when the text carries neither marker.
pub fn strip_code_fences(text: &str) -> Option<&str> {
    let mut inner = text.trim();
    let mut stripped = false;

    if let Some(rest) = inner.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        inner = &rest[tag_len..];
        stripped = true;
    }
    if let Some(rest) = inner.trim_end().strip_suffix("```") {
        inner = rest;
        stripped = true;
    }

    stripped.then(|| inner.trim())
}

/// The substring from the first `{` to the last `}`, inclusive.
pub fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Minimal textual repair for near-JSON: single-quoted strings become
/// double-quoted, and commas directly before `}` or `]` are removed.
/// Apostrophes inside double-quoted strings are left untouched.
pub fn repair_json(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '"' => {
                out.push('"');
                i = copy_double_quoted(&chars, i + 1, &mut out);
            }
            '\'' => {
                out.push('"');
                i = copy_single_quoted(&chars, i + 1, &mut out);
            }
            ',' if closes_after_whitespace(&chars, i + 1) => i += 1,
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Copies a double-quoted body (escapes intact) including the closing quote.
fn copy_double_quoted(chars: &[char], mut i: usize, out: &mut String) -> usize {
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        match c {
            '\\' if i + 1 < chars.len() => {
                out.push(chars[i + 1]);
                i += 2;
            }
            '"' => return i + 1,
            _ => i += 1,
        }
    }
    i
}

/// Copies a single-quoted body, re-escaping it for a double-quoted string.
fn copy_single_quoted(chars: &[char], mut i: usize, out: &mut String) -> usize {
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                if chars[i + 1] == '\'' {
                    out.push('\'');
                } else {
                    out.push('\\');
                    out.push(chars[i + 1]);
                }
                i += 2;
            }
            '\'' => {
                out.push('"');
                return i + 1;
            }
            '"' => {
                out.push_str("\\\"");
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    i
}

fn closes_after_whitespace(chars: &[char], from: usize) -> bool {
    chars[from..]
        .iter()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| *c == '}' || *c == ']')
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"summary": "Solid resume", "score": 72}"#;

    fn tier_of(raw: &str) -> Option<RecoveryTier> {
        match recover_object(raw) {
            ParseOutcome::Parsed { tier, .. } => Some(tier),
            ParseOutcome::Failed { .. } => None,
        }
    }

    #[test]
    fn test_direct_parse_wins_for_clean_json() {
        assert_eq!(tier_of(VALID), Some(RecoveryTier::Direct));
    }

    #[test]
    fn test_direct_rejects_non_object() {
        let err = parse_direct("[1, 2, 3]").unwrap_err();
        assert!(err.contains("an array"), "{err}");
    }

    #[test]
    fn test_strip_code_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), Some("{\"key\": \"value\"}"));
    }

    #[test]
    fn test_strip_code_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), Some("{\"key\": \"value\"}"));
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        assert_eq!(strip_code_fences("{\"key\": \"value\"}"), None);
    }

    #[test]
    fn test_strip_code_fences_unterminated() {
        let input = "```json\n{\"key\": \"value\"}";
        assert_eq!(strip_code_fences(input), Some("{\"key\": \"value\"}"));
    }

    #[test]
    fn test_fenced_completion_uses_fence_tier() {
        let raw = format!("```json\n{VALID}\n```");
        assert_eq!(tier_of(&raw), Some(RecoveryTier::FenceStripped));
    }

    #[test]
    fn test_bracket_span_drops_commentary() {
        let raw = format!("Sure! Here is the review:\n{VALID}\nLet me know if you need more.");
        assert_eq!(bracket_span(&raw), Some(VALID));
        assert_eq!(tier_of(&raw), Some(RecoveryTier::BracketSpan));
    }

    #[test]
    fn test_bracket_span_uses_last_closing_brace() {
        let raw = r#"note {"a": {"b": 1}} trailing"#;
        assert_eq!(bracket_span(raw), Some(r#"{"a": {"b": 1}}"#));
    }

    #[test]
    fn test_bracket_span_absent() {
        assert_eq!(bracket_span("no braces here"), None);
        assert_eq!(bracket_span("} backwards {"), None);
    }

    #[test]
    fn test_repair_single_quotes() {
        let repaired = repair_json("{'summary': 'Good', 'score': 80}");
        assert_eq!(repaired, r#"{"summary": "Good", "score": 80}"#);
    }

    #[test]
    fn test_repair_trailing_commas() {
        let repaired = repair_json("{\"strengths\": [\"Rust\", \"Go\",  ],\n}");
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["strengths"], serde_json::json!(["Rust", "Go"]));
    }

    #[test]
    fn test_repair_keeps_apostrophes_inside_double_quotes() {
        let input = r#"{"summary": "The candidate's resume is clear",}"#;
        let repaired = repair_json(input);
        assert_eq!(repaired, r#"{"summary": "The candidate's resume is clear"}"#);
    }

    #[test]
    fn test_repair_escapes_double_quotes_inside_single_quotes() {
        let repaired = repair_json(r#"{'summary': 'Uses "agile" loosely'}"#);
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["summary"], "Uses \"agile\" loosely");
    }

    #[test]
    fn test_repair_leaves_comma_inside_string() {
        let repaired = repair_json(r#"{"summary": "a, ]"}"#);
        assert_eq!(repaired, r#"{"summary": "a, ]"}"#);
    }

    #[test]
    fn test_repaired_tier_recovers_python_style_dict() {
        let raw = "Here you go: {'summary': 'Fine', 'strengths': ['SQL',], 'score': 64,} thanks";
        match recover_object(raw) {
            ParseOutcome::Parsed { tier, record } => {
                assert_eq!(tier, RecoveryTier::Repaired);
                assert_eq!(record["score"], 64);
            }
            ParseOutcome::Failed { failures } => panic!("unexpected failure: {failures:?}"),
        }
    }

    #[test]
    fn test_total_failure_reports_every_tier() {
        match recover_object("the model is overloaded, try later") {
            ParseOutcome::Failed { failures } => {
                let tiers: Vec<_> = failures.iter().map(|f| f.tier).collect();
                assert_eq!(
                    tiers,
                    vec![
                        RecoveryTier::Direct,
                        RecoveryTier::FenceStripped,
                        RecoveryTier::BracketSpan,
                        RecoveryTier::Repaired,
                    ]
                );
                assert!(failures.iter().all(|f| !f.reason.is_empty()));
            }
            ParseOutcome::Parsed { .. } => panic!("plain prose must not parse"),
        }
    }

    #[test]
    fn test_truncated_json_fails() {
        let raw = r#"{"summary": "Cut off mid-"#;
        assert!(matches!(recover_object(raw), ParseOutcome::Failed { .. }));
    }
}
