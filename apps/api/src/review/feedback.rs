//! ResumeFeedback: the validated record handed to the presentation layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::review::keywords::blend_scores;
use crate::review::recovery::RecoveryTier;

/// Score used when the model gives none, or gives something non-numeric.
pub const DEFAULT_SCORE: u8 = 50;

/// How the final score was assembled when a job description was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub model_score: u8,
    pub keyword_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeFeedback {
    pub summary: String,
    pub missing_skills: Vec<String>,
    pub weaknesses: Vec<String>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// Verbatim resume phrases used for PDF highlighting.
    pub highlighted_strengths: Vec<String>,
    pub highlighted_weaknesses: Vec<String>,
    /// Always within 0..=100.
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
    pub recovery: RecoveryTier,
}

/// Schema violations that cannot be coerced away.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("field `summary` is missing")]
    MissingSummary,

    #[error("field `summary` must be a non-empty string")]
    InvalidSummary,
}

impl ResumeFeedback {
    /// Builds a record from a recovered JSON object.
    ///
    /// List fields that are absent or not arrays become empty; non-string items are
    /// dropped. The score is rounded and clamped, or defaults to 50. Only a missing
    /// or blank `summary` rejects the record.
    pub fn from_record(record: &Map<String, Value>, tier: RecoveryTier) -> Result<Self, SchemaError> {
        let summary = match record.get("summary") {
            None | Some(Value::Null) => return Err(SchemaError::MissingSummary),
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(_) => return Err(SchemaError::InvalidSummary),
        };

        Ok(Self {
            summary,
            missing_skills: coerce_string_list(record.get("missing_skills")),
            weaknesses: coerce_string_list(record.get("weaknesses")),
            strengths: coerce_string_list(record.get("strengths")),
            improvements: coerce_string_list(record.get("improvements")),
            highlighted_strengths: coerce_string_list(record.get("highlighted_strengths")),
            highlighted_weaknesses: coerce_string_list(record.get("highlighted_weaknesses")),
            score: coerce_score(record.get("score")),
            score_breakdown: None,
            recovery: tier,
        })
    }

    /// The terminal fallback: a minimal valid record when nothing could be recovered.
    pub fn synthesized(job_role: &str) -> Self {
        Self {
            summary: format!(
                "Automated feedback for the {} role could not be generated from the model \
                response. The resume was received; please run the analysis again for \
                detailed feedback.",
                job_role.trim()
            ),
            missing_skills: Vec::new(),
            weaknesses: Vec::new(),
            strengths: Vec::new(),
            improvements: Vec::new(),
            highlighted_strengths: Vec::new(),
            highlighted_weaknesses: Vec::new(),
            score: DEFAULT_SCORE,
            score_breakdown: None,
            recovery: RecoveryTier::Synthesized,
        }
    }

    /// Blends the model's score with a keyword-overlap score. Applies at most once;
    /// later calls leave the record untouched and return `false`.
    pub fn apply_keyword_blend(&mut self, keyword_score: u8) -> bool {
        if self.score_breakdown.is_some() {
            return false;
        }
        let model_score = self.score;
        self.score = blend_scores(model_score, keyword_score);
        self.score_breakdown = Some(ScoreBreakdown {
            model_score,
            keyword_score,
        });
        true
    }

    /// Phrases to highlight as (strengths, weaknesses).
    ///
    /// Prefers the verbatim `highlighted_*` lists. When the model left one empty,
    /// the matching general list stands in, since the review prompt also asks for
    /// strengths quoted from the resume.
    pub fn annotation_phrases(&self) -> (&[String], &[String]) {
        (
            prefer_verbatim(&self.highlighted_strengths, &self.strengths),
            prefer_verbatim(&self.highlighted_weaknesses, &self.weaknesses),
        )
    }
}

fn prefer_verbatim<'a>(highlighted: &'a [String], general: &'a [String]) -> &'a [String] {
    if highlighted.is_empty() {
        general
    } else {
        highlighted
    }
}

/// Any array of strings survives as-is; everything else collapses to empty.
pub fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

pub fn coerce_score(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => v.round().clamp(0.0, 100.0) as u8,
        _ => DEFAULT_SCORE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn test_full_record_passes_through() {
        let rec = record(json!({
            "summary": "Clear structure, weak metrics.",
            "missing_skills": ["Kubernetes"],
            "weaknesses": ["No quantified impact"],
            "strengths": ["led a team of 5 engineers"],
            "improvements": ["Add metrics"],
            "highlighted_strengths": ["led a team of 5 engineers"],
            "highlighted_weaknesses": ["helped with projects"],
            "score": 74
        }));
        let feedback = ResumeFeedback::from_record(&rec, RecoveryTier::Direct).unwrap();
        assert_eq!(feedback.summary, "Clear structure, weak metrics.");
        assert_eq!(feedback.missing_skills, vec!["Kubernetes"]);
        assert_eq!(feedback.highlighted_weaknesses, vec!["helped with projects"]);
        assert_eq!(feedback.score, 74);
        assert_eq!(feedback.recovery, RecoveryTier::Direct);
        assert!(feedback.score_breakdown.is_none());
    }

    #[test]
    fn test_missing_lists_become_empty() {
        let rec = record(json!({"summary": "Short", "strengths": null, "weaknesses": "none"}));
        let feedback = ResumeFeedback::from_record(&rec, RecoveryTier::Direct).unwrap();
        assert!(feedback.strengths.is_empty());
        assert!(feedback.weaknesses.is_empty());
        assert!(feedback.missing_skills.is_empty());
        assert!(feedback.highlighted_strengths.is_empty());
    }

    #[test]
    fn test_non_string_items_are_dropped() {
        let list = coerce_string_list(Some(&json!(["SQL", 3, null, {"x": 1}, "Go"])));
        assert_eq!(list, vec!["SQL", "Go"]);
    }

    #[test]
    fn test_missing_summary_is_schema_error() {
        let rec = record(json!({"score": 90}));
        assert_eq!(
            ResumeFeedback::from_record(&rec, RecoveryTier::Direct).unwrap_err(),
            SchemaError::MissingSummary
        );
    }

    #[test]
    fn test_blank_or_non_string_summary_is_schema_error() {
        for bad in [json!("   "), json!(42), json!(["a"])] {
            let rec = record(json!({ "summary": bad }));
            assert_eq!(
                ResumeFeedback::from_record(&rec, RecoveryTier::Direct).unwrap_err(),
                SchemaError::InvalidSummary
            );
        }
    }

    #[test]
    fn test_score_coercion() {
        assert_eq!(coerce_score(Some(&json!(88))), 88);
        assert_eq!(coerce_score(Some(&json!(72.6))), 73);
        assert_eq!(coerce_score(Some(&json!(140))), 100);
        assert_eq!(coerce_score(Some(&json!(-12))), 0);
        assert_eq!(coerce_score(Some(&json!(" 65 "))), 65);
        assert_eq!(coerce_score(Some(&json!("excellent"))), DEFAULT_SCORE);
        assert_eq!(coerce_score(Some(&json!(null))), DEFAULT_SCORE);
        assert_eq!(coerce_score(None), DEFAULT_SCORE);
    }

    #[test]
    fn test_synthesized_record_shape() {
        let feedback = ResumeFeedback::synthesized("Data Engineer");
        assert!(feedback.summary.contains("Data Engineer"));
        assert_eq!(feedback.score, 50);
        assert!(feedback.strengths.is_empty() && feedback.improvements.is_empty());
        assert_eq!(feedback.recovery, RecoveryTier::Synthesized);
    }

    #[test]
    fn test_keyword_blend_applies_once() {
        let mut feedback = ResumeFeedback::synthesized("SRE");
        feedback.score = 80;
        assert!(feedback.apply_keyword_blend(33));
        assert_eq!(feedback.score, 66);
        assert!(!feedback.apply_keyword_blend(0));
        assert_eq!(feedback.score, 66);
        assert_eq!(
            feedback.score_breakdown,
            Some(ScoreBreakdown {
                model_score: 80,
                keyword_score: 33
            })
        );
    }

    #[test]
    fn test_annotation_phrases_prefer_highlighted() {
        let mut feedback = ResumeFeedback::synthesized("SRE");
        feedback.strengths = vec!["Strong ownership".to_string()];
        feedback.highlighted_strengths = vec!["owned on-call rotation".to_string()];
        feedback.weaknesses = vec!["vague bullets".to_string()];

        let (strengths, weaknesses) = feedback.annotation_phrases();
        assert_eq!(strengths, ["owned on-call rotation".to_string()]);
        assert_eq!(weaknesses, ["vague bullets".to_string()]);
    }

    #[test]
    fn test_serialized_shape_omits_breakdown_until_blended() {
        let feedback = ResumeFeedback::synthesized("SRE");
        let value = serde_json::to_value(&feedback).unwrap();
        assert!(value.get("score_breakdown").is_none());
        assert_eq!(value["recovery"], "synthesized");
    }
}
