//! Rewritten resume text with a log of what changed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::review::feedback::coerce_string_list;
use crate::review::recovery::{recover_object, ParseOutcome, RecoveryTier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovedResume {
    pub improved_resume: String,
    pub changes_log: Vec<String>,
    pub recovery: RecoveryTier,
}

impl ImprovedResume {
    /// `None` when the record has no usable `improved_resume` text.
    pub fn from_record(record: &Map<String, Value>, tier: RecoveryTier) -> Option<Self> {
        let improved_resume = record
            .get("improved_resume")
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())?
            .to_string();

        Some(Self {
            improved_resume,
            changes_log: coerce_string_list(record.get("changes_log")),
            recovery: tier,
        })
    }

    /// Fallback: the original text, unchanged, with an empty log.
    pub fn unchanged(original: &str) -> Self {
        Self {
            improved_resume: original.to_string(),
            changes_log: Vec::new(),
            recovery: RecoveryTier::Synthesized,
        }
    }

    pub fn from_completion(raw: &str, original: &str) -> Self {
        match recover_object(raw) {
            ParseOutcome::Parsed { tier, record } => Self::from_record(&record, tier)
                .unwrap_or_else(|| {
                    warn!(?tier, "Rewrite completion has no improved_resume text; keeping original");
                    Self::unchanged(original)
                }),
            ParseOutcome::Failed { failures } => {
                warn!(
                    "Rewrite completion unparseable after {} tiers; keeping original",
                    failures.len()
                );
                Self::unchanged(original)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &str = "Helped with projects.";

    #[test]
    fn test_rewrite_parses_repaired_output() {
        let raw = "{'improved_resume': 'Delivered 4 projects on schedule.', \
                   'changes_log': ['Quantified impact',],}";
        let improved = ImprovedResume::from_completion(raw, ORIGINAL);
        assert_eq!(improved.improved_resume, "Delivered 4 projects on schedule.");
        assert_eq!(improved.changes_log, vec!["Quantified impact"]);
        assert_eq!(improved.recovery, RecoveryTier::Repaired);
    }

    #[test]
    fn test_rewrite_blank_text_keeps_original() {
        let raw = r#"{"improved_resume": "  ", "changes_log": ["nothing"]}"#;
        let improved = ImprovedResume::from_completion(raw, ORIGINAL);
        assert_eq!(improved, ImprovedResume::unchanged(ORIGINAL));
    }

    #[test]
    fn test_rewrite_garbage_keeps_original() {
        let improved = ImprovedResume::from_completion("no json here", ORIGINAL);
        assert_eq!(improved.improved_resume, ORIGINAL);
        assert!(improved.changes_log.is_empty());
        assert_eq!(improved.recovery, RecoveryTier::Synthesized);
    }
}
