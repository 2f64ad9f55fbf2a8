//! Resume vs. job description comparison record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::review::feedback::coerce_string_list;
use crate::review::recovery::{recover_object, ParseOutcome, RecoveryTier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeComparison {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<String>,
    pub recovery: RecoveryTier,
}

impl ResumeComparison {
    pub fn from_record(record: &Map<String, Value>, tier: RecoveryTier) -> Self {
        Self {
            matched_skills: coerce_string_list(record.get("matched_skills")),
            missing_skills: coerce_string_list(record.get("missing_skills")),
            recommendations: coerce_string_list(record.get("recommendations")),
            recovery: tier,
        }
    }

    pub fn synthesized() -> Self {
        Self {
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            recommendations: Vec::new(),
            recovery: RecoveryTier::Synthesized,
        }
    }

    /// Same recovery chain as review feedback. Every field is a list, so any
    /// recovered object is acceptable.
    pub fn from_completion(raw: &str) -> Self {
        match recover_object(raw) {
            ParseOutcome::Parsed { tier, record } => Self::from_record(&record, tier),
            ParseOutcome::Failed { failures } => {
                warn!(
                    "Comparison completion unparseable after {} tiers; returning empty comparison",
                    failures.len()
                );
                Self::synthesized()
            }
        }
    }
}
