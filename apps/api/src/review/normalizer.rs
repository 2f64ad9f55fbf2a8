//! Feedback normalizer: raw completion in, validated `ResumeFeedback` out.
//!
//! Never fails: a completion that no recovery tier can parse, or that parses but
//! violates the schema, degrades to `ResumeFeedback::synthesized`. When a job
//! description is present the model score is blended with keyword overlap.

use tracing::{info, warn};

use crate::review::feedback::ResumeFeedback;
use crate::review::keywords::keyword_score;
use crate::review::recovery::{recover_object, ParseOutcome, RecoveryTier};

pub fn normalize(
    raw_completion: &str,
    job_role: &str,
    job_description: &str,
    resume_text: &str,
) -> ResumeFeedback {
    let mut feedback = match recover_object(raw_completion) {
        ParseOutcome::Parsed { tier, record } => {
            match ResumeFeedback::from_record(&record, tier) {
                Ok(feedback) => {
                    if tier != RecoveryTier::Direct {
                        info!(?tier, "Completion recovered after direct parse failed");
                    }
                    feedback
                }
                Err(e) => {
                    warn!(?tier, "Completion parsed but failed validation ({e}); using fallback");
                    ResumeFeedback::synthesized(job_role)
                }
            }
        }
        ParseOutcome::Failed { failures } => {
            let last = failures.last();
            warn!(
                last_tier = ?last.map(|f| f.tier),
                last_reason = last.map_or("", |f| f.reason.as_str()),
                "Completion unparseable after {} tiers ({} chars); using fallback",
                failures.len(),
                raw_completion.len()
            );
            ResumeFeedback::synthesized(job_role)
        }
    };

    // Synthesized records keep the placeholder score.
    if !job_description.trim().is_empty() && feedback.recovery != RecoveryTier::Synthesized {
        let keyword = keyword_score(resume_text, job_description);
        if feedback.apply_keyword_blend(keyword) {
            info!(
                model_score = feedback.score_breakdown.map(|b| b.model_score),
                keyword_score = keyword,
                final_score = feedback.score,
                "Hybrid score applied"
            );
        }
    }

    feedback
}
