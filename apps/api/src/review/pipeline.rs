//! Review pipeline: validate, build the prompt, call the backend, normalize.
//!
//! Flow: validate → extract JD keywords → fill prompt → backend.complete →
//!       normalize (recovery chain + coercion + hybrid score).
//!
//! Validation runs before any backend call. Backend failures surface as
//! `GenerationUnavailable`; malformed completions never do.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::CompletionBackend;
use crate::review::comparison::ResumeComparison;
use crate::review::feedback::ResumeFeedback;
use crate::review::keywords::extract_keywords;
use crate::review::normalizer::normalize;
use crate::review::prompts::{
    COMPARE_PROMPT_TEMPLATE, JOB_DESCRIPTION_BLOCK, KEYWORDS_BLOCK, REVIEW_PROMPT_TEMPLATE,
    REWRITE_PROMPT_TEMPLATE,
};
use crate::review::rewrite::ImprovedResume;

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub resume_text: String,
    pub job_role: String,
    #[serde(default)]
    pub job_description: Option<String>,
}

impl ReviewRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.resume_text, "resume text")?;
        require_non_empty(&self.job_role, "job_role")
    }

    /// The job description, or `""` when absent or blank.
    pub fn job_description(&self) -> &str {
        self.job_description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareRequest {
    pub resume_text: String,
    pub job_role: String,
    pub job_description: String,
}

impl CompareRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.resume_text, "resume_text")?;
        require_non_empty(&self.job_role, "job_role")?;
        require_non_empty(&self.job_description, "job_description")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewriteRequest {
    pub resume_text: String,
    pub job_role: String,
    #[serde(default)]
    pub improvements: Vec<String>,
}

impl RewriteRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.resume_text, "resume_text")?;
        require_non_empty(&self.job_role, "job_role")
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidRequest(format!("{field} cannot be empty")));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Pipelines
// ────────────────────────────────────────────────────────────────────────────

/// Produces validated feedback for one resume.
pub async fn review_resume(
    backend: &dyn CompletionBackend,
    request: &ReviewRequest,
    keyword_limit: usize,
) -> Result<ResumeFeedback, AppError> {
    request.validate()?;

    let prompt = build_review_prompt(request, keyword_limit);
    info!(
        backend = backend.name(),
        job_role = %request.job_role.trim(),
        has_job_description = !request.job_description().is_empty(),
        "Requesting resume review"
    );

    let raw = backend.complete(&prompt).await?;
    let feedback = normalize(
        &raw,
        request.job_role.trim(),
        request.job_description(),
        &request.resume_text,
    );

    info!(
        score = feedback.score,
        recovery = ?feedback.recovery,
        strengths = feedback.strengths.len(),
        weaknesses = feedback.weaknesses.len(),
        "Review normalized"
    );
    Ok(feedback)
}

pub async fn compare_resume(
    backend: &dyn CompletionBackend,
    request: &CompareRequest,
) -> Result<ResumeComparison, AppError> {
    request.validate()?;

    let prompt = fill_template(
        COMPARE_PROMPT_TEMPLATE,
        &[
            ("job_role", request.job_role.trim()),
            ("job_description", request.job_description.trim()),
            ("resume_text", &request.resume_text),
        ],
    );

    info!(backend = backend.name(), "Requesting resume comparison");
    let raw = backend.complete(&prompt).await?;
    Ok(ResumeComparison::from_completion(&raw))
}

pub async fn rewrite_resume(
    backend: &dyn CompletionBackend,
    request: &RewriteRequest,
) -> Result<ImprovedResume, AppError> {
    request.validate()?;

    let improvements: Vec<&str> = request
        .improvements
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    let improvements_block = if improvements.is_empty() {
        String::new()
    } else {
        format!("Improvements to apply:\n- {}\n", improvements.join("\n- "))
    };

    let prompt = fill_template(
        REWRITE_PROMPT_TEMPLATE,
        &[
            ("job_role", request.job_role.trim()),
            ("improvements_block", &improvements_block),
            ("resume_text", &request.resume_text),
        ],
    );

    info!(
        backend = backend.name(),
        improvements = improvements.len(),
        "Requesting resume rewrite"
    );
    let raw = backend.complete(&prompt).await?;
    Ok(ImprovedResume::from_completion(&raw, &request.resume_text))
}

fn build_review_prompt(request: &ReviewRequest, keyword_limit: usize) -> String {
    let job_description = request.job_description();

    let (jd_block, keywords_block) = if job_description.is_empty() {
        (String::new(), String::new())
    } else {
        let keywords = extract_keywords(job_description, keyword_limit);
        let keywords_block = if keywords.is_empty() {
            String::new()
        } else {
            fill_template(KEYWORDS_BLOCK, &[("keywords", &keywords.join(", "))])
        };
        (
            fill_template(JOB_DESCRIPTION_BLOCK, &[("job_description", job_description)]),
            keywords_block,
        )
    };

    fill_template(
        REVIEW_PROMPT_TEMPLATE,
        &[
            ("job_role", request.job_role.trim()),
            ("job_description_block", &jd_block),
            ("keywords_block", &keywords_block),
            ("resume_text", &request.resume_text),
        ],
    )
}

/// Substitutes `{name}` placeholders in a single left-to-right pass.
///
/// Inserted values are never rescanned, so user text that happens to contain
/// `{resume_text}` stays literal. Unknown placeholders and the JSON braces in
/// the schema examples are copied through unchanged.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match hit {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
