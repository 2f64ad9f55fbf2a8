use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::document::{annotate, extract_text, DocumentError, MatchSpan};
use crate::errors::AppError;
use crate::review::comparison::ResumeComparison;
use crate::review::feedback::ResumeFeedback;
use crate::review::pipeline::{
    compare_resume, review_resume, rewrite_resume, CompareRequest, ReviewRequest, RewriteRequest,
};
use crate::review::rewrite::ImprovedResume;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub review_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Name of the backend that produced the completion.
    pub backend: String,
    pub feedback: ResumeFeedback,
    /// Present only when a PDF was uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<AnnotationPayload>,
}

#[derive(Debug, Serialize)]
pub struct AnnotationPayload {
    pub spans: Vec<MatchSpan>,
    pub pdf_base64: String,
}

/// Fields of the review form. Unknown fields are ignored.
#[derive(Debug, Default)]
struct ReviewForm {
    resume_pdf: Option<Bytes>,
    resume_text: Option<String>,
    job_role: Option<String>,
    job_description: Option<String>,
}

#[derive(Debug, Default)]
struct AnnotateForm {
    resume_pdf: Option<Bytes>,
    strengths: Vec<String>,
    weaknesses: Vec<String>,
}

/// POST /api/v1/reviews
///
/// Multipart: `resume` (PDF) or `resume_text`, `job_role`, optional
/// `job_description`. An uploaded PDF takes precedence over `resume_text`.
pub async fn handle_review(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ReviewResponse>, AppError> {
    let form = read_review_form(multipart).await?;

    let resume_text = match (&form.resume_pdf, form.resume_text) {
        (Some(pdf), _) => {
            let pdf = pdf.clone();
            run_document_task(move || extract_text(&pdf)).await?
        }
        (None, Some(text)) => text,
        (None, None) => {
            return Err(AppError::InvalidRequest(
                "either a `resume` PDF or `resume_text` is required".to_string(),
            ))
        }
    };

    let request = ReviewRequest {
        resume_text,
        job_role: form.job_role.unwrap_or_default(),
        job_description: form.job_description,
    };
    let feedback =
        review_resume(state.backend.as_ref(), &request, state.config.keyword_limit).await?;

    let annotation = match form.resume_pdf {
        Some(pdf) => annotate_feedback(pdf, &feedback).await?,
        None => None,
    };

    let review_id = Uuid::new_v4();
    info!(
        %review_id,
        score = feedback.score,
        annotated = annotation.is_some(),
        "Review complete"
    );

    Ok(Json(ReviewResponse {
        review_id,
        created_at: Utc::now(),
        backend: state.backend.name().to_string(),
        feedback,
        annotation,
    }))
}

/// POST /api/v1/reviews/annotate
///
/// Multipart: `resume` (PDF), `strengths` and `weaknesses` as JSON string
/// arrays. Responds with the highlighted PDF.
pub async fn handle_annotate(multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    let form = read_annotate_form(multipart).await?;
    let pdf = form
        .resume_pdf
        .ok_or_else(|| AppError::InvalidRequest("a `resume` PDF is required".to_string()))?;

    let (strengths, weaknesses) = (form.strengths, form.weaknesses);
    let annotated = run_document_task(move || annotate(&pdf, &strengths, &weaknesses)).await?;

    info!(spans = annotated.spans.len(), "Annotated uploaded resume");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"annotated_resume.pdf\"",
            ),
        ],
        annotated.pdf,
    ))
}

/// POST /api/v1/reviews/compare
pub async fn handle_compare(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> Result<Json<ResumeComparison>, AppError> {
    let comparison = compare_resume(state.backend.as_ref(), &req).await?;
    Ok(Json(comparison))
}

/// POST /api/v1/reviews/rewrite
pub async fn handle_rewrite(
    State(state): State<AppState>,
    Json(req): Json<RewriteRequest>,
) -> Result<Json<ImprovedResume>, AppError> {
    let improved = rewrite_resume(state.backend.as_ref(), &req).await?;
    Ok(Json(improved))
}

/// Highlights the feedback phrases in the uploaded PDF.
///
/// An annotation failure leaves the annotation out; the review still succeeds.
async fn annotate_feedback(
    pdf: Bytes,
    feedback: &ResumeFeedback,
) -> Result<Option<AnnotationPayload>, AppError> {
    let (strengths, weaknesses) = feedback.annotation_phrases();
    let (strengths, weaknesses) = (strengths.to_vec(), weaknesses.to_vec());

    let task = tokio::task::spawn_blocking(move || annotate(&pdf, &strengths, &weaknesses));
    match task.await.map_err(join_error)? {
        Ok(annotated) => Ok(Some(AnnotationPayload {
            spans: annotated.spans,
            pdf_base64: STANDARD.encode(&annotated.pdf),
        })),
        Err(e) => {
            warn!(error = %e, "Annotation failed, returning feedback without it");
            Ok(None)
        }
    }
}

/// Runs CPU-bound document work off the async runtime.
async fn run_document_task<T, F>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DocumentError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(task).await.map_err(join_error)?;
    Ok(result?)
}

fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError::Internal(anyhow::anyhow!("document task failed: {e}"))
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::InvalidRequest(format!("malformed multipart body: {e}"))
}

async fn read_review_form(mut multipart: Multipart) -> Result<ReviewForm, AppError> {
    let mut form = ReviewForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => form.resume_pdf = Some(field.bytes().await.map_err(bad_multipart)?),
            "resume_text" => form.resume_text = Some(field.text().await.map_err(bad_multipart)?),
            "job_role" => form.job_role = Some(field.text().await.map_err(bad_multipart)?),
            "job_description" => {
                form.job_description = Some(field.text().await.map_err(bad_multipart)?)
            }
            other => debug!(field = other, "Ignoring unknown multipart field"),
        }
    }
    Ok(form)
}

async fn read_annotate_form(mut multipart: Multipart) -> Result<AnnotateForm, AppError> {
    let mut form = AnnotateForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => form.resume_pdf = Some(field.bytes().await.map_err(bad_multipart)?),
            "strengths" => {
                form.strengths =
                    parse_phrase_list(&field.text().await.map_err(bad_multipart)?, "strengths")?
            }
            "weaknesses" => {
                form.weaknesses =
                    parse_phrase_list(&field.text().await.map_err(bad_multipart)?, "weaknesses")?
            }
            other => debug!(field = other, "Ignoring unknown multipart field"),
        }
    }
    Ok(form)
}

/// A JSON array of strings. A blank field counts as an empty list.
fn parse_phrase_list(raw: &str, field: &str) -> Result<Vec<String>, AppError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| {
        AppError::InvalidRequest(format!("`{field}` must be a JSON array of strings: {e}"))
    })
}
