// Prompt templates for the Review API.
// The JSON-only system prompt lives in llm_client::prompts; these are the user turns.
// Templates are filled in one pass by `pipeline::fill_template`, so
// placeholder-looking text inside user input is never expanded.

/// Review prompt. Replace: {job_role}, {job_description_block}, {keywords_block},
/// {resume_text}
pub const REVIEW_PROMPT_TEMPLATE: &str = r#"You are an expert career coach with over 20 years of experience in hiring. Review the resume below for the target role: {job_role}

- Analyze structure, content, and tone.
- Call out missing skills or keywords relevant to the job, formatting or clarity problems, redundant or vague language, and ways to tailor achievements to the role.
- Score the resume out of 100.
- Provide 3 actionable improvement steps.

{job_description_block}{keywords_block}Return a JSON object with this EXACT schema (no extra fields):
{
  "summary": "short paragraph on structure, content, tone, clarity and tailoring",
  "missing_skills": ["skill expected for the role but absent"],
  "weaknesses": ["weakness"],
  "strengths": ["strength"],
  "improvements": ["actionable step"],
  "highlighted_strengths": ["exact text copied from the resume that shows a strength"],
  "highlighted_weaknesses": ["exact text copied from the resume that shows a weakness"],
  "score": 0
}

Rules:
- highlighted_strengths and highlighted_weaknesses MUST be copied character for character from the resume. Do not paraphrase them.
- score is an integer between 0 and 100.
- ONLY return JSON, no extra text.

RESUME:
{resume_text}"#;

/// Inserted into the review prompt when a job description is supplied.
pub const JOB_DESCRIPTION_BLOCK: &str = "JOB DESCRIPTION:\n{job_description}\n\n";

/// Inserted into the review prompt when keywords could be extracted from the JD.
pub const KEYWORDS_BLOCK: &str =
    "Keywords from the job description to check the resume against: {keywords}\n\n";

/// Comparison prompt. Replace: {job_role}, {job_description}, {resume_text}
pub const COMPARE_PROMPT_TEMPLATE: &str = r#"You are a professional resume reviewer. Keep the output in the same language as the resume.

Compare the resume below with the job role and job description.

Job Role: {job_role}
Job Description:
{job_description}

Return a JSON object with this EXACT schema (no extra fields):
{
  "matched_skills": ["skill in the resume that matches or is relevant"],
  "missing_skills": ["skill the job expects but the resume lacks"],
  "recommendations": ["general improvement or tailoring suggestion"]
}

Your entire response must be valid JSON only. Do not add any explanatory text.

RESUME:
{resume_text}"#;

/// Rewrite prompt. Replace: {job_role}, {improvements_block}, {resume_text}
pub const REWRITE_PROMPT_TEMPLATE: &str = r#"You are a professional resume editor. Improve the resume below by:
- Fixing weaknesses
- Applying the listed improvements
- Keeping all factual information intact
- Making the language stronger and more professional

Write the improved resume and the changes log in the same language as the original resume.

Job Role: {job_role}
{improvements_block}
Return a JSON object with this EXACT schema (no extra fields):
{
  "improved_resume": "the full improved resume text",
  "changes_log": ["one entry per change made"]
}

Escape quotes and newlines inside improved_resume so the JSON stays valid.
Respond with JSON only.

RESUME:
{resume_text}"#;
