//! Keyword overlap: the objective half of the hybrid score, plus keyword
//! extraction for prompt construction.
//!
//! Pure, deterministic, no LLM call.
//!
//! Scoring:
//! 1. word sets of resume and JD (`\b\w+\b`, lower-cased, stoplist removed)
//! 2. keyword_score = round(100 × |resume ∩ jd| / |jd|), 0 when the JD set is empty
//! 3. final = round(0.7 × model_score + 0.3 × keyword_score), clamped to 0..=100
//!
//! Rounding is half-up and done in integer arithmetic so identical inputs always
//! give identical scores.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Weight of the model's own score, in tenths.
const MODEL_WEIGHT_TENTHS: u32 = 7;
/// Weight of the keyword-overlap score, in tenths.
const KEYWORD_WEIGHT_TENTHS: u32 = 3;

/// Extracted keywords must be longer than this many characters.
const MIN_KEYWORD_CHARS: usize = 3;

/// Common English function words and job-posting boilerplate.
pub const STOPWORDS: &[&str] = &[
    // job-posting boilerplate
    "the", "and", "with", "for", "this", "that", "from", "your", "role", "job", "position",
    "description", "responsibilities", "requirements", "required", "preferred", "candidate",
    "ideal", "about",
    // function words
    "a", "an", "are", "as", "at", "be", "by", "in", "is", "it", "of", "on", "or", "to", "we",
    "you", "our", "will", "who", "have", "has", "can", "all", "any", "into", "other", "their",
    "they", "them", "these", "those", "such", "than", "then", "there", "what", "when",
    "where", "which", "while", "also", "etc",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"));

static ALPHA_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Alphabetic}+").expect("alphabetic pattern is valid"));

pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}

/// Lower-cased word set with stopwords removed.
pub fn word_set(text: &str) -> HashSet<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| !is_stopword(w))
        .collect()
}

/// Percentage of JD words that also appear in the resume, rounded half-up.
pub fn keyword_score(resume_text: &str, job_description: &str) -> u8 {
    let jd_words = word_set(job_description);
    if jd_words.is_empty() {
        return 0;
    }
    let resume_words = word_set(resume_text);
    let overlap = jd_words.intersection(&resume_words).count();
    let total = jd_words.len();

    // round(100 * overlap / total) == (200 * overlap + total) / (2 * total)
    ((200 * overlap + total) / (2 * total)).min(100) as u8
}

/// round(0.7 × model + 0.3 × keyword), clamped to 0..=100.
pub fn blend_scores(model_score: u8, keyword_score: u8) -> u8 {
    let tenths = MODEL_WEIGHT_TENTHS * u32::from(model_score)
        + KEYWORD_WEIGHT_TENTHS * u32::from(keyword_score);
    ((tenths + 5) / 10).min(100) as u8
}

/// Keywords for the review prompt: alphabetic runs, lower-cased, longer than three
/// characters, not stopwords, first-seen order, at most `limit`.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    ALPHA_RUN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.chars().count() > MIN_KEYWORD_CHARS && !is_stopword(w))
        .filter(|w| seen.insert(w.clone()))
        .take(limit)
        .collect()
}
