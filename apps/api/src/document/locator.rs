//! Span locator: finds feedback phrases in a page text layer.
//!
//! Matching is case-insensitive and treats any whitespace run (including a
//! synthesized line break) as a single space, so a phrase that wraps onto the
//! next line is still found. Every non-overlapping occurrence becomes one span.
//!
//! A multi-word phrase that is not found anywhere in the document falls back to
//! its significant words (longer than three characters, stopwords excluded) so
//! a paraphrase still lands near the resume wording. Within one category, a
//! span whose range equals or lies inside another span on the same page is
//! dropped, whichever phrase produced it. Latin ligatures are spelled out
//! before comparing, so `ﬁnance` matches `finance`.

use std::cmp::Reverse;

use serde::Serialize;
use tracing::debug;

use crate::document::text_layer::PageText;
use crate::document::Rect;
use crate::review::keywords::is_stopword;

/// Phrases with fewer alphanumeric characters than this are not searched.
pub const MIN_PHRASE_CHARS: usize = 3;

/// Constituent words must be longer than this to be searched on their own.
const MIN_WORD_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanCategory {
    Strength,
    Weakness,
}

impl SpanCategory {
    /// Highlight color as RGB components in 0..=1.
    pub fn color(&self) -> [f32; 3] {
        match self {
            SpanCategory::Strength => [0.0, 1.0, 0.0],
            SpanCategory::Weakness => [1.0, 0.0, 0.0],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpanCategory::Strength => "Strength",
            SpanCategory::Weakness => "Weakness",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The whole phrase was found.
    Phrase,
    /// One significant word of a multi-word phrase was found.
    Word,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSpan {
    pub source_phrase: String,
    /// 0-based.
    pub page_index: usize,
    /// Union of `line_boxes`.
    pub region: Rect,
    /// One box per visual line the match covers.
    pub line_boxes: Vec<Rect>,
    pub category: SpanCategory,
    pub kind: MatchKind,
    /// Half-open range into the page's text layer characters.
    #[serde(skip)]
    pub(crate) char_range: (usize, usize),
}

/// Locates every strength and weakness phrase across all pages.
pub fn locate_spans(pages: &[PageText], strengths: &[String], weaknesses: &[String]) -> Vec<MatchSpan> {
    let indexes: Vec<SearchIndex> = pages.iter().map(SearchIndex::build).collect();
    let mut spans = Vec::new();

    for (category, phrases) in [
        (SpanCategory::Strength, strengths),
        (SpanCategory::Weakness, weaknesses),
    ] {
        let mut seen: Vec<Vec<char>> = Vec::new();
        let mut candidates = Vec::new();
        for phrase in phrases {
            let query = normalize_query(phrase);
            if seen.contains(&query) {
                continue;
            }
            seen.push(query);

            let found = locate_phrase(pages, &indexes, phrase, category);
            if found.is_empty() {
                debug!(?category, phrase = %phrase, "Phrase not found in document");
            }
            candidates.extend(found);
        }
        spans.extend(drop_contained(candidates));
    }

    spans
}

/// Removes spans whose range equals or lies inside another span on the same
/// page. Phrase hits are kept ahead of word hits, then longer ranges ahead of
/// shorter ones. Survivors keep their search order.
fn drop_contained(candidates: Vec<MatchSpan>) -> Vec<MatchSpan> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&i| {
        let span = &candidates[i];
        (
            span.kind == MatchKind::Word,
            Reverse(span.char_range.1 - span.char_range.0),
        )
    });

    let mut kept: Vec<usize> = Vec::with_capacity(order.len());
    for i in order {
        let span = &candidates[i];
        let covered = kept.iter().any(|&k| {
            let other = &candidates[k];
            other.page_index == span.page_index
                && other.char_range.0 <= span.char_range.0
                && span.char_range.1 <= other.char_range.1
        });
        if !covered {
            kept.push(i);
        }
    }
    kept.sort_unstable();

    candidates
        .into_iter()
        .enumerate()
        .filter(|(i, _)| kept.binary_search(i).is_ok())
        .map(|(_, span)| span)
        .collect()
}

fn locate_phrase(
    pages: &[PageText],
    indexes: &[SearchIndex],
    phrase: &str,
    category: SpanCategory,
) -> Vec<MatchSpan> {
    if effective_len(phrase) < MIN_PHRASE_CHARS {
        debug!(phrase = %phrase, "Phrase too short to search");
        return Vec::new();
    }

    let mut spans = Vec::new();
    let phrase_query = normalize_query(phrase);
    for (page, index) in pages.iter().zip(indexes) {
        for range in index.find_all(&phrase_query) {
            if let Some(span) = build_span(page, range, phrase, category, MatchKind::Phrase) {
                spans.push(span);
            }
        }
    }
    if !spans.is_empty() {
        return spans;
    }

    for word in significant_words(phrase) {
        let word_query = normalize_query(&word);
        for (page, index) in pages.iter().zip(indexes) {
            for range in index.find_all(&word_query) {
                if let Some(span) = build_span(page, range, phrase, category, MatchKind::Word) {
                    spans.push(span);
                }
            }
        }
    }
    if !spans.is_empty() {
        debug!(phrase = %phrase, words = spans.len(), "Phrase absent, using word hits");
    }

    spans
}

fn build_span(
    page: &PageText,
    range: (usize, usize),
    phrase: &str,
    category: SpanCategory,
    kind: MatchKind,
) -> Option<MatchSpan> {
    let boxes = page.chars[range.0..range.1].iter().filter_map(|c| c.bbox);
    let line_boxes = group_lines(boxes);
    let region = line_boxes
        .iter()
        .copied()
        .reduce(|acc, b| acc.union(&b))?;

    Some(MatchSpan {
        source_phrase: phrase.to_string(),
        page_index: page.page_index,
        region,
        line_boxes,
        category,
        kind,
        char_range: range,
    })
}

/// Merges consecutive glyph boxes that share a baseline band into line boxes.
fn group_lines(boxes: impl Iterator<Item = Rect>) -> Vec<Rect> {
    let mut lines: Vec<Rect> = Vec::new();
    for bbox in boxes {
        match lines.last_mut() {
            Some(line) if (bbox.center_y() - line.center_y()).abs() <= line.height() / 2.0 => {
                *line = line.union(&bbox);
            }
            _ => lines.push(bbox),
        }
    }
    lines
}

fn effective_len(phrase: &str) -> usize {
    phrase.chars().filter(|c| c.is_alphanumeric()).count()
}

/// Distinct words of a multi-word phrase worth searching on their own.
fn significant_words(phrase: &str) -> Vec<String> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() < 2 {
        return Vec::new();
    }

    let mut out: Vec<String> = Vec::new();
    for word in words {
        let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
        let lower = trimmed.to_lowercase();
        if trimmed.chars().count() > MIN_WORD_CHARS
            && !is_stopword(&lower)
            && !out.iter().any(|w| w.to_lowercase() == lower)
        {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Lower-cased, whitespace runs collapsed to one space, trimmed.
fn normalize_query(text: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_whitespace() {
            if out.last().is_some_and(|c| *c != ' ') {
                out.push(' ');
            }
        } else {
            fold_char(ch, |c| out.push(c));
        }
    }
    if out.last() == Some(&' ') {
        out.pop();
    }
    out
}

/// Lower-cases one char, spelling out the Latin ligatures U+FB00..=U+FB06.
fn fold_char(ch: char, mut push: impl FnMut(char)) {
    let letters = match ch {
        '\u{FB00}' => "ff",
        '\u{FB01}' => "fi",
        '\u{FB02}' => "fl",
        '\u{FB03}' => "ffi",
        '\u{FB04}' => "ffl",
        '\u{FB05}' | '\u{FB06}' => "st",
        _ => {
            ch.to_lowercase().for_each(push);
            return;
        }
    };
    letters.chars().for_each(&mut push);
}

/// A page's text folded the same way as queries, with a map back to the
/// original character positions.
struct SearchIndex {
    folded: Vec<char>,
    origin: Vec<usize>,
}

impl SearchIndex {
    fn build(page: &PageText) -> Self {
        let mut folded = Vec::with_capacity(page.chars.len());
        let mut origin = Vec::with_capacity(page.chars.len());
        for (i, c) in page.chars.iter().enumerate() {
            if c.ch.is_whitespace() {
                if folded.last().is_some_and(|last| *last != ' ') {
                    folded.push(' ');
                    origin.push(i);
                }
            } else {
                fold_char(c.ch, |folded_ch| {
                    folded.push(folded_ch);
                    origin.push(i);
                });
            }
        }
        Self { folded, origin }
    }

    /// Non-overlapping occurrences, as half-open ranges of original positions.
    fn find_all(&self, needle: &[char]) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        if needle.is_empty() || needle.len() > self.folded.len() {
            return ranges;
        }
        let mut i = 0;
        while i + needle.len() <= self.folded.len() {
            if self.folded[i..i + needle.len()] == *needle {
                let start = self.origin[i];
                let end = self.origin[i + needle.len() - 1] + 1;
                ranges.push((start, end));
                i += needle.len();
            } else {
                i += 1;
            }
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use crate::document::fixtures::{text_pdf, text_pdf_with_font};
    use crate::document::load_document;
    use crate::document::text_layer::{build_text_layer, TextChar};

    fn pages_of(bytes: &[u8]) -> Vec<PageText> {
        build_text_layer(&load_document(bytes).unwrap()).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// A synthetic one-line page: each char is 10 wide, 10 tall.
    fn synthetic_page(text: &str) -> PageText {
        PageText {
            page_index: 0,
            chars: text
                .chars()
                .enumerate()
                .map(|(i, ch)| TextChar {
                    ch,
                    bbox: Some(Rect::new(i as f64 * 10.0, 0.0, i as f64 * 10.0 + 10.0, 10.0)),
                })
                .collect(),
        }
    }

    #[test]
    fn test_phrase_on_second_page_yields_one_span() {
        let bytes = text_pdf(&[
            &[(72.0, 700.0, "Jane Doe"), (72.0, 680.0, "Backend developer")],
            &[
                (72.0, 700.0, "Experience"),
                (72.0, 680.0, "Led a team of 5 engineers at Acme"),
            ],
        ]);
        let spans = locate_spans(&pages_of(&bytes), &strings(&["led a team of 5 engineers"]), &[]);

        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        assert_eq!(span.page_index, 1);
        assert_eq!(span.kind, MatchKind::Phrase);
        assert_eq!(span.category, SpanCategory::Strength);
        assert_eq!(span.source_phrase, "led a team of 5 engineers");
        assert_eq!(span.line_boxes.len(), 1);
        assert!((span.region.x0 - 72.0).abs() < 1e-3);
        assert!(span.region.y0 < 680.0 && span.region.y1 > 680.0);
    }

    #[test]
    fn test_phrase_twice_yields_two_spans() {
        let bytes = text_pdf(&[&[
            (72.0, 700.0, "Python developer"),
            (72.0, 650.0, "Shipped Python services"),
        ]]);
        let spans = locate_spans(&pages_of(&bytes), &strings(&["python"]), &[]);
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| s.kind == MatchKind::Phrase));
        assert!(spans[0].region.y0 > spans[1].region.y0);
    }

    #[test]
    fn test_search_ignores_case_and_whitespace_runs() {
        let page = synthetic_page("Reduced   latency by\t40%");
        let spans = locate_spans(&[page], &[], &strings(&["REDUCED LATENCY  by 40%"]));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].category, SpanCategory::Weakness);
        assert_eq!(spans[0].char_range, (0, 24));
    }

    #[test]
    fn test_phrase_across_lines_gets_one_box_per_line() {
        let bytes = text_pdf(&[&[
            (72.0, 700.0, "Migrated the billing"),
            (72.0, 686.0, "platform to Kubernetes"),
        ]]);
        let spans = locate_spans(
            &pages_of(&bytes),
            &strings(&["billing platform"]),
            &[],
        );
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].line_boxes.len(), 2);
        let union = spans[0].line_boxes[0].union(&spans[0].line_boxes[1]);
        assert_eq!(spans[0].region, union);
    }

    #[test]
    fn test_short_phrases_are_skipped() {
        let page = synthetic_page("Go, C, and R developer");
        let spans = locate_spans(&[page], &strings(&["Go", "C.", "  "]), &[]);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_word_hits_cover_paraphrases() {
        let page = synthetic_page("Managed Kubernetes clusters for payments");
        let spans = locate_spans(&[page], &strings(&["Kubernetes cluster administration"]), &[]);

        // No full-phrase hit; "kubernetes" and "cluster" land, "administration" does not.
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| s.kind == MatchKind::Word));
        assert!(spans
            .iter()
            .all(|s| s.source_phrase == "Kubernetes cluster administration"));
    }

    #[test]
    fn test_words_are_not_searched_when_phrase_is_found() {
        let page = synthetic_page("Built data pipelines. Owned data quality.");
        let spans = locate_spans(&[page], &strings(&["built data pipelines"]), &[]);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, MatchKind::Phrase);
        assert_eq!(spans[0].char_range, (0, 20));
    }

    #[test]
    fn test_repeated_phrase_ignores_word_elsewhere() {
        let bytes = text_pdf(&[&[
            (72.0, 700.0, "Led a team of 5 engineers"),
            (72.0, 680.0, "Hiring engineers"),
            (72.0, 660.0, "Led a team of 5 engineers"),
        ]]);
        let pages = pages_of(&bytes);

        let spans = locate_spans(&pages, &strings(&["Led a team of 5 engineers"]), &[]);
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| s.kind == MatchKind::Phrase));

        let once = text_pdf(&[&[
            (72.0, 700.0, "Led a team of 5 engineers"),
            (72.0, 680.0, "Hiring engineers"),
        ]]);
        let spans = locate_spans(&pages_of(&once), &strings(&["led a team of 5 engineers"]), &[]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, MatchKind::Phrase);
    }

    #[test]
    fn test_contained_hits_across_phrases_are_dropped() {
        let page = synthetic_page("Python developer. Shipped Python services.");
        let spans = locate_spans(&[page], &strings(&["Python", "Python services"]), &[]);

        let ranges: Vec<(usize, usize)> = spans.iter().map(|s| s.char_range).collect();
        assert_eq!(ranges, vec![(0, 6), (26, 41)]);
        assert_eq!(spans[0].source_phrase, "Python");
        assert_eq!(spans[1].source_phrase, "Python services");
        for (i, a) in spans.iter().enumerate() {
            for b in &spans[i + 1..] {
                let nested = (a.char_range.0 <= b.char_range.0 && b.char_range.1 <= a.char_range.1)
                    || (b.char_range.0 <= a.char_range.0 && a.char_range.1 <= b.char_range.1);
                assert!(!nested);
            }
        }
    }

    #[test]
    fn test_word_hits_yield_to_phrase_hits_of_other_phrases() {
        let page = synthetic_page("Deployed Kubernetes clusters");
        let spans = locate_spans(
            &[page],
            &strings(&["Kubernetes migration lead", "Kubernetes clusters"]),
            &[],
        );
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, MatchKind::Phrase);
        assert_eq!(spans[0].source_phrase, "Kubernetes clusters");
    }

    #[test]
    fn test_ligature_glyph_matches_plain_letters() {
        let page = synthetic_page("Corporate \u{FB01}nance analyst");
        let spans = locate_spans(&[page], &strings(&["Corporate finance analyst"]), &[]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, MatchKind::Phrase);
        assert_eq!(spans[0].char_range, (0, 24));

        let page = synthetic_page("Corporate finance analyst");
        let spans = locate_spans(&[page], &strings(&["Corporate \u{FB01}nance"]), &[]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].char_range, (0, 17));
    }

    #[test]
    fn test_differences_ligature_in_pdf_is_found() {
        let font = lopdf::dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => lopdf::dictionary! {
                "Type" => "Encoding",
                "BaseEncoding" => "WinAnsiEncoding",
                "Differences" => vec![12.into(), lopdf::Object::Name(b"fi".to_vec())],
            },
        };
        let bytes = text_pdf_with_font(font, &[(72.0, 700.0, "Corporate \u{0C}nance analyst")]);
        let spans = locate_spans(&pages_of(&bytes), &strings(&["Corporate finance analyst"]), &[]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, MatchKind::Phrase);
    }

    #[test]
    fn test_cross_category_duplicates_are_kept() {
        let page = synthetic_page("Extensive freelance work");
        let both = strings(&["freelance work"]);
        let spans = locate_spans(&[page], &both, &both);
        let strengths = spans
            .iter()
            .filter(|s| s.category == SpanCategory::Strength)
            .count();
        let weaknesses = spans
            .iter()
            .filter(|s| s.category == SpanCategory::Weakness)
            .count();
        assert_eq!(strengths, 1);
        assert_eq!(weaknesses, 1);
    }

    #[test]
    fn test_repeated_phrase_in_one_category_is_searched_once() {
        let page = synthetic_page("Mentored interns");
        let spans = locate_spans(&[page], &strings(&["mentored interns", "Mentored  Interns"]), &[]);
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_missing_phrase_yields_nothing() {
        let page = synthetic_page("Mentored interns");
        assert!(locate_spans(&[page], &strings(&["quantum computing"]), &[]).is_empty());
    }

    #[test]
    fn test_significant_words_filter() {
        assert_eq!(
            significant_words("Led a team of 5 engineers, with the team"),
            vec!["team", "engineers"]
        );
        assert!(significant_words("Kubernetes").is_empty());
    }
}
