//! Document layer: plain text extraction, a positional text layer, phrase
//! location, and highlight annotation for PDF resumes.
//!
//! Everything here is synchronous and CPU-bound. Async callers must run it
//! inside `tokio::task::spawn_blocking`.

use lopdf::{Document, Object, ObjectId};
use serde::Serialize;
use thiserror::Error;

pub mod annotate;
pub mod extract;
pub mod font;
pub mod font_metrics;
pub mod locator;
pub mod text_layer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use annotate::annotate;
pub use extract::extract_text;
pub use locator::MatchSpan;

#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input is not a PDF we can read. No partial output is produced.
    #[error("{0}")]
    Format(String),

    #[error("{0}")]
    Write(String),
}

/// Axis-aligned rectangle in PDF user space (origin bottom-left, points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Smallest rectangle containing every point.
    pub fn bounding(points: &[(f64, f64)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut rect = Rect::new(first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            rect.x0 = rect.x0.min(x);
            rect.y0 = rect.y0.min(y);
            rect.x1 = rect.x1.max(x);
            rect.y1 = rect.y1.max(y);
        }
        Some(rect)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// lopdf helpers shared by the submodules
// ────────────────────────────────────────────────────────────────────────────

/// Parses PDF bytes, rejecting anything lopdf cannot load or that has no pages.
pub(crate) fn load_document(bytes: &[u8]) -> Result<Document, DocumentError> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| DocumentError::Format(format!("failed to parse PDF: {e}")))?;
    if doc.get_pages().is_empty() {
        return Err(DocumentError::Format("PDF has no pages".to_string()));
    }
    Ok(doc)
}

/// Page object ids in page order (index 0 = first page).
pub(crate) fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Follows indirect references until a direct object is reached.
/// Dangling references resolve to `None`.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    // Bounded so a reference cycle cannot loop forever.
    for _ in 0..8 {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Looks up `key` in `dict` and resolves the value.
pub(crate) fn dict_get<'a>(
    doc: &'a Document,
    dict: &'a lopdf::Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    resolve(doc, dict.get(key).ok()?)
}

pub(crate) fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

/// Walks the page tree upwards for an inheritable attribute such as `/Resources`.
pub(crate) fn inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..32 {
        if let Some(value) = dict_get(doc, node, key) {
            return Some(value);
        }
        let parent = dict_get(doc, node, b"Parent")?;
        node = parent.as_dict().ok()?;
    }
    None
}
