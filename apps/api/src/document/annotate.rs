//! Writes located spans back into the PDF as highlight annotations.
//!
//! Only annotation objects are added: page content streams, fonts and the page
//! tree stay as they were, so text extraction gives the same result before and
//! after annotation.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, info};

use super::locator::{locate_spans, MatchSpan};
use super::text_layer::build_text_layer;
use super::{load_document, page_ids, DocumentError, Rect};

/// Author shown on every highlight (`/T`).
pub const AUTHOR_LABEL: &str = "Resume Review";

const HIGHLIGHT_OPACITY: f32 = 0.4;

/// Annotation flag: print.
const FLAG_PRINT: i64 = 4;

#[derive(Debug, Clone)]
pub struct AnnotatedDocument {
    pub pdf: Vec<u8>,
    pub spans: Vec<MatchSpan>,
}

/// Highlights strengths in green and weaknesses in red.
///
/// Unparseable input is rejected before anything is written. When nothing
/// matches, the original bytes are returned as-is.
pub fn annotate(
    pdf_bytes: &[u8],
    strengths: &[String],
    weaknesses: &[String],
) -> Result<AnnotatedDocument, DocumentError> {
    let mut doc = load_document(pdf_bytes)?;
    let pages = build_text_layer(&doc)?;
    let spans = locate_spans(&pages, strengths, weaknesses);

    if spans.is_empty() {
        debug!("No feedback phrases located, returning document unchanged");
        return Ok(AnnotatedDocument {
            pdf: pdf_bytes.to_vec(),
            spans,
        });
    }

    let ids = page_ids(&doc);
    for span in &spans {
        let Some(&page_id) = ids.get(span.page_index) else {
            continue;
        };
        let annot_id = add_highlight(&mut doc, page_id, span)?;
        append_annotation(&mut doc, page_id, annot_id)?;
    }

    let mut pdf = Vec::new();
    doc.save_to(&mut pdf)
        .map_err(|e| DocumentError::Write(format!("failed to write annotated PDF: {e}")))?;

    info!(spans = spans.len(), bytes = pdf.len(), "Annotated resume PDF");
    Ok(AnnotatedDocument { pdf, spans })
}

fn add_highlight(
    doc: &mut Document,
    page_id: ObjectId,
    span: &MatchSpan,
) -> Result<ObjectId, DocumentError> {
    let color: Vec<Object> = span
        .category
        .color()
        .iter()
        .map(|c| Object::Real(*c as _))
        .collect();

    let quad_points: Vec<Object> = span
        .line_boxes
        .iter()
        .flat_map(|b| [b.x0, b.y1, b.x1, b.y1, b.x0, b.y0, b.x1, b.y0])
        .map(|v| Object::Real(v as _))
        .collect();

    let appearance_id = add_appearance(doc, span)?;

    Ok(doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Highlight",
        "Rect" => rect_array(&span.region),
        "QuadPoints" => quad_points,
        "C" => color,
        "CA" => Object::Real(HIGHLIGHT_OPACITY as _),
        "Contents" => text_string(&span.source_phrase),
        "T" => text_string(AUTHOR_LABEL),
        "Subj" => text_string(span.category.label()),
        "F" => FLAG_PRINT,
        "P" => page_id,
        "AP" => dictionary! { "N" => appearance_id },
    }))
}

/// Normal appearance: the line boxes filled with the highlight color,
/// multiplied over the page so the text stays readable.
fn add_appearance(doc: &mut Document, span: &MatchSpan) -> Result<ObjectId, DocumentError> {
    let [r, g, b] = span.category.color();

    let mut operations = vec![
        Operation::new("gs", vec!["GS0".into()]),
        Operation::new(
            "rg",
            vec![Object::Real(r as _), Object::Real(g as _), Object::Real(b as _)],
        ),
    ];
    for line in &span.line_boxes {
        operations.push(Operation::new(
            "re",
            vec![
                Object::Real(line.x0 as _),
                Object::Real(line.y0 as _),
                Object::Real(line.width() as _),
                Object::Real(line.height() as _),
            ],
        ));
        operations.push(Operation::new("f", vec![]));
    }
    let content = Content { operations }
        .encode()
        .map_err(|e| DocumentError::Write(format!("failed to encode appearance stream: {e}")))?;

    let form = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => rect_array(&span.region),
        "Resources" => dictionary! {
            "ExtGState" => dictionary! {
                "GS0" => dictionary! {
                    "Type" => "ExtGState",
                    "BM" => "Multiply",
                    "CA" => Object::Real(HIGHLIGHT_OPACITY as _),
                    "ca" => Object::Real(HIGHLIGHT_OPACITY as _),
                },
            },
        },
    };
    Ok(doc.add_object(Stream::new(form, content)))
}

/// Adds `annot_id` to the page's `/Annots`, keeping whatever is already there.
/// The array may live in the page dictionary or behind a reference.
fn append_annotation(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), DocumentError> {
    let existing = page_dict(doc, page_id)?.get(b"Annots").ok().cloned();

    let annots = match existing {
        Some(Object::Reference(array_id)) => {
            if let Ok(Object::Array(items)) = doc.get_object_mut(array_id) {
                items.push(annot_id.into());
                return Ok(());
            }
            debug!(?array_id, "Page /Annots reference is not an array, replacing");
            vec![annot_id.into()]
        }
        Some(Object::Array(mut items)) => {
            items.push(annot_id.into());
            items
        }
        _ => vec![annot_id.into()],
    };

    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| DocumentError::Write(format!("page {page_id:?} is not a dictionary: {e}")))?
        .set("Annots", annots);
    Ok(())
}

fn page_dict(doc: &Document, page_id: ObjectId) -> Result<&Dictionary, DocumentError> {
    doc.get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| DocumentError::Write(format!("page {page_id:?} is not a dictionary: {e}")))
}

fn rect_array(rect: &Rect) -> Vec<Object> {
    [rect.x0, rect.y0, rect.x1, rect.y1]
        .into_iter()
        .map(|v| Object::Real(v as _))
        .collect()
}

/// PDF text string: a literal for ASCII, UTF-16BE with a byte order mark otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
