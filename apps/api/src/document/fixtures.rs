//! Small hand-built PDFs for document tests.
//!
//! Pages are US Letter with a single font resource `/F1`, Helvetica/WinAnsi
//! unless a test supplies its own font dictionary.
//! Each text run is `(x, y, text)` drawn at 12pt with its own `BT ... ET`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

pub(crate) const FONT_SIZE: f64 = 12.0;

pub(crate) type TextRun<'a> = (f64, f64, &'a str);

/// How a page carries a pre-existing annotation, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExistingAnnots {
    None,
    /// `/Annots [ 12 0 R ]` directly in the page dictionary.
    DirectArray,
    /// `/Annots 13 0 R` pointing at an array object.
    IndirectArray,
}

pub(crate) fn text_pdf(pages: &[&[TextRun]]) -> Vec<u8> {
    text_pdf_with_annots(pages, ExistingAnnots::None)
}

pub(crate) fn text_pdf_with_annots(pages: &[&[TextRun]], annots: ExistingAnnots) -> Vec<u8> {
    build(
        pages.iter().map(|runs| show_runs(runs)).collect(),
        helvetica(),
        annots,
    )
}

/// One page whose `/F1` is the given font dictionary instead of Helvetica.
pub(crate) fn text_pdf_with_font(font: Dictionary, runs: &[TextRun]) -> Vec<u8> {
    build(vec![show_runs(runs)], font, ExistingAnnots::None)
}

/// A single page built from explicit content-stream operations, for text-state tests.
pub(crate) fn pdf_from_operations(operations: Vec<Operation>) -> Vec<u8> {
    build(vec![operations], helvetica(), ExistingAnnots::None)
}

fn show_runs(runs: &[TextRun]) -> Vec<Operation> {
    let mut ops = Vec::new();
    for &(x, y, text) in runs {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec!["F1".into(), Object::Real(FONT_SIZE as _)],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Real(x as _), Object::Real(y as _)],
        ));
        ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

fn helvetica() -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    }
}

fn build(page_operations: Vec<Vec<Operation>>, font: Dictionary, annots: ExistingAnnots) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let font_id = doc.add_object(font);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in page_operations {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("fixture content encodes"),
        ));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        if annots != ExistingAnnots::None {
            let note_id = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Text",
                "Rect" => vec![10.into(), 10.into(), 30.into(), 30.into()],
                "Contents" => Object::string_literal("reviewer note"),
            });
            let array = Object::Array(vec![note_id.into()]);
            match annots {
                ExistingAnnots::DirectArray => page.set("Annots", array),
                ExistingAnnots::IndirectArray => {
                    let array_id = doc.add_object(array);
                    page.set("Annots", array_id);
                }
                ExistingAnnots::None => {}
            }
        }
        kids.push(doc.add_object(page).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}
