//! Positional text layer: every character a page shows, with its bounding box.
//!
//! Built by interpreting each page's content stream with a small text-state
//! machine:
//! - graphics state: `q`, `Q`, `cm` (and form XObjects via `Do`)
//! - text objects: `BT`, `ET`
//! - text state: `Tf`, `Tc`, `Tw`, `Tz`, `TL`, `Ts`
//! - positioning: `Td`, `TD`, `Tm`, `T*`
//! - showing: `Tj`, `TJ`, `'`, `"`
//!
//! Glyph boxes span from 0.2 em below the baseline to 0.8 em above it, shifted
//! by the text rise. Word gaps and line changes that the stream expresses only
//! through positioning become synthesized `' '` / `'\n'` characters without a box.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use crate::document::font::PdfFont;
use crate::document::{as_number, dict_get, inherited, page_ids, DocumentError, Rect};

/// Glyph box extent relative to the baseline, in text space units.
const GLYPH_DESCENT: f64 = 0.2;
const GLYPH_ASCENT: f64 = 0.8;

/// A horizontal gap wider than this fraction of the font size reads as a word break.
const WORD_GAP_RATIO: f64 = 0.15;
/// A baseline shift larger than this fraction of the font size reads as a new line.
const LINE_SHIFT_RATIO: f64 = 0.5;

const MAX_FORM_DEPTH: u8 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct TextChar {
    pub ch: char,
    /// `None` for synthesized whitespace.
    pub bbox: Option<Rect>,
}

#[derive(Debug, Clone, Default)]
pub struct PageText {
    pub page_index: usize,
    pub chars: Vec<TextChar>,
}

impl PageText {
    pub fn text(&self) -> String {
        self.chars.iter().map(|c| c.ch).collect()
    }
}

/// Text layers for every page, in page order.
pub fn build_text_layer(doc: &Document) -> Result<Vec<PageText>, DocumentError> {
    page_ids(doc)
        .into_iter()
        .enumerate()
        .map(|(index, page_id)| page_text(doc, page_id, index))
        .collect()
}

pub fn page_text(
    doc: &Document,
    page_id: ObjectId,
    page_index: usize,
) -> Result<PageText, DocumentError> {
    let content = doc.get_page_content(page_id).map_err(|e| {
        DocumentError::Format(format!("page {}: unreadable content stream: {e}", page_index + 1))
    })?;
    let content = Content::decode(&content).map_err(|e| {
        DocumentError::Format(format!("page {}: invalid content stream: {e}", page_index + 1))
    })?;
    let resources = inherited(doc, page_id, b"Resources").and_then(|r| r.as_dict().ok());

    let mut interpreter = Interpreter::new(doc);
    interpreter.run(&content.operations, resources, 0);

    debug!(
        page = page_index + 1,
        chars = interpreter.out.len(),
        "Built page text layer"
    );
    Ok(PageText {
        page_index,
        chars: interpreter.out,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Matrices
// ────────────────────────────────────────────────────────────────────────────

/// `[a b c d e f]`, applied to row vectors: `[x y 1] × M`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Matrix {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`
    fn then(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (x * a + y * c + e, x * b + y * d + f)
    }

    /// Length of the transformed unit y vector.
    fn vertical_scale(&self) -> f64 {
        self.0[2].hypot(self.0[3])
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        let values: Vec<f64> = operands.iter().filter_map(as_number).collect();
        <[f64; 6]>::try_from(values.as_slice()).ok().map(Matrix)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Interpreter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    char_spacing: f64,
    word_spacing: f64,
    /// `Tz / 100`
    horizontal_scale: f64,
    leading: f64,
    rise: f64,
    font: Option<Rc<PdfFont>>,
    font_size: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
            font: None,
            font_size: 0.0,
        }
    }
}

/// Where the previous glyph ended, in user space.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    end: (f64, f64),
    size: f64,
}

struct Interpreter<'a> {
    doc: &'a Document,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    fonts: HashMap<ObjectId, Rc<PdfFont>>,
    fallback_font: Rc<PdfFont>,
    cursor: Option<Cursor>,
    out: Vec<TextChar>,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            state: GraphicsState::default(),
            stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            fonts: HashMap::new(),
            fallback_font: Rc::new(PdfFont::fallback()),
            cursor: None,
            out: Vec::new(),
        }
    }

    fn run(&mut self, operations: &[Operation], resources: Option<&'a Dictionary>, depth: u8) {
        for op in operations {
            let operands = op.operands.as_slice();
            let num = |i: usize| operands.get(i).and_then(as_number);

            match op.operator.as_str() {
                "q" => self.stack.push(self.state.clone()),
                "Q" => {
                    if let Some(saved) = self.stack.pop() {
                        self.state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.state.ctm = m.then(&self.state.ctm);
                    }
                }
                "BT" => {
                    self.text_matrix = Matrix::IDENTITY;
                    self.line_matrix = Matrix::IDENTITY;
                }
                "ET" => {}
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.state.font = Some(self.font(resources, name));
                    }
                    self.state.font_size = num(1).unwrap_or(self.state.font_size);
                }
                "Tc" => self.state.char_spacing = num(0).unwrap_or(0.0),
                "Tw" => self.state.word_spacing = num(0).unwrap_or(0.0),
                "Tz" => self.state.horizontal_scale = num(0).unwrap_or(100.0) / 100.0,
                "TL" => self.state.leading = num(0).unwrap_or(0.0),
                "Ts" => self.state.rise = num(0).unwrap_or(0.0),
                "Td" => self.move_line(num(0).unwrap_or(0.0), num(1).unwrap_or(0.0)),
                "TD" => {
                    let ty = num(1).unwrap_or(0.0);
                    self.state.leading = -ty;
                    self.move_line(num(0).unwrap_or(0.0), ty);
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.text_matrix = m;
                        self.line_matrix = m;
                    }
                }
                "T*" => self.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes);
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes);
                    }
                }
                "\"" => {
                    self.state.word_spacing = num(0).unwrap_or(self.state.word_spacing);
                    self.state.char_spacing = num(1).unwrap_or(self.state.char_spacing);
                    self.next_line();
                    if let Some(Object::String(bytes, _)) = operands.get(2) {
                        self.show(bytes);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => self.show(bytes),
                                other => {
                                    if let Some(adjust) = as_number(other) {
                                        self.kern(adjust);
                                    }
                                }
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.run_form(resources, name, depth);
                    }
                }
                _ => {}
            }
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translate(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.state.leading);
    }

    /// A `TJ` number: thousandths of text space, positive moves left.
    fn kern(&mut self, adjust: f64) {
        let tx = -adjust / 1000.0 * self.state.font_size * self.state.horizontal_scale;
        self.text_matrix = Matrix::translate(tx, 0.0).then(&self.text_matrix);
    }

    fn show(&mut self, bytes: &[u8]) {
        let font = self
            .state
            .font
            .clone()
            .unwrap_or_else(|| Rc::clone(&self.fallback_font));
        let font_size = self.state.font_size;
        let h_scale = self.state.horizontal_scale;
        let text_space = Matrix([font_size * h_scale, 0.0, 0.0, font_size, 0.0, self.state.rise]);

        for glyph in font.decode(bytes) {
            let w0 = glyph.width / 1000.0;
            let render = text_space
                .then(&self.text_matrix)
                .then(&self.state.ctm);

            let corners = [
                render.apply(0.0, -GLYPH_DESCENT),
                render.apply(w0, -GLYPH_DESCENT),
                render.apply(0.0, GLYPH_ASCENT),
                render.apply(w0, GLYPH_ASCENT),
            ];
            let bbox = Rect::bounding(&corners);
            let origin = render.apply(0.0, 0.0);
            let size = render.vertical_scale();

            if !glyph.text.is_empty() {
                self.synthesize_break(origin, size);
                for ch in glyph.text.chars() {
                    self.out.push(TextChar { ch, bbox });
                }
                self.cursor = Some(Cursor {
                    end: render.apply(w0, 0.0),
                    size,
                });
            }

            let spacing = self.state.char_spacing
                + if glyph.is_word_space {
                    self.state.word_spacing
                } else {
                    0.0
                };
            let tx = (w0 * font_size + spacing) * h_scale;
            self.text_matrix = Matrix::translate(tx, 0.0).then(&self.text_matrix);
        }
    }

    fn synthesize_break(&mut self, origin: (f64, f64), size: f64) {
        let Some(cursor) = self.cursor else {
            return;
        };
        if self.out.last().map_or(true, |c| c.ch.is_whitespace()) {
            return;
        }

        let scale = size.max(cursor.size);
        let dx = origin.0 - cursor.end.0;
        let dy = origin.1 - cursor.end.1;

        if dy.abs() > LINE_SHIFT_RATIO * scale {
            self.out.push(TextChar { ch: '\n', bbox: None });
        } else if dx > WORD_GAP_RATIO * scale || dx < -scale {
            self.out.push(TextChar { ch: ' ', bbox: None });
        }
    }

    fn font(&mut self, resources: Option<&'a Dictionary>, name: &[u8]) -> Rc<PdfFont> {
        let doc = self.doc;
        let entry = resources
            .and_then(|r| dict_get(doc, r, b"Font"))
            .and_then(|fonts| fonts.as_dict().ok())
            .and_then(|fonts| fonts.get(name).ok());

        match entry {
            Some(Object::Reference(id)) => {
                if let Some(font) = self.fonts.get(id) {
                    return Rc::clone(font);
                }
                let font = match doc.get_object(*id).and_then(|o| o.as_dict()) {
                    Ok(dict) => Rc::new(PdfFont::load(doc, dict)),
                    Err(_) => Rc::clone(&self.fallback_font),
                };
                self.fonts.insert(*id, Rc::clone(&font));
                font
            }
            Some(Object::Dictionary(dict)) => Rc::new(PdfFont::load(doc, dict)),
            _ => {
                debug!(
                    font = %String::from_utf8_lossy(name),
                    "Font resource not found; using built-in metrics"
                );
                Rc::clone(&self.fallback_font)
            }
        }
    }

    fn run_form(&mut self, resources: Option<&'a Dictionary>, name: &[u8], depth: u8) {
        if depth >= MAX_FORM_DEPTH {
            return;
        }
        let doc = self.doc;
        let stream = resources
            .and_then(|r| dict_get(doc, r, b"XObject"))
            .and_then(|x| x.as_dict().ok())
            .and_then(|x| dict_get(doc, x, name))
            .and_then(|obj| match obj {
                Object::Stream(stream) => Some(stream),
                _ => None,
            });
        let Some(stream) = stream else {
            return;
        };
        let is_form = matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Form");
        if !is_form {
            return;
        }

        let data = if stream.dict.has(b"Filter") {
            match stream.decompressed_content() {
                Ok(data) => data,
                Err(e) => {
                    debug!("Skipping form XObject that failed to decompress: {e}");
                    return;
                }
            }
        } else {
            stream.content.clone()
        };
        let content = match Content::decode(&data) {
            Ok(content) => content,
            Err(e) => {
                debug!("Skipping form XObject with invalid content: {e}");
                return;
            }
        };

        let matrix = dict_get(doc, &stream.dict, b"Matrix")
            .and_then(|m| m.as_array().ok())
            .and_then(|m| Matrix::from_operands(m))
            .unwrap_or(Matrix::IDENTITY);
        let form_resources = dict_get(doc, &stream.dict, b"Resources")
            .and_then(|r| r.as_dict().ok())
            .or(resources);

        self.stack.push(self.state.clone());
        self.state.ctm = matrix.then(&self.state.ctm);
        self.run(&content.operations, form_resources, depth + 1);
        if let Some(saved) = self.stack.pop() {
            self.state = saved;
        }
    }
}
