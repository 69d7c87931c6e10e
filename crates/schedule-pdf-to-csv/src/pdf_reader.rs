//! Positioned glyphs and plain text for one PDF page.
//!
//! Glyph positions come from walking the page content stream with `lopdf` and
//! tracking the text and graphics matrices. Glyph boxes are estimates: the
//! advance width comes from the font's `/Widths` array when present, and the
//! height is one font size above the baseline.

use std::collections::BTreeMap;

use encoding_rs::UTF_16BE;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::ExtractError;
use crate::geometry::Rect;
use crate::model::GlyphMark;

/// Advance width, in thousandths of an em, for fonts without `/Widths`.
const DEFAULT_GLYPH_WIDTH: f64 = 600.0;

#[derive(Debug, Clone)]
pub struct PageContent {
    pub page: u32,
    pub text: String,
    pub marks: Vec<GlyphMark>,
}

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t' | '\u{000C}'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    if let Some(name) = encoding {
        let lower = name.to_ascii_lowercase();
        if lower.contains("utf16") || lower.contains("identity-h") || lower.contains("unicode") {
            let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
            if !had_errors && !utf16.is_empty() {
                return utf16.into_owned();
            }
        }
    }

    String::from_utf8_lossy(bytes).to_string()
}

#[allow(clippy::cast_precision_loss)]
fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

/// Row-vector affine matrix `[a b c d e f]`, as PDF writes it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() != 6 {
            return None;
        }
        let mut values = [0.0; 6];
        for (slot, operand) in values.iter_mut().zip(operands) {
            *slot = number(operand)?;
        }
        Some(Self(values))
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(self, other: Self) -> Self {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Self([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn apply(self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }
}

#[derive(Debug, Clone, Default)]
struct FontMetrics<'a> {
    encoding: Option<&'a str>,
    first_char: i64,
    widths: Vec<f64>,
    two_byte: bool,
}

impl FontMetrics<'_> {
    fn width(&self, code: i64) -> f64 {
        usize::try_from(code - self.first_char)
            .ok()
            .and_then(|index| self.widths.get(index).copied())
            .filter(|width| *width > 0.0)
            .unwrap_or(DEFAULT_GLYPH_WIDTH)
    }
}

fn font_metrics<'a>(document: &'a Document, font: &'a Dictionary) -> FontMetrics<'a> {
    let encoding = font.get_font_encoding();
    let two_byte = encoding.to_ascii_lowercase().contains("identity")
        || font
            .get(b"Subtype")
            .and_then(Object::as_name)
            .is_ok_and(|subtype| subtype == b"Type0");

    let first_char = font
        .get(b"FirstChar")
        .ok()
        .and_then(|object| object.as_i64().ok())
        .unwrap_or(0);
    let widths = font
        .get(b"Widths")
        .and_then(|object| document.dereference(object))
        .and_then(|(_, object)| object.as_array())
        .map(|items| items.iter().filter_map(number).collect())
        .unwrap_or_default();

    FontMetrics {
        encoding: Some(encoding),
        first_char,
        widths,
        two_byte,
    }
}

#[derive(Debug, Clone)]
struct TextState<'a> {
    font: Option<&'a FontMetrics<'a>>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState<'_> {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

struct GlyphWalker<'a> {
    fonts: &'a BTreeMap<Vec<u8>, FontMetrics<'a>>,
    ctm: Matrix,
    saved: Vec<(Matrix, TextState<'a>)>,
    state: TextState<'a>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    marks: Vec<GlyphMark>,
}

impl<'a> GlyphWalker<'a> {
    fn new(fonts: &'a BTreeMap<Vec<u8>, FontMetrics<'a>>) -> Self {
        Self {
            fonts,
            ctm: Matrix::IDENTITY,
            saved: Vec::new(),
            state: TextState::default(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            marks: Vec::new(),
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translate(tx, ty).then(self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.state.leading);
    }

    fn advance(&mut self, tx: f64) {
        self.text_matrix = Matrix::translate(tx, 0.0).then(self.text_matrix);
    }

    fn show(&mut self, bytes: &[u8]) {
        let Some(font) = self.state.font else {
            return;
        };
        let step = if font.two_byte { 2 } else { 1 };

        for code_bytes in bytes.chunks(step) {
            let code = code_bytes
                .iter()
                .fold(0_i64, |acc, byte| (acc << 8) | i64::from(*byte));
            let text = decode_pdf_bytes(font.encoding, code_bytes);
            let glyph_width = font.width(code) / 1000.0 * self.state.font_size;

            if !text.trim().is_empty() {
                let render = self.text_matrix.then(self.ctm);
                let rise = self.state.rise;
                let right = glyph_width * self.state.horizontal_scale;
                let corners = [
                    render.apply(0.0, rise),
                    render.apply(right, rise),
                    render.apply(0.0, rise + self.state.font_size),
                    render.apply(right, rise + self.state.font_size),
                ];
                let bbox = corners.iter().fold(
                    Rect::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN),
                    |acc, &(x, y)| {
                        Rect::new(acc.llx.min(x), acc.lly.min(y), acc.urx.max(x), acc.ury.max(y))
                    },
                );
                self.marks.push(GlyphMark::new(text, bbox));
            }

            let mut tx = glyph_width + self.state.char_spacing;
            if step == 1 && code == 32 {
                tx += self.state.word_spacing;
            }
            self.advance(tx * self.state.horizontal_scale);
        }
    }

    fn show_array(&mut self, items: &[Object]) {
        for item in items {
            match item {
                Object::String(bytes, _) => self.show(bytes),
                other => {
                    if let Some(adjust) = number(other) {
                        let tx = -adjust / 1000.0
                            * self.state.font_size
                            * self.state.horizontal_scale;
                        self.advance(tx);
                    }
                }
            }
        }
    }

    fn operand(operands: &[Object], index: usize) -> Option<f64> {
        operands.get(index).and_then(number)
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "q" => self.saved.push((self.ctm, self.state.clone())),
            "Q" => {
                if let Some((ctm, state)) = self.saved.pop() {
                    self.ctm = ctm;
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(matrix) = Matrix::from_operands(operands) {
                    self.ctm = matrix.then(self.ctm);
                }
            }
            "BT" => {
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "Tf" => {
                let fonts = self.fonts;
                self.state.font = operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|name| fonts.get(name));
                if let Some(size) = Self::operand(operands, 1) {
                    self.state.font_size = size;
                }
            }
            "Tc" => {
                if let Some(value) = Self::operand(operands, 0) {
                    self.state.char_spacing = value;
                }
            }
            "Tw" => {
                if let Some(value) = Self::operand(operands, 0) {
                    self.state.word_spacing = value;
                }
            }
            "Tz" => {
                if let Some(value) = Self::operand(operands, 0) {
                    self.state.horizontal_scale = value / 100.0;
                }
            }
            "TL" => {
                if let Some(value) = Self::operand(operands, 0) {
                    self.state.leading = value;
                }
            }
            "Ts" => {
                if let Some(value) = Self::operand(operands, 0) {
                    self.state.rise = value;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (Self::operand(operands, 0), Self::operand(operands, 1))
                {
                    if operator == "TD" {
                        self.state.leading = -ty;
                    }
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(matrix) = Matrix::from_operands(operands) {
                    self.text_matrix = matrix;
                    self.line_matrix = matrix;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show_array(items);
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "\"" => {
                if let Some(value) = Self::operand(operands, 0) {
                    self.state.word_spacing = value;
                }
                if let Some(value) = Self::operand(operands, 1) {
                    self.state.char_spacing = value;
                }
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(bytes);
                }
            }
            _ => {}
        }
    }
}

/// Glyph marks of one page in content-stream order.
///
/// # Errors
///
/// Returns [`ExtractError::PdfLoad`] when the page content cannot be read or
/// decoded.
pub fn read_page_glyphs(
    document: &Document,
    page_id: ObjectId,
) -> Result<Vec<GlyphMark>, ExtractError> {
    let raw_content = document.get_page_content(page_id)?;
    let content = Content::decode(&raw_content)?;
    let fonts = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font_metrics(document, font)))
        .collect::<BTreeMap<_, _>>();

    let mut walker = GlyphWalker::new(&fonts);
    for operation in &content.operations {
        walker.apply(&operation.operator, &operation.operands);
    }

    tracing::debug!(marks = walker.marks.len(), "read page glyphs");
    Ok(walker.marks)
}

fn page_text(document: &Document, input_pdf: &[u8], page: u32, page_count: usize) -> String {
    let from_pdf_extract = pdf_extract::extract_text_from_mem(input_pdf)
        .ok()
        .map(|text| split_text_into_pages(&text))
        .filter(|pages| pages.len() == page_count)
        .and_then(|pages| pages.into_iter().nth(usize::try_from(page).ok()?.checked_sub(1)?))
        .filter(|text| !text.trim().is_empty() && !looks_decoding_broken(text));
    if let Some(text) = from_pdf_extract {
        return text;
    }

    tracing::debug!(page, "pdf-extract text unusable, falling back to lopdf");
    document.extract_text(&[page]).unwrap_or_default()
}

/// Loads `input_pdf` and reads the glyphs and text of the 1-based `page`.
///
/// # Errors
///
/// * [`ExtractError::PdfLoad`] if the bytes are not a readable PDF.
/// * [`ExtractError::NoPages`] if the page does not exist.
pub fn read_page(input_pdf: &[u8], page: u32) -> Result<PageContent, ExtractError> {
    let document = Document::load_mem(input_pdf)?;
    let pages = document.get_pages();
    let page_id = *pages.get(&page).ok_or(ExtractError::NoPages(page))?;

    let marks = read_page_glyphs(&document, page_id)?;
    let text = page_text(&document, input_pdf, page, pages.len());

    Ok(PageContent { page, text, marks })
}
