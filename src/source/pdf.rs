//! PDF line extraction using lopdf.
//!
//! Walks each page's content stream, collects positioned text spans with
//! their font size and font name, then groups spans sharing a baseline into
//! lines. Lines come out top to bottom within a page and pages in order.
//! Single-column reading order only.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use unicode_normalization::UnicodeNormalization;

use super::LineSource;
use crate::error::{Error, Result};
use crate::model::Line;
use crate::options::ErrorMode;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// A text run with position and font information.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Effective font size in points
    pub font_size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
}

impl TextSpan {
    /// Create a new text span; boldness is read from the font name.
    ///
    /// Besides "bold", the heavier "black" and "heavy" weights count as bold.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let lower = font_name.to_lowercase();
        let is_bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");

        Self {
            text,
            x,
            y,
            font_size,
            font_name,
            is_bold,
        }
    }
}

/// Line source for PDF files.
#[derive(Debug, Clone, Default)]
pub struct PdfLineSource {
    error_mode: ErrorMode,
}

impl PdfLineSource {
    /// Create a strict PDF line source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Skip pages whose content cannot be decoded instead of failing.
    pub fn lenient(self) -> Self {
        self.with_error_mode(ErrorMode::Lenient)
    }

    /// Extract lines from an in-memory PDF.
    pub fn lines_from_bytes(&self, data: &[u8]) -> Result<Vec<Line>> {
        check_header(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        self.lines_from_document(&doc)
    }

    /// Extract lines from an already loaded document.
    pub fn lines_from_document(&self, doc: &LopdfDocument) -> Result<Vec<Line>> {
        let pages = doc.get_pages();
        let mut lines = Vec::new();

        for (&page_num, &page_id) in &pages {
            match extract_page_spans(doc, page_id) {
                Ok(spans) => lines.extend(group_spans_into_lines(spans, page_num)),
                Err(e) => {
                    if self.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Failed to extract text from page {}: {}", page_num, e);
                }
            }
        }

        log::debug!("extracted {} lines from {} pages", lines.len(), pages.len());
        Ok(lines)
    }

    /// Extract the lines of a single page (1-indexed).
    pub fn lines_from_page(&self, doc: &LopdfDocument, page_number: u32) -> Result<Vec<Line>> {
        let pages = doc.get_pages();
        let page_id = pages
            .get(&page_number)
            .copied()
            .ok_or(Error::PageOutOfRange(page_number, pages.len() as u32))?;
        let spans = extract_page_spans(doc, page_id)?;
        Ok(group_spans_into_lines(spans, page_number))
    }
}

impl LineSource for PdfLineSource {
    fn lines(&self, path: &Path) -> Result<Vec<Line>> {
        let data = fs::read(path)?;
        self.lines_from_bytes(&data)
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }
}

/// Validate the `%PDF-x.y` header.
fn check_header(data: &[u8]) -> Result<()> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    let valid = matches!(
        version.as_str(),
        "1.0" | "1.1" | "1.2" | "1.3" | "1.4" | "1.5" | "1.6" | "1.7" | "2.0"
    );
    if !valid {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(())
}

/// Collect the text spans of one page.
fn extract_page_spans(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<TextSpan>> {
    let fonts = doc.get_page_fonts(page_id)?;
    let content = page_content(doc, page_id)?;
    parse_content_stream(doc, &content, &fonts)
}

/// Get the decompressed content stream of a page.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let contents = page_dict.get(b"Contents")?;

    match contents {
        Object::Reference(r) => match doc.get_object(*r) {
            Ok(Object::Stream(s)) => s
                .decompressed_content()
                .map_err(|e| Error::PdfParse(e.to_string())),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        },
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Object::Reference(r) = obj {
                    if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                        if let Ok(data) = s.decompressed_content() {
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                    }
                }
            }
            Ok(content)
        }
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

/// Walk the content stream operators and emit a span per shown string.
fn parse_content_stream(
    doc: &LopdfDocument,
    content: &[u8],
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
) -> Result<Vec<TextSpan>> {
    let content =
        lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut spans = Vec::new();
    let mut font_key: Vec<u8> = Vec::new();
    let mut font_name = String::new();
    let mut font_size: f32 = 12.0;
    let mut matrix = TextMatrix::default();
    let mut in_text = false;

    for op in content.operations {
        match op.operator.as_str() {
            "BT" => {
                in_text = true;
                matrix = TextMatrix::default();
            }
            "ET" => in_text = false,
            "Tf" => {
                if let [Object::Name(key), size, ..] = op.operands.as_slice() {
                    font_key = key.clone();
                    font_name = fonts
                        .get(key)
                        .and_then(|f| f.get(b"BaseFont").ok())
                        .and_then(|o| o.as_name().ok())
                        .map(|n| String::from_utf8_lossy(n).to_string())
                        .unwrap_or_else(|| String::from_utf8_lossy(key).to_string());
                    font_size = get_number(size).unwrap_or(12.0);
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(get_number) {
                    matrix.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let [tx, ty, ..] = op.operands.as_slice() {
                    let tx = get_number(tx).unwrap_or(0.0);
                    let ty = get_number(ty).unwrap_or(0.0);
                    if op.operator == "TD" {
                        matrix.leading = -ty;
                    }
                    matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    let n: Vec<f32> = op
                        .operands
                        .iter()
                        .take(6)
                        .map(|o| get_number(o).unwrap_or(0.0))
                        .collect();
                    matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                }
            }
            "T*" => matrix.next_line(),
            "Tj" | "TJ" | "'" | "\"" => {
                if op.operator == "'" || op.operator == "\"" {
                    matrix.next_line();
                }
                if !in_text {
                    continue;
                }

                let font = fonts.get(&font_key).copied();
                let text = match op.operator.as_str() {
                    "TJ" => match op.operands.first() {
                        Some(Object::Array(items)) => decode_array(doc, font, items),
                        _ => String::new(),
                    },
                    "\"" => match op.operands.get(2) {
                        Some(Object::String(bytes, _)) => decode_string(doc, font, bytes),
                        _ => String::new(),
                    },
                    _ => match op.operands.first() {
                        Some(Object::String(bytes, _)) => decode_string(doc, font, bytes),
                        _ => String::new(),
                    },
                };

                if !text.trim().is_empty() {
                    let (x, y) = matrix.position();
                    spans.push(TextSpan::new(
                        text,
                        x,
                        y,
                        font_size * matrix.scale(),
                        font_name.clone(),
                    ));
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

/// Decode a `TJ` array; large negative kerning becomes a word space.
fn decode_array(doc: &LopdfDocument, font: Option<&Dictionary>, items: &[Object]) -> String {
    // 1/1000 text space units; ~0.2 em separates words in most fonts
    const SPACE_THRESHOLD: f32 = 200.0;

    let mut combined = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => combined.push_str(&decode_string(doc, font, bytes)),
            other => {
                if let Some(adjustment) = get_number(other) {
                    if -adjustment > SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(char::is_whitespace)
                    {
                        combined.push(' ');
                    }
                }
            }
        }
    }
    combined
}

/// Decode a string operand with the font's encoding when one is available.
fn decode_string(doc: &LopdfDocument, font: Option<&Dictionary>, bytes: &[u8]) -> String {
    if let Some(encoding) = font.and_then(|f| f.get_font_encoding(doc).ok()) {
        if let Ok(text) = LopdfDocument::decode_text(&encoding, bytes) {
            return text;
        }
    }
    decode_text_simple(bytes)
}

/// Group a page's spans into lines by baseline.
///
/// A line's text is its spans joined by single spaces, its font size the
/// largest span size and it is bold if any span is bold.
pub(crate) fn group_spans_into_lines(mut spans: Vec<TextSpan>, page_number: u32) -> Vec<Line> {
    // PDF Y grows upwards: sort top to bottom, then left to right
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();

    for span in spans {
        let same_line = current
            .first()
            .is_some_and(|first| (span.y - first.y).abs() <= first.font_size * 0.3);
        if !same_line && !current.is_empty() {
            lines.extend(build_line(std::mem::take(&mut current), page_number));
        }
        current.push(span);
    }
    if !current.is_empty() {
        lines.extend(build_line(current, page_number));
    }

    lines
}

fn build_line(mut spans: Vec<TextSpan>, page_number: u32) -> Option<Line> {
    // baselines within tolerance may differ, so reading order comes from x
    spans.sort_by(|a, b| a.x.total_cmp(&b.x));
    let joined = spans
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let text = normalize_text(&joined);
    if text.is_empty() {
        return None;
    }

    let font_size = spans.iter().map(|s| s.font_size).fold(0.0, f32::max);
    let bold = spans.iter().any(|s| s.is_bold);
    Some(Line::new(text, font_size, bold, page_number))
}

/// NFKC-normalize (folds ligatures such as "ﬁ") and collapse whitespace.
fn normalize_text(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
