use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use thiserror::Error;

use crate::template::{LineStyle, ReceiptDocument};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to build PDF: {0}")]
    Pdf(String),
}

// ── Page geometry (points, A4) ───────────────────────────────────────────────

const PAGE_W: f32 = 595.0;
const PAGE_H: f32 = 842.0;
const MARGIN: f32 = 40.0;
const TABLE_W: f32 = PAGE_W - 2.0 * MARGIN;
const COL_W: f32 = TABLE_W / 2.0;
const HEADER_H: f32 = 30.0;
const ROW_H: f32 = 32.0;
const INFO_LABEL_W: f32 = 80.0;
const BODY_SIZE: f32 = 11.0;
const LEADING: f32 = 16.0;

const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
const RULE_GRAY: [f32; 3] = [0.8, 0.8, 0.8];
const HEADER_FILL: [f32; 3] = [0.94, 0.94, 0.94];
/// #dc2626
const DEDUCTION_RED: [f32; 3] = [0.863, 0.149, 0.149];

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

// ── Content stream builder ───────────────────────────────────────────────────

fn real(v: f32) -> Object {
    Object::Real(v.into())
}

#[derive(Default)]
struct Canvas {
    ops: Vec<Operation>,
}

impl Canvas {
    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn fill_color(&mut self, [r, g, b]: [f32; 3]) {
        self.op("rg", vec![real(r), real(g), real(b)]);
    }

    fn stroke_color(&mut self, [r, g, b]: [f32; 3]) {
        self.op("RG", vec![real(r), real(g), real(b)]);
    }

    fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
        self.op("BT", vec![]);
        self.op("Tf", vec![font.resource().into(), real(size)]);
        self.op("Td", vec![real(x), real(y)]);
        self.op("Tj", vec![Object::string_literal(win_ansi(text))]);
        self.op("ET", vec![]);
    }

    fn centered_text(&mut self, font: Font, size: f32, left: f32, width: f32, y: f32, text: &str) {
        let x = left + ((width - text_width(text, size)) / 2.0).max(4.0);
        self.text(font, size, x, y, text);
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Option<[f32; 3]>) {
        if let Some(color) = fill {
            self.fill_color(color);
            self.op("re", vec![real(x), real(y), real(w), real(h)]);
            self.op("f", vec![]);
            self.fill_color(BLACK);
        }
        self.op("re", vec![real(x), real(y), real(w), real(h)]);
        self.op("S", vec![]);
    }

    fn hline(&mut self, x1: f32, x2: f32, y: f32) {
        self.op("m", vec![real(x1), real(y)]);
        self.op("l", vec![real(x2), real(y)]);
        self.op("S", vec![]);
    }
}

// ── Layout ───────────────────────────────────────────────────────────────────

/// Renders one receipt as a single-page PDF.
pub fn render_pdf(doc: &ReceiptDocument) -> Result<Vec<u8>, RenderError> {
    let content = Content { operations: layout(doc) };
    let bytes = content.encode().map_err(|e| RenderError::Pdf(e.to_string()))?;
    assemble(&doc.title, &doc.customer, bytes)
}

fn layout(doc: &ReceiptDocument) -> Vec<Operation> {
    let mut c = Canvas::default();
    let mut y = PAGE_H - MARGIN;

    c.op("w", vec![real(1.0)]);

    y -= 24.0;
    c.text(Font::Bold, 24.0, MARGIN, y, &doc.title);
    y -= 14.0;
    c.stroke_color(RULE_GRAY);
    c.hline(MARGIN, PAGE_W - MARGIN, y);
    c.stroke_color(BLACK);
    y -= 26.0;

    for (label, value) in doc.info_lines() {
        c.text(Font::Bold, BODY_SIZE, MARGIN, y, label);
        c.text(Font::Regular, BODY_SIZE, MARGIN + INFO_LABEL_W, y, &value);
        y -= LEADING + 2.0;
    }

    y -= 14.0;
    c.stroke_color(RULE_GRAY);
    y -= HEADER_H;
    c.rect(MARGIN, y, COL_W, HEADER_H, Some(HEADER_FILL));
    c.rect(MARGIN + COL_W, y, COL_W, HEADER_H, Some(HEADER_FILL));
    let baseline = y + HEADER_H / 2.0 - 4.0;
    c.centered_text(Font::Bold, BODY_SIZE, MARGIN, COL_W, baseline, "DESCRIÇÃO");
    c.centered_text(Font::Bold, BODY_SIZE, MARGIN + COL_W, COL_W, baseline, "VALOR");

    for item in &doc.items {
        y -= ROW_H;
        c.rect(MARGIN, y, COL_W, ROW_H, None);
        c.rect(MARGIN + COL_W, y, COL_W, ROW_H, None);
        let baseline = y + ROW_H / 2.0 - 4.0;
        c.centered_text(Font::Regular, BODY_SIZE, MARGIN, COL_W, baseline, item.label);
        if item.style == LineStyle::Deduction {
            c.fill_color(DEDUCTION_RED);
        }
        c.centered_text(Font::Regular, BODY_SIZE, MARGIN + COL_W, COL_W, baseline, &item.value);
        c.fill_color(BLACK);
    }
    c.stroke_color(BLACK);

    y -= 36.0;
    for line in wrap(&doc.confirmation(), BODY_SIZE, TABLE_W) {
        c.text(Font::Regular, BODY_SIZE, MARGIN, y, &line);
        y -= LEADING;
    }
    y -= 10.0;
    c.text(Font::Bold, 12.0, MARGIN, y, &doc.final_value());
    y -= LEADING + 8.0;
    c.text(Font::Regular, BODY_SIZE, MARGIN, y, &doc.payment_condition());

    c.ops
}

fn assemble(title: &str, customer: &str, content: Vec<u8>) -> Result<Vec<u8>, RenderError> {
    let mut pdf = Document::with_version("1.5");
    let pages_id = pdf.new_object_id();

    let regular = pdf.add_object(font_dict("Helvetica"));
    let bold = pdf.add_object(font_dict("Helvetica-Bold"));
    let resources_id = pdf.add_object(dictionary! {
        "Font" => dictionary! { "F1" => regular, "F2" => bold },
    });
    let content_id = pdf.add_object(Stream::new(dictionary! {}, content));
    let page_id = pdf.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), real(PAGE_W), real(PAGE_H)],
    };
    pdf.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = pdf.add_object(dictionary! {
        "Title" => Object::string_literal(win_ansi(&format!("{title} - {customer}"))),
        "Producer" => Object::string_literal("recibos"),
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.trailer.set("Info", info_id);
    pdf.compress();

    let mut out = Vec::new();
    pdf.save_to(&mut out).map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(out)
}

fn font_dict(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

// ── Text helpers ─────────────────────────────────────────────────────────────

/// The standard fonts only cover WinAnsi, whose upper half matches Latin-1
/// for every accented letter Portuguese uses.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Rough Helvetica advance widths, in ems.
fn glyph_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.25,
        ' ' | 'f' | 't' | 'r' | 'I' | '-' | '(' | ')' | '/' => 0.3,
        'm' | 'w' | 'M' | 'W' => 0.8,
        c if c.is_uppercase() => 0.68,
        _ => 0.556,
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(glyph_width).sum::<f32>() * size
}

/// Greedy word wrap. A single word wider than the line gets a line to itself.
fn wrap(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if text_width(&candidate, size) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ReceiptOptions;
    use chrono::NaiveDate;
    use recibos_core::{EmployeeRecord, FieldValue};
    use rust_decimal::Decimal;

    fn receipt() -> ReceiptDocument {
        let mut r = EmployeeRecord::named("Ana");
        r.base_salary = Some(FieldValue::Number(Decimal::from(1000)));
        r.deductions = Some(FieldValue::Number(Decimal::from(20)));
        r.total = Some(FieldValue::Number(Decimal::from(980)));
        ReceiptDocument::new(
            &r,
            7,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            &ReceiptOptions::default(),
        )
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn page_content(pdf: &[u8]) -> Vec<u8> {
        let doc = Document::load_mem(pdf).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        doc.get_page_content(page_id).unwrap()
    }

    #[test]
    fn renders_a_single_page_pdf() {
        let pdf = render_pdf(&receipt()).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        page_content(&pdf);
    }

    #[test]
    fn page_shows_receipt_text() {
        let content = page_content(&render_pdf(&receipt()).unwrap());
        for needle in [
            &b"Recibo"[..],
            b"Ana",
            b"$ 1000.00",
            b"-$ 20.00",
            b"Valor Final: $ 980.00",
            b"Binance",
            b"VALOR",
        ] {
            assert!(contains(&content, needle), "missing {}", String::from_utf8_lossy(needle));
        }
    }

    #[test]
    fn win_ansi_keeps_latin1_and_replaces_the_rest() {
        assert_eq!(win_ansi("Salário"), vec![b'S', b'a', b'l', 0xE1, b'r', b'i', b'o']);
        assert_eq!(win_ansi("nº"), vec![b'n', 0xBA]);
        assert_eq!(win_ansi("€ 5"), b"? 5".to_vec());
        assert_eq!(win_ansi("a\tb"), b"a?b".to_vec());
    }

    #[test]
    fn wrap_splits_long_sentences() {
        let doc = receipt();
        let lines = wrap(&doc.confirmation(), BODY_SIZE, 200.0);
        assert!(lines.len() >= 3);
        assert_eq!(lines.join(" "), doc.confirmation());
        assert!(lines.iter().all(|l| text_width(l, BODY_SIZE) <= 200.0));
    }

    #[test]
    fn wrap_short_and_empty() {
        assert_eq!(wrap("Valor Final", BODY_SIZE, TABLE_W), vec!["Valor Final"]);
        assert!(wrap("   ", BODY_SIZE, TABLE_W).is_empty());
    }
}
