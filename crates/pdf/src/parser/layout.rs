//! Text extraction and grouping into fragments.
//!
//! ```text
//! content ops  ->  TextSpan[]  ->  TextLine[]  ->  fragments (String[])
//!   (per page)      extract         group_spans      group_lines
//! ```
//!
//! A fragment is a box of text that belongs together on the page: a step
//! paragraph, a figure caption, a page header. Lines inside a fragment end in
//! `\n`. Fragments come out top to bottom, then left to right.

use super::backend::{get_number_from_value, PageId, PdfBackend, PdfValue};
use super::normalize::normalize_span_text;
use crate::PdfError;

/// A run of text at a specific position on the page.
#[derive(Debug, Clone)]
pub struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
}

impl TextSpan {
    fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Spans sharing a baseline, merged into horizontally separated chunks.
///
/// Text separated by a wide gap (a second column, a callout next to a figure)
/// stays in its own chunk.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub y: f32,
    pub chunks: Vec<TextSpan>,
}

/// Spans whose Y coordinates differ by less than this share a line.
const Y_TOLERANCE: f32 = 1.0;

/// Approximate character width as a fraction of font size.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Gap (points) below which adjacent spans are glued without a space.
const MIN_WORD_GAP: f32 = 1.5;

/// Gap, as a multiple of font size, that splits a line into separate chunks.
const CHUNK_GAP_FACTOR: f32 = 2.0;

/// Vertical distance, as a multiple of font size, that ends a fragment.
const BLOCK_GAP_FACTOR: f32 = 1.4;

/// Left edges within this many points count as aligned.
const X_ALIGN_TOLERANCE: f32 = 4.0;

/// Font sizes closer than this belong to the same fragment.
const FONT_SIZE_TOLERANCE: f32 = 1.0;

/// Text-rendering state tracked while walking a content stream.
#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_size: f32,
    /// [a, b, c, d, tx, ty]
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    fn y(&self) -> f32 {
        self.text_matrix[5] + self.text_rise
    }

    /// `font_size * sqrt(b^2 + d^2)`
    fn effective_font_size(&self) -> f32 {
        let scale = (self.text_matrix[1].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    fn char_width(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
    }

    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Td / TD / T*
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    /// Move past rendered text and return the displacement.
    fn advance_after_show(&mut self, text: &str) -> f32 {
        let dx: f32 = text
            .chars()
            .map(|ch| {
                let w = self.char_width() + self.char_spacing;
                if ch == ' ' {
                    w + self.word_spacing
                } else {
                    w
                }
            })
            .sum();
        self.advance_x(dx);
        dx
    }
}

fn number_operand(operands: &[PdfValue], index: usize) -> Option<f32> {
    operands.get(index).and_then(get_number_from_value)
}

fn decode_string(val: &PdfValue, backend: &dyn PdfBackend, page_id: PageId, font_key: &[u8]) -> String {
    match val {
        PdfValue::Str(bytes) => backend.decode_text(page_id, font_key, bytes),
        _ => String::new(),
    }
}

/// Collects spans for one page.
struct SpanCollector<'a> {
    backend: &'a dyn PdfBackend,
    page_id: PageId,
    state: TextState,
    spans: Vec<TextSpan>,
}

impl SpanCollector<'_> {
    fn push_span(&mut self, text: &str, x: f32, y: f32, width: f32) {
        let text = normalize_span_text(text);
        if text.trim().is_empty() {
            return;
        }
        self.spans.push(TextSpan {
            text,
            x,
            y,
            width,
            font_size: self.state.effective_font_size(),
        });
    }

    /// Tj, ' and "
    fn show(&mut self, operand: &PdfValue) {
        let text = decode_string(operand, self.backend, self.page_id, &self.state.font_key);
        if text.is_empty() {
            return;
        }
        let (x, y) = (self.state.x(), self.state.y());
        let width = self.state.advance_after_show(&text);
        self.push_span(&text, x, y, width);
    }

    /// TJ: strings interleaved with kerning in thousandths of a text-space
    /// unit. Large negative kerning reads as a word gap.
    fn show_array(&mut self, arr: &[PdfValue]) {
        let mut buf = String::new();
        let start_x = self.state.x();
        let y = self.state.y();

        for elem in arr {
            match elem {
                PdfValue::Str(_) => {
                    let piece = decode_string(elem, self.backend, self.page_id, &self.state.font_key);
                    self.state.advance_after_show(&piece);
                    buf.push_str(&piece);
                }
                other => {
                    if let Some(adj) = get_number_from_value(other) {
                        let dx = -adj / 1000.0 * self.state.font_size * self.state.horiz_scale;
                        if dx > self.state.char_width() * 0.3 && !buf.is_empty() {
                            buf.push(' ');
                        }
                        self.state.advance_x(dx);
                    }
                }
            }
        }

        let width = self.state.x() - start_x;
        self.push_span(buf.trim_end(), start_x, y, width);
    }

    fn set_font(&mut self, operands: &[PdfValue]) {
        let key = match operands.first() {
            Some(PdfValue::Name(n)) => n.clone(),
            Some(PdfValue::Str(s)) => s.clone(),
            _ => return,
        };
        self.state.font_key = key;
        self.state.font_size = number_operand(operands, 1).unwrap_or(0.0);
    }

    fn set_matrix(&mut self, operands: &[PdfValue]) {
        let vals: Vec<f32> = operands
            .iter()
            .take(6)
            .filter_map(get_number_from_value)
            .collect();
        if let [a, b, c, d, e, f] = vals[..] {
            self.state.text_matrix = [a, b, c, d, e, f];
            self.state.line_matrix = self.state.text_matrix;
        }
    }
}

/// Walk one page's content stream and collect its text spans.
///
/// Handles the text operators `BT Tf Tm Td TD T* TL Tc Tw Tz Ts Tj TJ ' "`;
/// everything else is ignored.
pub fn extract_page_spans(
    backend: &dyn PdfBackend,
    page_id: PageId,
) -> Result<Vec<TextSpan>, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;

    let mut collector = SpanCollector {
        backend,
        page_id,
        state: TextState::default(),
        spans: Vec::new(),
    };

    for op in &ops {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => {
                collector.state.text_matrix = IDENTITY_MATRIX;
                collector.state.line_matrix = IDENTITY_MATRIX;
            }
            "Tf" => collector.set_font(operands),
            "Tm" => collector.set_matrix(operands),
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (number_operand(operands, 0), number_operand(operands, 1)) {
                    if op.operator == "TD" {
                        collector.state.leading = -ty;
                    }
                    collector.state.translate_line(tx, ty);
                }
            }
            "T*" => collector.state.next_line(),
            "TL" => {
                if let Some(v) = number_operand(operands, 0) {
                    collector.state.leading = v;
                }
            }
            "Tc" => {
                if let Some(v) = number_operand(operands, 0) {
                    collector.state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = number_operand(operands, 0) {
                    collector.state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = number_operand(operands, 0) {
                    collector.state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = number_operand(operands, 0) {
                    collector.state.text_rise = v;
                }
            }
            "Tj" => {
                if let Some(first) = operands.first() {
                    collector.show(first);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = operands.first() {
                    collector.show_array(arr);
                }
            }
            "'" => {
                collector.state.next_line();
                if let Some(first) = operands.first() {
                    collector.show(first);
                }
            }
            "\"" => {
                if operands.len() >= 3 {
                    if let Some(aw) = number_operand(operands, 0) {
                        collector.state.word_spacing = aw;
                    }
                    if let Some(ac) = number_operand(operands, 1) {
                        collector.state.char_spacing = ac;
                    }
                    collector.state.next_line();
                    collector.show(&operands[2]);
                }
            }
            _ => {}
        }
    }

    Ok(collector.spans)
}

/// Group spans into lines, top of the page first.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();

    for span in spans {
        if let Some(first) = current.first() {
            if (span.y - first.y).abs() > Y_TOLERANCE {
                lines.push(assemble_line(std::mem::take(&mut current)));
            }
        }
        current.push(span);
    }

    if !current.is_empty() {
        lines.push(assemble_line(current));
    }

    lines
}

/// Merge same-baseline spans left to right into chunks.
fn assemble_line(mut spans: Vec<TextSpan>) -> TextLine {
    spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    let y = spans.first().map(|s| s.y).unwrap_or(0.0);
    let mut chunks: Vec<TextSpan> = Vec::with_capacity(spans.len());

    for span in spans {
        if let Some(prev) = chunks.last_mut() {
            let gap = span.x - prev.right();
            let size = prev.font_size.max(span.font_size);

            if gap < size * CHUNK_GAP_FACTOR {
                if gap >= MIN_WORD_GAP && !prev.text.ends_with(' ') && !span.text.starts_with(' ') {
                    prev.text.push(' ');
                }
                prev.text.push_str(&span.text);
                prev.width = span.right().max(prev.right()) - prev.x;
                prev.font_size = size;
                continue;
            }
        }
        chunks.push(span);
    }

    TextLine { y, chunks }
}

/// A fragment under construction.
#[derive(Debug)]
struct OpenFragment {
    x: f32,
    last_y: f32,
    font_size: f32,
    lines: Vec<String>,
}

impl OpenFragment {
    fn accepts(&self, chunk: &TextSpan, line_y: f32) -> bool {
        let size = self.font_size.max(chunk.font_size);
        (self.x - chunk.x).abs() <= X_ALIGN_TOLERANCE
            && (self.font_size - chunk.font_size).abs() < FONT_SIZE_TOLERANCE
            && (self.last_y - line_y) <= size * BLOCK_GAP_FACTOR
    }

    fn text(&self) -> String {
        self.lines.iter().map(|l| format!("{}\n", l.trim())).collect()
    }
}

/// Stack left-aligned, similarly sized, vertically close chunks into fragments.
pub fn group_lines_into_fragments(lines: Vec<TextLine>) -> Vec<String> {
    let mut fragments: Vec<OpenFragment> = Vec::new();

    for line in lines {
        // Each fragment takes at most one chunk per line.
        let mut extended: Vec<usize> = Vec::new();

        for chunk in line.chunks {
            let target = fragments
                .iter()
                .enumerate()
                .rev()
                .find(|(i, f)| !extended.contains(i) && f.accepts(&chunk, line.y))
                .map(|(i, _)| i);

            match target {
                Some(i) => {
                    let fragment = &mut fragments[i];
                    fragment.lines.push(chunk.text);
                    fragment.last_y = line.y;
                    extended.push(i);
                }
                None => {
                    extended.push(fragments.len());
                    fragments.push(OpenFragment {
                        x: chunk.x,
                        last_y: line.y,
                        font_size: chunk.font_size,
                        lines: vec![chunk.text],
                    });
                }
            }
        }
    }

    fragments.iter().map(OpenFragment::text).collect()
}

/// Extract the ordered text fragments of one page.
pub fn extract_page_fragments(
    backend: &dyn PdfBackend,
    page_id: PageId,
) -> Result<Vec<String>, PdfError> {
    let spans = extract_page_spans(backend, page_id)?;
    Ok(group_lines_into_fragments(group_spans_into_lines(spans)))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::super::backend::ContentOp;
    use super::*;

    fn make_span(text: &str, x: f32, y: f32, font_size: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            x,
            y,
            width: text.len() as f32 * font_size * APPROX_CHAR_WIDTH_RATIO,
            font_size,
        }
    }

    fn fragments(spans: Vec<TextSpan>) -> Vec<String> {
        group_lines_into_fragments(group_spans_into_lines(spans))
    }

    #[test]
    fn test_lines_top_to_bottom() {
        let lines = group_spans_into_lines(vec![
            make_span("Bottom", 0.0, 600.0, 10.0),
            make_span("Top", 0.0, 700.0, 10.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chunks[0].text, "Top");
        assert_eq!(lines[1].chunks[0].text, "Bottom");
    }

    #[test]
    fn test_spans_on_same_baseline_merge() {
        // "Step 1:" ends at x=35, next word starts 3pt later.
        let lines = group_spans_into_lines(vec![
            make_span("Remove panel", 38.0, 700.0, 10.0),
            make_span("Step 1:", 0.0, 700.4, 10.0),
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].chunks.len(), 1);
        assert_eq!(lines[0].chunks[0].text, "Step 1: Remove panel");
    }

    #[test]
    fn test_adjacent_spans_glued() {
        let lines = group_spans_into_lines(vec![
            make_span("PA", 0.0, 700.0, 10.0),
            make_span("GE", 10.5, 700.0, 10.0),
        ]);
        assert_eq!(lines[0].chunks[0].text, "PAGE");
    }

    #[test]
    fn test_wide_gap_splits_chunks() {
        let lines = group_spans_into_lines(vec![
            make_span("Step 1: Drill", 0.0, 700.0, 10.0),
            make_span("FIGURE 1", 300.0, 700.0, 10.0),
        ]);
        assert_eq!(lines[0].chunks.len(), 2);
    }

    #[test]
    fn test_paragraph_becomes_one_fragment() {
        let out = fragments(vec![
            make_span("Step 5: Torque bolt", 50.0, 700.0, 10.0),
            make_span("to 25 in-lb", 50.0, 688.0, 10.0),
        ]);
        assert_eq!(out, vec!["Step 5: Torque bolt\nto 25 in-lb\n".to_string()]);
    }

    #[test]
    fn test_vertical_gap_splits_fragments() {
        let out = fragments(vec![
            make_span("Step 1: Remove panel", 50.0, 700.0, 10.0),
            make_span("Step 2: Install bracket", 50.0, 650.0, 10.0),
        ]);
        assert_eq!(
            out,
            vec![
                "Step 1: Remove panel\n".to_string(),
                "Step 2: Install bracket\n".to_string()
            ]
        );
    }

    #[test]
    fn test_font_size_change_splits_fragments() {
        let out = fragments(vec![
            make_span("PAGE", 400.0, 760.0, 14.0),
            make_span("42-01", 400.0, 746.0, 10.0),
        ]);
        assert_eq!(out, vec!["PAGE\n".to_string(), "42-01\n".to_string()]);
    }

    #[test]
    fn test_columns_stay_separate() {
        let out = fragments(vec![
            make_span("Step 1: Deburr", 50.0, 700.0, 10.0),
            make_span("FIGURE 1", 350.0, 700.0, 10.0),
            make_span("the edges", 50.0, 688.0, 10.0),
            make_span("SKIN", 350.0, 688.0, 10.0),
        ]);
        assert_eq!(
            out,
            vec![
                "Step 1: Deburr\nthe edges\n".to_string(),
                "FIGURE 1\nSKIN\n".to_string()
            ]
        );
    }

    #[test]
    fn test_empty_page() {
        assert!(fragments(Vec::new()).is_empty());
    }

    // -- content stream walking ---------------------------------------------

    struct ScriptedBackend {
        ops: Vec<ContentOp>,
    }

    impl PdfBackend for ScriptedBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (1, 0))])
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>, PdfError> {
            Ok(Vec::new())
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
            Ok(self.ops.clone())
        }

        fn decode_text(&self, _page: PageId, _font_name: &[u8], bytes: &[u8]) -> String {
            super::super::backend::decode_text_simple(bytes)
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn s(text: &str) -> PdfValue {
        PdfValue::Str(text.as_bytes().to_vec())
    }

    #[test]
    fn test_extract_spans_positions() {
        let backend = ScriptedBackend {
            ops: vec![
                op("BT", vec![]),
                op("Tf", vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(10)]),
                op("Td", vec![PdfValue::Integer(72), PdfValue::Integer(700)]),
                op("Tj", vec![s("Step 1: Drill")]),
                op("TL", vec![PdfValue::Integer(12)]),
                op("'", vec![s("the holes")]),
                op("ET", vec![]),
            ],
        };

        let spans = extract_page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Step 1: Drill");
        assert!((spans[0].x - 72.0).abs() < 0.01);
        assert!((spans[0].y - 700.0).abs() < 0.01);
        assert!((spans[1].y - 688.0).abs() < 0.01);
        assert!((spans[1].x - 72.0).abs() < 0.01);
        assert!((spans[0].font_size - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_tj_array_kerning_inserts_space() {
        let backend = ScriptedBackend {
            ops: vec![
                op("BT", vec![]),
                op("Tf", vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(10)]),
                op(
                    "TJ",
                    vec![PdfValue::Array(vec![
                        s("PAGE"),
                        PdfValue::Integer(-400),
                        s("42-01"),
                    ])],
                ),
                op("ET", vec![]),
            ],
        };

        let spans = extract_page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "PAGE 42-01");
    }

    #[test]
    fn test_tm_sets_position_and_scale() {
        let backend = ScriptedBackend {
            ops: vec![
                op("BT", vec![]),
                op("Tf", vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(1)]),
                op(
                    "Tm",
                    vec![
                        PdfValue::Integer(9),
                        PdfValue::Integer(0),
                        PdfValue::Integer(0),
                        PdfValue::Integer(9),
                        PdfValue::Real(100.0),
                        PdfValue::Real(500.0),
                    ],
                ),
                op("Tj", vec![s("FIGURE 2")]),
                op("ET", vec![]),
            ],
        };

        let spans = extract_page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans.len(), 1);
        assert!((spans[0].x - 100.0).abs() < 0.01);
        assert!((spans[0].font_size - 9.0).abs() < 0.01);
    }

    #[test]
    fn test_blank_strings_skipped() {
        let backend = ScriptedBackend {
            ops: vec![
                op("BT", vec![]),
                op("Tf", vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(10)]),
                op("Tj", vec![s("   ")]),
                op("ET", vec![]),
            ],
        };
        assert!(extract_page_spans(&backend, (1, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_extract_page_fragments() {
        let backend = ScriptedBackend {
            ops: vec![
                op("BT", vec![]),
                op("Tf", vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(10)]),
                op("Td", vec![PdfValue::Integer(72), PdfValue::Integer(700)]),
                op("TL", vec![PdfValue::Integer(12)]),
                op("Tj", vec![s("Step 5: Torque bolt")]),
                op("'", vec![s("to 25 in-lb")]),
                op("ET", vec![]),
            ],
        };

        let out = extract_page_fragments(&backend, (1, 0)).unwrap();
        assert_eq!(out, vec!["Step 5: Torque bolt\nto 25 in-lb\n".to_string()]);
    }
}
