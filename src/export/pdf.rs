// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! PDF export: a single vector page built object by object.
//!
//! The page is sized to the diagram (orientation follows the content), with
//! an uncompressed content stream and the built-in Helvetica font, so no
//! embedded resources are needed.

use std::io::Write as _;

use crate::model::{FlowEdge, FlowNode, FlowState, Handle, NodeShape};
use crate::render::flowchart::{display_label, node_box_px, pixel_frame, PixelFrame};

use super::{Palette, Rgb};

/// Diagram pixels are 96 dpi, PDF points are 72 dpi.
const PX_TO_PT: f64 = 0.75;
const FONT_SIZE_PT: f64 = 10.0;
const LANE_PX: i64 = 16;
const APPROACH_PX: i64 = 24;
const BRANCH_ENTRY_PX: i64 = 16;

/// Serializes a snapshot to a single-page PDF document.
pub fn to_pdf(state: &FlowState, palette: &Palette) -> Vec<u8> {
    let frame = pixel_frame(state);
    let page_w = frame.width() as f64 * PX_TO_PT;
    let page_h = frame.height() as f64 * PX_TO_PT;

    let content = content_stream(state, &frame, palette, page_h);

    let mut doc = PdfBuilder::new();
    doc.object(b"<< /Type /Catalog /Pages 2 0 R >>");
    doc.object(b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    doc.object(
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {page_w:.2} {page_h:.2}] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
        )
        .as_bytes(),
    );
    doc.stream_object(&content);
    doc.object(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>");
    doc.finish()
}

struct Pt {
    x: f64,
    y: f64,
}

/// Diagram pixel point to page point; PDF's origin is bottom-left.
fn pt(x: i64, y: i64, page_h: f64) -> Pt {
    Pt {
        x: x as f64 * PX_TO_PT,
        y: page_h - y as f64 * PX_TO_PT,
    }
}

fn set_fill(out: &mut Vec<u8>, color: Rgb) {
    let _ = writeln!(
        out,
        "{:.3} {:.3} {:.3} rg",
        color.r as f64 / 255.0,
        color.g as f64 / 255.0,
        color.b as f64 / 255.0,
    );
}

fn set_stroke(out: &mut Vec<u8>, color: Rgb) {
    let _ = writeln!(
        out,
        "{:.3} {:.3} {:.3} RG",
        color.r as f64 / 255.0,
        color.g as f64 / 255.0,
        color.b as f64 / 255.0,
    );
}

/// Escapes a label into PDF literal-string bytes.
///
/// The stream is decoded one byte per glyph, so Latin-1 characters must be
/// emitted as their single byte, never as UTF-8.
fn escape_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' => out.extend_from_slice(b"\\("),
            ')' => out.extend_from_slice(b"\\)"),
            '\\' => out.extend_from_slice(b"\\\\"),
            ch if (ch as u32) < 256 => out.push(ch as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

struct NodeBox {
    x: i64,
    y: i64,
    w: i64,
    h: i64,
}

impl NodeBox {
    fn of(frame: &PixelFrame, node: &FlowNode) -> Self {
        let (x, y) = frame.node_origin(node);
        let (w, h) = node_box_px(node.label());
        Self { x, y, w, h }
    }

    fn center_x(&self) -> i64 {
        self.x + self.w / 2
    }

    fn center_y(&self) -> i64 {
        self.y + self.h / 2
    }
}

fn content_stream(state: &FlowState, frame: &PixelFrame, palette: &Palette, page_h: f64) -> Vec<u8> {
    let mut out = Vec::new();

    set_fill(&mut out, palette.background);
    let _ = writeln!(
        out,
        "0 0 {:.2} {:.2} re f",
        frame.width() as f64 * PX_TO_PT,
        frame.height() as f64 * PX_TO_PT,
    );

    set_stroke(&mut out, palette.ink);
    set_fill(&mut out, palette.ink);
    out.extend_from_slice(b"1.2 w\n");

    for edge in state.edges() {
        let (Some(source), Some(target)) = (state.node(edge.source()), state.node(edge.target()))
        else {
            continue;
        };
        write_edge(
            &mut out,
            edge,
            &NodeBox::of(frame, source),
            &NodeBox::of(frame, target),
            page_h,
        );
    }

    for node in state.nodes() {
        write_node(&mut out, node, &NodeBox::of(frame, node), page_h);
    }

    out
}

fn polyline(out: &mut Vec<u8>, points: &[(i64, i64)], page_h: f64, close: bool) {
    for (i, &(x, y)) in points.iter().enumerate() {
        let p = pt(x, y, page_h);
        let op = if i == 0 { "m" } else { "l" };
        let _ = writeln!(out, "{:.2} {:.2} {op}", p.x, p.y);
    }
    out.extend_from_slice(if close { b"s\n" } else { b"S\n" });
}

fn write_node(out: &mut Vec<u8>, node: &FlowNode, rect: &NodeBox, page_h: f64) {
    match node.shape() {
        // Pill and wave reduce to rectangles in print output.
        NodeShape::Process | NodeShape::Pill | NodeShape::Wave => {
            let p = pt(rect.x, rect.y + rect.h, page_h);
            let _ = writeln!(
                out,
                "{:.2} {:.2} {:.2} {:.2} re S",
                p.x,
                p.y,
                rect.w as f64 * PX_TO_PT,
                rect.h as f64 * PX_TO_PT,
            );
        }
        NodeShape::Diamond => {
            polyline(
                out,
                &[
                    (rect.center_x(), rect.y),
                    (rect.x + rect.w, rect.center_y()),
                    (rect.center_x(), rect.y + rect.h),
                    (rect.x, rect.center_y()),
                ],
                page_h,
                true,
            );
        }
    }

    // Roughly centered; Helvetica averages half the font size per glyph.
    let label = escape_text(&display_label(node.label()));
    let text_w = label.len() as f64 * FONT_SIZE_PT * 0.5;
    let center = pt(rect.center_x(), rect.center_y(), page_h);
    let _ = write!(
        out,
        "BT /F1 {FONT_SIZE_PT:.0} Tf {:.2} {:.2} Td (",
        center.x - text_w / 2.0,
        center.y - FONT_SIZE_PT * 0.35,
    );
    out.extend_from_slice(&label);
    out.extend_from_slice(b") Tj ET\n");
}

fn write_edge(out: &mut Vec<u8>, edge: &FlowEdge, source: &NodeBox, target: &NodeBox, page_h: f64) {
    let approach_y = target.y - APPROACH_PX;
    let entry_x = match edge.source_handle() {
        Handle::SourceRight => target.center_x() + BRANCH_ENTRY_PX,
        Handle::SourceLeft => target.center_x() - BRANCH_ENTRY_PX,
        _ => target.center_x(),
    };

    let (points, label_at): (Vec<(i64, i64)>, Option<(i64, i64)>) = match edge.source_handle() {
        Handle::SourceRight => {
            let lane = source.x + source.w + LANE_PX;
            (
                vec![
                    (source.x + source.w, source.center_y()),
                    (lane, source.center_y()),
                    (lane, approach_y),
                    (entry_x, approach_y),
                    (entry_x, target.y),
                ],
                Some((lane + 6, source.center_y() - 10)),
            )
        }
        Handle::SourceLeft => {
            let lane = source.x - LANE_PX;
            (
                vec![
                    (source.x, source.center_y()),
                    (lane, source.center_y()),
                    (lane, approach_y),
                    (entry_x, approach_y),
                    (entry_x, target.y),
                ],
                Some((lane - 28, source.center_y() - 10)),
            )
        }
        _ => {
            let start = (source.center_x(), source.y + source.h);
            let points = if approach_y >= start.1 {
                vec![start, (start.0, approach_y), (entry_x, approach_y), (entry_x, target.y)]
            } else {
                let lane = (source.x + source.w).max(target.x + target.w) + LANE_PX;
                vec![
                    start,
                    (lane, start.1),
                    (lane, approach_y),
                    (entry_x, approach_y),
                    (entry_x, target.y),
                ]
            };
            (points, edge.label().map(|_| (start.0 + 6, start.1 + 16)))
        }
    };

    polyline(out, &points, page_h, false);

    // Arrowhead at the target's top border.
    polyline(
        out,
        &[(entry_x - 4, target.y - 7), (entry_x, target.y), (entry_x + 4, target.y - 7)],
        page_h,
        false,
    );

    if let (Some(label), Some((x, y))) = (edge.label(), label_at) {
        let p = pt(x, y, page_h);
        let _ = write!(out, "BT /F1 {FONT_SIZE_PT:.0} Tf {:.2} {:.2} Td (", p.x, p.y);
        out.extend_from_slice(&escape_text(label));
        out.extend_from_slice(b") Tj ET\n");
    }
}

/// Accumulates numbered objects and writes the xref table at the end.
struct PdfBuilder {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfBuilder {
    fn new() -> Self {
        Self {
            // The binary comment line keeps transports from treating the
            // file as text.
            buf: b"%PDF-1.4\n%\xc3\xa4\xc3\xbc\xc3\xb6\n".to_vec(),
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, body: &[u8]) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream_object(&mut self, stream: &[u8]) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf.extend_from_slice(
            format!("{id} 0 obj\n<< /Length {} >>\nstream\n", stream.len()).as_bytes(),
        );
        self.buf.extend_from_slice(stream);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.buf.len();
        let count = self.offsets.len() + 1;
        self.buf
            .extend_from_slice(format!("xref\n0 {count}\n0000000000 65535 f \n").as_bytes());
        for offset in &self.offsets {
            self.buf
                .extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        self.buf.extend_from_slice(
            format!(
                "trailer\n<< /Size {count} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
            )
            .as_bytes(),
        );
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_text, to_pdf};
    use crate::export::Palette;
    use crate::graph::build_flow;
    use crate::parse::parse_tasks;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }

    #[test]
    fn escapes_pdf_string_delimiters() {
        assert_eq!(escape_text("plan (v2)"), b"plan \\(v2\\)".to_vec());
        assert_eq!(escape_text("a\\b"), b"a\\\\b".to_vec());
    }

    #[test]
    fn labels_encode_as_latin1_single_bytes() {
        assert_eq!(escape_text("Café"), b"Caf\xe9".to_vec());
        assert_eq!(escape_text("日程"), b"??".to_vec());

        let state = build_flow(&parse_tasks("Café break"), true);
        let bytes = to_pdf(&state, &Palette::dark());
        assert!(contains(&bytes, b"(Caf\xe9 break) Tj"));
        // Never the UTF-8 two-byte sequence inside the literal string.
        assert!(!contains(&bytes, "é".as_bytes()));
    }

    #[test]
    fn document_has_header_page_and_trailer() {
        let state = build_flow(&parse_tasks("Draft plan\nShip it"), true);
        let bytes = to_pdf(&state, &Palette::dark());
        let text = String::from_utf8_lossy(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(text.contains("/Type /Page "));
        assert!(text.contains("/BaseFont /Helvetica"));
        assert!(text.contains("(Draft plan) Tj"));
        assert!(text.contains("startxref"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn page_size_follows_the_diagram_bounds() {
        let tall = build_flow(&parse_tasks("One\nTwo\nThree\nFour\nFive"), true);
        let bytes = to_pdf(&tall, &Palette::light());
        let text = String::from_utf8_lossy(&bytes);

        let media_box = text
            .split("/MediaBox [0 0 ")
            .nth(1)
            .and_then(|rest| rest.split(']').next())
            .expect("media box");
        let dims: Vec<f64> = media_box
            .split_whitespace()
            .map(|v| v.parse().expect("dim"))
            .collect();
        assert!(dims[1] > dims[0], "five stacked nodes make a portrait page");
    }

    #[test]
    fn xref_offsets_point_at_object_headers() {
        let state = build_flow(&parse_tasks("Ship it"), true);
        let bytes = to_pdf(&state, &Palette::dark());
        let text = String::from_utf8_lossy(&bytes);

        let xref = text.split("xref\n").nth(1).expect("xref section");
        // Skip the `0 6` count line and the free-list entry.
        for (index, line) in xref.lines().skip(2).take(5).enumerate() {
            let offset: usize = line[..10].parse().expect("offset");
            let header = format!("{} 0 obj", index + 1);
            assert!(
                text[offset..].starts_with(&header),
                "object {} offset mismatch",
                index + 1,
            );
        }
    }
}
