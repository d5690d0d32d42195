// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! SVG export: nodes, orthogonal connectors and labels in diagram pixels.

use std::fmt::Write as _;

use crate::model::{FlowEdge, FlowNode, FlowState, Handle, NodeShape};
use crate::render::flowchart::{display_label, node_box_px, pixel_frame, PixelFrame};

use super::Palette;

const FONT_SIZE: i64 = 13;
const LANE_PX: i64 = 16;
const APPROACH_PX: i64 = 24;
const BRANCH_ENTRY_PX: i64 = 16;

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
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

/// Serializes a snapshot to a standalone SVG document.
pub fn to_svg(state: &FlowState, palette: &Palette) -> String {
    let frame = pixel_frame(state);
    let ink = palette.ink.hex();

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = frame.width(),
        h = frame.height(),
    );
    let _ = writeln!(
        out,
        r#"  <defs><marker id="arrow" markerWidth="8" markerHeight="8" refX="4" refY="7" orient="auto"><path d="M0,0 L8,0 L4,7 Z" fill="{ink}"/></marker></defs>"#,
    );
    let _ = writeln!(
        out,
        r#"  <rect width="100%" height="100%" fill="{}"/>"#,
        palette.background.hex(),
    );

    for edge in state.edges() {
        let (Some(source), Some(target)) = (state.node(edge.source()), state.node(edge.target()))
        else {
            continue;
        };
        write_edge(
            &mut out,
            edge,
            &NodeBox::of(&frame, source),
            &NodeBox::of(&frame, target),
            &ink,
        );
    }

    for node in state.nodes() {
        write_node(&mut out, node, &NodeBox::of(&frame, node), &ink);
    }

    out.push_str("</svg>\n");
    out
}

fn write_node(out: &mut String, node: &FlowNode, rect: &NodeBox, ink: &str) {
    match node.shape() {
        NodeShape::Process => {
            let _ = writeln!(
                out,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{ink}" stroke-width="1.5"/>"#,
                rect.x, rect.y, rect.w, rect.h,
            );
        }
        NodeShape::Pill => {
            let _ = writeln!(
                out,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="none" stroke="{ink}" stroke-width="1.5"/>"#,
                rect.x,
                rect.y,
                rect.w,
                rect.h,
                rect.h / 2,
            );
        }
        NodeShape::Wave => {
            let (x, y, w, h) = (rect.x, rect.y, rect.w, rect.h);
            let _ = writeln!(
                out,
                r#"  <path d="M{x},{y} h{w} v{vh} q{qa},8 {qb},0 q{qa},-8 {qb},0 z" fill="none" stroke="{ink}" stroke-width="1.5"/>"#,
                vh = h - 4,
                qa = -w / 8,
                qb = -w / 2,
            );
        }
        NodeShape::Diamond => {
            let _ = writeln!(
                out,
                r#"  <polygon points="{cx},{y} {xr},{cy} {cx},{yb} {x},{cy}" fill="none" stroke="{ink}" stroke-width="1.5"/>"#,
                cx = rect.center_x(),
                y = rect.y,
                xr = rect.x + rect.w,
                cy = rect.center_y(),
                yb = rect.y + rect.h,
                x = rect.x,
            );
        }
    }

    let _ = writeln!(
        out,
        r#"  <text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" font-family="monospace" font-size="{FONT_SIZE}" fill="{ink}">{}</text>"#,
        rect.center_x(),
        rect.center_y(),
        escape_xml(&display_label(node.label())),
    );
}

fn write_edge(out: &mut String, edge: &FlowEdge, source: &NodeBox, target: &NodeBox, ink: &str) {
    let approach_y = target.y - APPROACH_PX;
    let (path, label_at) = match edge.source_handle() {
        Handle::SourceRight => {
            let lane = source.x + source.w + LANE_PX;
            let entry_x = target.center_x() + BRANCH_ENTRY_PX;
            (
                format!(
                    "M{},{} H{lane} V{approach_y} H{entry_x} V{}",
                    source.x + source.w,
                    source.center_y(),
                    target.y,
                ),
                Some((lane + 6, source.center_y() - 6)),
            )
        }
        Handle::SourceLeft => {
            let lane = source.x - LANE_PX;
            let entry_x = target.center_x() - BRANCH_ENTRY_PX;
            (
                format!(
                    "M{},{} H{lane} V{approach_y} H{entry_x} V{}",
                    source.x,
                    source.center_y(),
                    target.y,
                ),
                Some((lane - 28, source.center_y() - 6)),
            )
        }
        _ => {
            let start_x = source.center_x();
            let start_y = source.y + source.h;
            let entry_x = target.center_x();
            let path = if approach_y >= start_y {
                format!("M{start_x},{start_y} V{approach_y} H{entry_x} V{}", target.y)
            } else {
                let lane = (source.x + source.w).max(target.x + target.w) + LANE_PX;
                format!(
                    "M{start_x},{start_y} H{lane} V{approach_y} H{entry_x} V{}",
                    target.y,
                )
            };
            (path, edge.label().map(|_| (start_x + 6, start_y + 14)))
        }
    };

    let _ = writeln!(
        out,
        r#"  <path d="{path}" fill="none" stroke="{ink}" stroke-width="1.5" marker-end="url(#arrow)"/>"#,
    );
    if let (Some(label), Some((x, y))) = (edge.label(), label_at) {
        let _ = writeln!(
            out,
            r#"  <text x="{x}" y="{y}" font-family="monospace" font-size="{FONT_SIZE}" fill="{ink}">{}</text>"#,
            escape_xml(label),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_xml, to_svg};
    use crate::export::Palette;
    use crate::graph::build_flow;
    use crate::parse::parse_tasks;

    #[test]
    fn escapes_markup_in_labels() {
        assert_eq!(escape_xml("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn document_has_background_nodes_and_connectors() {
        let state = build_flow(&parse_tasks("Draft <plan>\nIF approved THEN Ship ELSE Rework\nShip it"), true);
        let svg = to_svg(&state, &Palette::dark());

        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r##"fill="#0f172a""##));
        assert!(svg.contains("Draft &lt;plan&gt;"));
        assert!(svg.contains("<polygon"), "decision renders as a diamond");
        assert!(svg.contains("marker-end=\"url(#arrow)\""));
        assert!(svg.contains(">Yes</text>"));
        assert!(svg.contains(">No</text>"));
    }

    #[test]
    fn long_labels_are_truncated_to_their_box() {
        let long = "x".repeat(60);
        let state = build_flow(&parse_tasks(&long), true);
        let svg = to_svg(&state, &Palette::dark());

        assert!(!svg.contains(&long));
        assert!(svg.contains('…'));
    }

    #[test]
    fn light_palette_switches_the_background() {
        let state = build_flow(&parse_tasks("Ship it"), true);
        let svg = to_svg(&state, &Palette::light());
        assert!(svg.contains(r##"fill="#f8fafc""##));
    }
}
