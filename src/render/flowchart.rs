// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! Draws a flow snapshot onto a character canvas at its stored positions.
//!
//! One canvas cell covers 8×16 diagram pixels (a terminal font cell), so the
//! text canvas, the SVG/PDF geometry and the PNG raster all agree on where
//! things are. Rendering is total: it clips rather than fails.

use std::collections::BTreeMap;

use crate::model::{EdgeId, FlowEdge, FlowNode, FlowState, Handle, NodeId, NodeShape};

use super::text::{canvas_to_string_trimmed, truncate_with_ellipsis};
use super::{Canvas, CellRect, LineSpan, ARROW_DOWN};

/// Diagram pixels covered by one canvas cell, horizontally.
pub const CELL_W_PX: i64 = 8;
/// Diagram pixels covered by one canvas cell, vertically.
pub const CELL_H_PX: i64 = 16;

/// Node boxes are three rows tall: border, label, border.
pub const BOX_ROWS: usize = 3;

const MIN_BOX_COLS: usize = 7;
const MAX_BOX_COLS: usize = 40;

const MARGIN_LEFT: usize = 6;
const MARGIN_TOP: usize = 2;
const MARGIN_RIGHT: usize = 6;
const MARGIN_BOTTOM: usize = 2;

/// Render output plus the cell index used for selection highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedFlow {
    pub text: String,
    pub width: usize,
    pub height: usize,
    pub node_rects: BTreeMap<NodeId, CellRect>,
    pub edge_spans: BTreeMap<EdgeId, Vec<LineSpan>>,
}

/// Width of a node box in cells for the given label.
pub fn box_cols(label: &str) -> usize {
    (label.chars().count() + 4).clamp(MIN_BOX_COLS, MAX_BOX_COLS)
}

/// Pixel size of a node box, shared with the vector exporters.
pub fn node_box_px(label: &str) -> (i64, i64) {
    (box_cols(label) as i64 * CELL_W_PX, BOX_ROWS as i64 * CELL_H_PX)
}

/// Label as drawn inside its box. The box width is capped, so the shown
/// text is too; the vector exporters share this cap.
pub fn display_label(label: &str) -> String {
    truncate_with_ellipsis(label, box_cols(label).saturating_sub(4))
}

/// The pixel-space frame around a snapshot: overall bounds plus the offset
/// that maps stored node positions into frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFrame {
    width: i64,
    height: i64,
    origin_x: i64,
    origin_y: i64,
}

impl PixelFrame {
    pub fn width(&self) -> i64 {
        self.width
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    /// Top-left corner of a node's box within the frame.
    pub fn node_origin(&self, node: &FlowNode) -> (i64, i64) {
        (
            node.position().x - self.origin_x + MARGIN_LEFT as i64 * CELL_W_PX,
            node.position().y - self.origin_y + MARGIN_TOP as i64 * CELL_H_PX,
        )
    }
}

/// Computes the pixel bounds of a snapshot, margins included.
pub fn pixel_frame(state: &FlowState) -> PixelFrame {
    let origin_x = state.nodes().iter().map(|n| n.position().x).min().unwrap_or(0);
    let origin_y = state.nodes().iter().map(|n| n.position().y).min().unwrap_or(0);

    let mut width = 0;
    let mut height = 0;
    for node in state.nodes() {
        let (box_w, box_h) = node_box_px(node.label());
        width = width.max(node.position().x - origin_x + box_w);
        height = height.max(node.position().y - origin_y + box_h);
    }

    PixelFrame {
        width: width + (MARGIN_LEFT + MARGIN_RIGHT) as i64 * CELL_W_PX,
        height: height + (MARGIN_TOP + MARGIN_BOTTOM) as i64 * CELL_H_PX,
        origin_x,
        origin_y,
    }
}

#[derive(Debug, Clone, Copy)]
struct NodeRect {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl NodeRect {
    fn center_x(self) -> usize {
        (self.x0 + self.x1) / 2
    }

    fn mid_y(self) -> usize {
        self.y0 + 1
    }

    fn as_cell_rect(self) -> CellRect {
        (self.x0, self.y0, self.x1, self.y1)
    }
}

/// Renders a snapshot to text plus highlight geometry.
pub fn render_flow(state: &FlowState) -> RenderedFlow {
    if state.nodes().is_empty() {
        return RenderedFlow::default();
    }

    let min_x = state.nodes().iter().map(|n| n.position().x).min().unwrap_or(0);
    let min_y = state.nodes().iter().map(|n| n.position().y).min().unwrap_or(0);

    let mut rects = BTreeMap::<NodeId, NodeRect>::new();
    let mut width = 0usize;
    let mut height = 0usize;
    for node in state.nodes() {
        let cx = ((node.position().x - min_x) / CELL_W_PX) as usize + MARGIN_LEFT;
        let cy = ((node.position().y - min_y) / CELL_H_PX) as usize + MARGIN_TOP;
        let cols = box_cols(node.label());
        let rect = NodeRect {
            x0: cx,
            y0: cy,
            x1: cx + cols - 1,
            y1: cy + BOX_ROWS - 1,
        };
        width = width.max(rect.x1 + 1 + MARGIN_RIGHT);
        height = height.max(rect.y1 + 1 + MARGIN_BOTTOM);
        rects.insert(node.node_id().clone(), rect);
    }

    let mut canvas = match Canvas::new(width, height) {
        Ok(canvas) => canvas,
        Err(_) => return RenderedFlow::default(),
    };

    // Edges first; boxes draw over any line that would cut through them.
    let mut edge_spans = BTreeMap::<EdgeId, Vec<LineSpan>>::new();
    for edge in state.edges() {
        let (Some(source), Some(target)) = (rects.get(edge.source()), rects.get(edge.target()))
        else {
            continue;
        };
        let spans = draw_edge(&mut canvas, edge, *source, *target);
        edge_spans.insert(edge.edge_id().clone(), spans);
    }

    for node in state.nodes() {
        // Present by construction.
        if let Some(rect) = rects.get(node.node_id()) {
            draw_node(&mut canvas, node, *rect);
        }
    }

    // Arrowheads last so box borders do not cover entry points.
    for edge in state.edges() {
        if let (Some(target), true) = (rects.get(edge.target()), edge_spans.contains_key(edge.edge_id())) {
            let entry_x = entry_x_for(edge, *target);
            canvas.put(entry_x, target.y0.saturating_sub(1), ARROW_DOWN);
        }
    }

    RenderedFlow {
        text: canvas_to_string_trimmed(&canvas),
        width,
        height,
        node_rects: rects
            .into_iter()
            .map(|(id, rect)| (id, rect.as_cell_rect()))
            .collect(),
        edge_spans,
    }
}

/// Entry column on the target's top border. Branch edges enter off-center so
/// the Yes/No and forward connectors of one node stay distinguishable.
fn entry_x_for(edge: &FlowEdge, target: NodeRect) -> usize {
    let center = target.center_x();
    let offset = match edge.source_handle() {
        Handle::SourceRight => center + 2,
        Handle::SourceLeft => center.saturating_sub(2),
        _ => center,
    };
    offset.clamp(target.x0 + 1, target.x1.saturating_sub(1))
}

fn draw_edge(canvas: &mut Canvas, edge: &FlowEdge, source: NodeRect, target: NodeRect) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    let entry_x = entry_x_for(edge, target);
    let approach_y = target.y0.saturating_sub(2);

    match edge.source_handle() {
        Handle::SourceRight => {
            let lane = source.x1 + 2;
            trace_h(canvas, &mut spans, source.x1 + 1, lane, source.mid_y());
            trace_v(canvas, &mut spans, lane, source.mid_y(), approach_y);
            trace_h(canvas, &mut spans, lane, entry_x, approach_y);
            if let Some(label) = edge.label() {
                canvas.put_str(lane + 2, source.mid_y(), label);
            }
        }
        Handle::SourceLeft => {
            let lane = source.x0.saturating_sub(3);
            trace_h(canvas, &mut spans, lane, source.x0.saturating_sub(1), source.mid_y());
            trace_v(canvas, &mut spans, lane, source.mid_y(), approach_y);
            trace_h(canvas, &mut spans, lane, entry_x, approach_y);
            if let Some(label) = edge.label() {
                let label_x = lane.saturating_sub(label.chars().count() + 1);
                canvas.put_str(label_x, source.mid_y(), label);
            }
        }
        _ => {
            // Bottom exit: straight down when the target sits below,
            // otherwise out to a side lane and back around.
            let start_x = source.center_x();
            let start_y = source.y1 + 1;
            if approach_y >= start_y {
                trace_v(canvas, &mut spans, start_x, start_y, approach_y);
                if entry_x != start_x {
                    trace_h(canvas, &mut spans, start_x, entry_x, approach_y);
                }
            } else {
                let lane = source.x1.max(target.x1) + 2;
                trace_h(canvas, &mut spans, start_x, lane, start_y);
                trace_v(canvas, &mut spans, lane, start_y, approach_y);
                trace_h(canvas, &mut spans, lane, entry_x, approach_y);
            }
            if let Some(label) = edge.label() {
                canvas.put_str(start_x + 2, start_y, label);
            }
        }
    }

    spans
}

fn trace_h(canvas: &mut Canvas, spans: &mut Vec<LineSpan>, x0: usize, x1: usize, y: usize) {
    canvas.hline(x0, x1, y);
    let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
    spans.push((y, min_x, max_x));
}

fn trace_v(canvas: &mut Canvas, spans: &mut Vec<LineSpan>, x: usize, y0: usize, y1: usize) {
    canvas.vline(x, y0, y1);
    let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
    for y in min_y..=max_y {
        spans.push((y, x, x));
    }
}

struct BoxGlyphs {
    tl: char,
    tr: char,
    bl: char,
    br: char,
    top: char,
    bottom: char,
    left: char,
    right: char,
}

fn glyphs(shape: NodeShape) -> BoxGlyphs {
    match shape {
        NodeShape::Process => BoxGlyphs {
            tl: '┌',
            tr: '┐',
            bl: '└',
            br: '┘',
            top: '─',
            bottom: '─',
            left: '│',
            right: '│',
        },
        NodeShape::Pill => BoxGlyphs {
            tl: '╭',
            tr: '╮',
            bl: '╰',
            br: '╯',
            top: '─',
            bottom: '─',
            left: '│',
            right: '│',
        },
        NodeShape::Wave => BoxGlyphs {
            tl: '┌',
            tr: '┐',
            bl: '└',
            br: '┘',
            top: '─',
            bottom: '~',
            left: '│',
            right: '│',
        },
        NodeShape::Diamond => BoxGlyphs {
            tl: '╱',
            tr: '╲',
            bl: '╲',
            br: '╱',
            top: '─',
            bottom: '─',
            left: '<',
            right: '>',
        },
    }
}

fn draw_node(canvas: &mut Canvas, node: &FlowNode, rect: NodeRect) {
    let g = glyphs(node.shape());

    canvas.put(rect.x0, rect.y0, g.tl);
    canvas.put(rect.x1, rect.y0, g.tr);
    canvas.put(rect.x0, rect.y1, g.bl);
    canvas.put(rect.x1, rect.y1, g.br);
    for x in rect.x0 + 1..rect.x1 {
        canvas.put(x, rect.y0, g.top);
        canvas.put(x, rect.y1, g.bottom);
    }

    let mid_y = rect.mid_y();
    canvas.put(rect.x0, mid_y, g.left);
    canvas.put(rect.x1, mid_y, g.right);
    for x in rect.x0 + 1..rect.x1 {
        canvas.put(x, mid_y, ' ');
    }

    let inner = rect.x1 - rect.x0 - 3;
    let label = display_label(node.label());
    let label_len = label.chars().count();
    let label_x = rect.x0 + 2 + (inner.saturating_sub(label_len)) / 2;
    canvas.put_str(label_x, mid_y, &label);
}

#[cfg(test)]
mod tests {
    use super::{box_cols, pixel_frame, render_flow};
    use crate::graph::build_flow;
    use crate::model::{FlowState, NodeId, Position};
    use crate::ops::{apply_edit, EditOp};
    use crate::parse::parse_tasks;

    fn nid(value: &str) -> NodeId {
        NodeId::new(value).expect("node id")
    }

    fn flow(text: &str) -> FlowState {
        build_flow(&parse_tasks(text), true)
    }

    #[test]
    fn empty_snapshot_renders_to_nothing() {
        let rendered = render_flow(&FlowState::default());
        assert!(rendered.text.is_empty());
        assert!(rendered.node_rects.is_empty());
        assert!(rendered.edge_spans.is_empty());
    }

    #[test]
    fn renders_labels_boxes_and_an_arrow_between_sequential_tasks() {
        let rendered = render_flow(&flow("Draft plan\nShip it"));

        assert!(rendered.text.contains("Draft plan"));
        assert!(rendered.text.contains("Ship it"));
        assert!(rendered.text.contains('▼'));
        assert_eq!(rendered.node_rects.len(), 2);
        assert_eq!(rendered.edge_spans.len(), 1);

        let first = rendered.node_rects[&nid("node-1")];
        let second = rendered.node_rects[&nid("node-2")];
        assert!(second.1 > first.3, "second box starts below the first");
    }

    #[test]
    fn decision_boxes_use_diamond_sides_and_branch_labels_appear() {
        let rendered = render_flow(&flow("Draft plan\nIF approved THEN Ship ELSE Rework\nShip it"));

        assert!(rendered.text.contains("< approved >") || rendered.text.contains("<approved>") || rendered.text.contains('<'));
        assert!(rendered.text.contains("Yes"));
        assert!(rendered.text.contains("No"));
    }

    #[test]
    fn pill_and_wave_shapes_get_distinct_borders() {
        let rendered = render_flow(&flow("Call the customer\nReport results"));
        assert!(rendered.text.contains('╭'));
        assert!(rendered.text.contains('~'));
    }

    #[test]
    fn moved_nodes_shift_their_box() {
        let state = flow("Draft plan\nShip it");
        let moved = apply_edit(
            &state,
            &EditOp::MoveNode {
                node_id: nid("node-2"),
                position: Position::new(320, 160),
            },
        )
        .expect("move");

        let rendered = render_flow(&moved);
        let first = rendered.node_rects[&nid("node-1")];
        let second = rendered.node_rects[&nid("node-2")];
        assert!(second.0 > first.0, "moved box shifts right");
    }

    #[test]
    fn box_cols_tracks_label_width_within_limits() {
        assert_eq!(box_cols(""), 7);
        assert_eq!(box_cols("Ship it"), 11);
        assert_eq!(box_cols(&"x".repeat(100)), 40);
    }

    #[test]
    fn display_label_truncates_only_past_the_box_cap() {
        assert_eq!(super::display_label("Ship it"), "Ship it");

        let shown = super::display_label(&"x".repeat(60));
        assert_eq!(shown.chars().count(), 36);
        assert!(shown.ends_with('…'));
    }

    #[test]
    fn pixel_frame_covers_every_box() {
        let state = flow("Draft plan\nShip it\nCollect feedback");
        let frame = pixel_frame(&state);

        for node in state.nodes() {
            let (x, y) = frame.node_origin(node);
            let (w, h) = super::node_box_px(node.label());
            assert!(x >= 0 && y >= 0);
            assert!(x + w <= frame.width());
            assert!(y + h <= frame.height());
        }
    }
}
