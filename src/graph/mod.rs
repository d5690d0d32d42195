// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! Graph builder: ordered task records → node/edge flow state.
//!
//! Edges are derived by folding over the task sequence while threading a
//! frontier of node ids whose outgoing edges have not been wired to a
//! successor yet. The fold is pure; the accumulator carries (nodes, edges,
//! frontier) and nothing else mutates across steps.

use smallvec::SmallVec;

use crate::model::{EdgeId, FlowEdge, FlowNode, FlowState, Handle, NodeId, ParsedTask, Position, TaskKind};

/// Vertical distance between stacked nodes, in diagram pixels.
pub const ROW_SPACING: i64 = 160;

/// Generated nodes share a single column; horizontal placement is manual.
pub const COLUMN_X: i64 = 0;

/// Ids are deterministic functions of (source, target, role), so repeated
/// generation from identical text is idempotent.
pub fn forward_edge_id(source: &NodeId, target: &NodeId) -> EdgeId {
    EdgeId::new(format!("{source}-{target}")).expect("forward edge id")
}

pub fn yes_edge_id(source: &NodeId, target: &NodeId) -> EdgeId {
    EdgeId::new(format!("{source}-{target}-yes")).expect("yes edge id")
}

pub fn no_edge_id(source: &NodeId, target: &NodeId) -> EdgeId {
    EdgeId::new(format!("{source}-{target}-no")).expect("no edge id")
}

type Frontier = SmallVec<[NodeId; 4]>;

#[derive(Debug, Default)]
struct BuildAcc {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    frontier: Frontier,
}

/// Builds a flow state from the ordered task sequence.
///
/// With `auto_connect` off only nodes are emitted; edge retention from a
/// previous state is the caller's contract (see [`regenerate`]).
pub fn build_flow(tasks: &[ParsedTask], auto_connect: bool) -> FlowState {
    let acc = tasks
        .iter()
        .enumerate()
        .fold(BuildAcc::default(), |acc, (ordinal, task)| {
            let next_id = tasks.get(ordinal + 1).map(|next| next.node_id().clone());
            step(acc, ordinal, task, next_id, auto_connect)
        });

    FlowState::new(acc.nodes, acc.edges)
}

fn step(
    mut acc: BuildAcc,
    ordinal: usize,
    task: &ParsedTask,
    next_id: Option<NodeId>,
    auto_connect: bool,
) -> BuildAcc {
    let node_id = task.node_id().clone();
    let position = Position::new(COLUMN_X, ordinal as i64 * ROW_SPACING);

    let mut node = FlowNode::new(node_id.clone(), position, task.label(), task.kind(), task.shape());
    node.set_group(task.group());
    node.set_verb(task.verb());
    acc.nodes.push(node);

    match task.kind() {
        TaskKind::Task => {
            if auto_connect {
                connect_frontier(&mut acc.edges, &acc.frontier, &node_id);
            }
            acc.frontier = frontier_of(node_id);
        }
        TaskKind::Decision => {
            // The pre-decision frontier is the candidate pool for the
            // branch-not-taken edge; capture it before wiring predecessors.
            let captured = acc.frontier.clone();
            if auto_connect {
                connect_frontier(&mut acc.edges, &acc.frontier, &node_id);

                if let Some(next_id) = next_id {
                    acc.edges.push(FlowEdge::new(
                        yes_edge_id(&node_id, &next_id),
                        node_id.clone(),
                        Handle::SourceRight,
                        next_id,
                        Handle::Top,
                        Some("Yes".to_owned()),
                    ));
                }

                // `No` loops back to the *last* captured predecessor only;
                // preserve this tie-break exactly.
                if let Some(no_target) = captured.last() {
                    acc.edges.push(FlowEdge::new(
                        no_edge_id(&node_id, no_target),
                        node_id.clone(),
                        Handle::SourceLeft,
                        no_target.clone(),
                        Handle::Top,
                        Some("No".to_owned()),
                    ));
                }
            }
            acc.frontier = frontier_of(node_id);
        }
    }

    acc
}

fn frontier_of(node_id: NodeId) -> Frontier {
    let mut frontier = Frontier::new();
    frontier.push(node_id);
    frontier
}

fn connect_frontier(edges: &mut Vec<FlowEdge>, frontier: &Frontier, target: &NodeId) {
    for source in frontier {
        edges.push(FlowEdge::new(
            forward_edge_id(source, target),
            source.clone(),
            Handle::SourceBottom,
            target.clone(),
            Handle::Top,
            None,
        ));
    }
}

/// Regeneration contract: nodes are replaced unconditionally; edges are
/// replaced when auto-connect is on and kept verbatim from the previous
/// state when it is off (preserving hand-drawn connections).
pub fn regenerate(prev: &FlowState, tasks: &[ParsedTask], auto_connect: bool) -> FlowState {
    let built = build_flow(tasks, auto_connect);
    if auto_connect {
        built
    } else {
        FlowState::new(built.nodes().to_vec(), prev.edges().to_vec())
    }
}
