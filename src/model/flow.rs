// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

use super::ids::{EdgeId, NodeId};
use super::task::{NodeShape, TaskKind};

/// A node position in diagram pixel space.
///
/// Pixel coordinates are integral: generated layout stacks nodes at fixed
/// offsets and manual moves go through grid snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Rounds both coordinates to the nearest multiple of `grid`.
    pub fn snapped(self, grid: i64) -> Self {
        if grid <= 1 {
            return self;
        }
        Self {
            x: snap_coord(self.x, grid),
            y: snap_coord(self.y, grid),
        }
    }
}

fn snap_coord(value: i64, grid: i64) -> i64 {
    let rem = value.rem_euclid(grid);
    let down = value - rem;
    if rem * 2 >= grid {
        down + grid
    } else {
        down
    }
}

/// Connection points on a node, matching the rendered anchor layout:
/// target on top, sources on the bottom, right and left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Top,
    SourceBottom,
    SourceRight,
    SourceLeft,
}

impl Handle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "t",
            Self::SourceBottom => "sb",
            Self::SourceRight => "sr",
            Self::SourceLeft => "sl",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    node_id: NodeId,
    position: Position,
    label: String,
    group: Option<String>,
    verb: Option<String>,
    kind: TaskKind,
    shape: NodeShape,
}

impl FlowNode {
    pub fn new(
        node_id: NodeId,
        position: Position,
        label: impl Into<String>,
        kind: TaskKind,
        shape: NodeShape,
    ) -> Self {
        Self {
            node_id,
            position,
            label: label.into(),
            group: None,
            verb: None,
            kind,
            shape,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn set_group<T: Into<String>>(&mut self, group: Option<T>) {
        self.group = group.map(Into::into);
    }

    pub fn verb(&self) -> Option<&str> {
        self.verb.as_deref()
    }

    pub fn set_verb<T: Into<String>>(&mut self, verb: Option<T>) {
        self.verb = verb.map(Into::into);
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn shape(&self) -> NodeShape {
        self.shape
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    edge_id: EdgeId,
    source: NodeId,
    source_handle: Handle,
    target: NodeId,
    target_handle: Handle,
    label: Option<String>,
}

impl FlowEdge {
    /// The only connector style the renderer draws; kept on the wire so a
    /// consuming renderer can pick its edge type.
    pub const CONNECTOR: &'static str = "smoothstep";

    pub fn new(
        edge_id: EdgeId,
        source: NodeId,
        source_handle: Handle,
        target: NodeId,
        target_handle: Handle,
        label: Option<String>,
    ) -> Self {
        Self {
            edge_id,
            source,
            source_handle,
            target,
            target_handle,
            label,
        }
    }

    pub fn edge_id(&self) -> &EdgeId {
        &self.edge_id
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn source_handle(&self) -> Handle {
        self.source_handle
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn target_handle(&self) -> Handle {
        self.target_handle
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_endpoints(
        &mut self,
        source: NodeId,
        source_handle: Handle,
        target: NodeId,
        target_handle: Handle,
    ) {
        self.source = source;
        self.source_handle = source_handle;
        self.target = target;
        self.target_handle = target_handle;
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }
}

/// One immutable snapshot of the diagram: ordered nodes plus ordered edges.
///
/// Snapshots are the unit of undo/redo history. Edits never mutate a pushed
/// snapshot; they clone, change and push a new one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowState {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
}

impl FlowState {
    pub fn new(nodes: Vec<FlowNode>, edges: Vec<FlowEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<FlowNode> {
        &mut self.nodes
    }

    pub fn edges_mut(&mut self) -> &mut Vec<FlowEdge> {
        &mut self.edges
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| node.node_id() == node_id)
    }

    pub fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut FlowNode> {
        self.nodes.iter_mut().find(|node| node.node_id() == node_id)
    }

    pub fn edge(&self, edge_id: &EdgeId) -> Option<&FlowEdge> {
        self.edges.iter().find(|edge| edge.edge_id() == edge_id)
    }

    pub fn edge_mut(&mut self, edge_id: &EdgeId) -> Option<&mut FlowEdge> {
        self.edges.iter_mut().find(|edge| edge.edge_id() == edge_id)
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.node(node_id).is_some()
    }

    pub fn contains_edge(&self, edge_id: &EdgeId) -> bool {
        self.edge(edge_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
