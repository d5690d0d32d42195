// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! Edit operations over flow snapshots.
//!
//! Every edit takes the current snapshot by reference and returns a new one;
//! callers push the result onto history. Snapshots already in history are
//! never touched, which keeps undo/redo a pointer move.

use std::collections::BTreeSet;
use std::fmt;

use crate::graph::forward_edge_id;
use crate::model::{EdgeId, FlowEdge, FlowState, Handle, NodeId, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    MoveNode {
        node_id: NodeId,
        position: Position,
    },
    SetNodeLabel {
        node_id: NodeId,
        label: String,
    },
    /// A hand-drawn connection between two existing nodes.
    Connect {
        source: NodeId,
        source_handle: Handle,
        target: NodeId,
        target_handle: Handle,
    },
    /// Re-anchors an existing edge onto new endpoints, keeping its id.
    ReconnectEdge {
        edge_id: EdgeId,
        source: NodeId,
        source_handle: Handle,
        target: NodeId,
        target_handle: Handle,
    },
    RemoveEdge {
        edge_id: EdgeId,
    },
    /// Removes the selected nodes and edges plus every edge touching a
    /// removed node, as one atomic edit.
    RemoveSelection {
        node_ids: Vec<NodeId>,
        edge_ids: Vec<EdgeId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    NodeNotFound { node_id: NodeId },
    EdgeNotFound { edge_id: EdgeId },
    DuplicateEdge { edge_id: EdgeId },
    EmptySelection,
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => write!(f, "node not found (id={node_id})"),
            Self::EdgeNotFound { edge_id } => write!(f, "edge not found (id={edge_id})"),
            Self::DuplicateEdge { edge_id } => {
                write!(f, "an edge with id {edge_id} already exists")
            }
            Self::EmptySelection => f.write_str("selection is empty"),
        }
    }
}

impl std::error::Error for EditError {}

/// Applies one edit, producing a fresh snapshot.
pub fn apply_edit(state: &FlowState, op: &EditOp) -> Result<FlowState, EditError> {
    let mut next = state.clone();

    match op {
        EditOp::MoveNode { node_id, position } => {
            let node = next
                .node_mut(node_id)
                .ok_or_else(|| EditError::NodeNotFound { node_id: node_id.clone() })?;
            node.set_position(*position);
        }
        EditOp::SetNodeLabel { node_id, label } => {
            let node = next
                .node_mut(node_id)
                .ok_or_else(|| EditError::NodeNotFound { node_id: node_id.clone() })?;
            node.set_label(label.clone());
        }
        EditOp::Connect {
            source,
            source_handle,
            target,
            target_handle,
        } => {
            for node_id in [source, target] {
                if !next.contains_node(node_id) {
                    return Err(EditError::NodeNotFound { node_id: node_id.clone() });
                }
            }
            let edge_id = forward_edge_id(source, target);
            if next.contains_edge(&edge_id) {
                return Err(EditError::DuplicateEdge { edge_id });
            }
            next.edges_mut().push(FlowEdge::new(
                edge_id,
                source.clone(),
                *source_handle,
                target.clone(),
                *target_handle,
                None,
            ));
        }
        EditOp::ReconnectEdge {
            edge_id,
            source,
            source_handle,
            target,
            target_handle,
        } => {
            for node_id in [source, target] {
                if !next.contains_node(node_id) {
                    return Err(EditError::NodeNotFound { node_id: node_id.clone() });
                }
            }
            let edge = next
                .edge_mut(edge_id)
                .ok_or_else(|| EditError::EdgeNotFound { edge_id: edge_id.clone() })?;
            edge.set_endpoints(source.clone(), *source_handle, target.clone(), *target_handle);
        }
        EditOp::RemoveEdge { edge_id } => {
            if !next.contains_edge(edge_id) {
                return Err(EditError::EdgeNotFound { edge_id: edge_id.clone() });
            }
            next.edges_mut().retain(|edge| edge.edge_id() != edge_id);
        }
        EditOp::RemoveSelection { node_ids, edge_ids } => {
            if node_ids.is_empty() && edge_ids.is_empty() {
                return Err(EditError::EmptySelection);
            }
            let node_set: BTreeSet<&NodeId> = node_ids.iter().collect();
            let edge_set: BTreeSet<&EdgeId> = edge_ids.iter().collect();
            next.nodes_mut().retain(|node| !node_set.contains(node.node_id()));
            next.edges_mut().retain(|edge| {
                !edge_set.contains(edge.edge_id())
                    && !node_set.contains(edge.source())
                    && !node_set.contains(edge.target())
            });
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests;
