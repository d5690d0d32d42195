// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

use super::{apply_edit, EditError, EditOp};
use crate::graph::build_flow;
use crate::model::{EdgeId, FlowState, Handle, NodeId, Position};
use crate::parse::parse_tasks;

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn eid(value: &str) -> EdgeId {
    EdgeId::new(value).expect("edge id")
}

fn three_step_flow() -> FlowState {
    build_flow(&parse_tasks("Draft plan\nBuild prototype\nShip it"), true)
}

#[test]
fn move_node_updates_position_without_touching_the_input() {
    let state = three_step_flow();
    let next = apply_edit(
        &state,
        &EditOp::MoveNode {
            node_id: nid("node-2"),
            position: Position::new(240, 160),
        },
    )
    .expect("move");

    assert_eq!(next.node(&nid("node-2")).expect("node").position(), Position::new(240, 160));
    // The prior snapshot stays as it was.
    assert_eq!(state.node(&nid("node-2")).expect("node").position(), Position::new(0, 160));
}

#[test]
fn move_node_rejects_unknown_id() {
    let state = three_step_flow();
    let err = apply_edit(
        &state,
        &EditOp::MoveNode {
            node_id: nid("node-9"),
            position: Position::default(),
        },
    )
    .expect_err("missing node");

    assert_eq!(err, EditError::NodeNotFound { node_id: nid("node-9") });
}

#[test]
fn set_node_label_replaces_the_label() {
    let state = three_step_flow();
    let next = apply_edit(
        &state,
        &EditOp::SetNodeLabel {
            node_id: nid("node-1"),
            label: "Draft the plan".to_owned(),
        },
    )
    .expect("relabel");

    assert_eq!(next.node(&nid("node-1")).expect("node").label(), "Draft the plan");
}

#[test]
fn connect_adds_a_hand_drawn_edge_with_derived_id() {
    let state = three_step_flow();
    let next = apply_edit(
        &state,
        &EditOp::Connect {
            source: nid("node-1"),
            source_handle: Handle::SourceBottom,
            target: nid("node-3"),
            target_handle: Handle::Top,
        },
    )
    .expect("connect");

    let edge = next.edge(&eid("node-1-node-3")).expect("edge");
    assert_eq!(edge.source().as_str(), "node-1");
    assert_eq!(edge.target().as_str(), "node-3");
    assert_eq!(edge.label(), None);
}

#[test]
fn connect_rejects_duplicates_and_unknown_endpoints() {
    let state = three_step_flow();

    let err = apply_edit(
        &state,
        &EditOp::Connect {
            source: nid("node-1"),
            source_handle: Handle::SourceBottom,
            target: nid("node-2"),
            target_handle: Handle::Top,
        },
    )
    .expect_err("duplicate");
    assert_eq!(err, EditError::DuplicateEdge { edge_id: eid("node-1-node-2") });

    let err = apply_edit(
        &state,
        &EditOp::Connect {
            source: nid("node-1"),
            source_handle: Handle::SourceBottom,
            target: nid("node-7"),
            target_handle: Handle::Top,
        },
    )
    .expect_err("unknown target");
    assert_eq!(err, EditError::NodeNotFound { node_id: nid("node-7") });
}

#[test]
fn reconnect_edge_moves_endpoints_and_keeps_the_id() {
    let state = three_step_flow();
    let next = apply_edit(
        &state,
        &EditOp::ReconnectEdge {
            edge_id: eid("node-1-node-2"),
            source: nid("node-1"),
            source_handle: Handle::SourceRight,
            target: nid("node-3"),
            target_handle: Handle::Top,
        },
    )
    .expect("reconnect");

    let edge = next.edge(&eid("node-1-node-2")).expect("edge");
    assert_eq!(edge.target().as_str(), "node-3");
    assert_eq!(edge.source_handle(), Handle::SourceRight);
}

#[test]
fn remove_edge_removes_only_that_edge() {
    let state = three_step_flow();
    assert_eq!(state.edges().len(), 2);

    let next = apply_edit(&state, &EditOp::RemoveEdge { edge_id: eid("node-1-node-2") })
        .expect("remove edge");

    assert_eq!(next.edges().len(), 1);
    assert!(next.contains_edge(&eid("node-2-node-3")));
    assert_eq!(next.nodes().len(), 3);
}

#[test]
fn remove_edge_rejects_unknown_id() {
    let state = three_step_flow();
    let err = apply_edit(&state, &EditOp::RemoveEdge { edge_id: eid("nope") })
        .expect_err("missing edge");
    assert_eq!(err, EditError::EdgeNotFound { edge_id: eid("nope") });
}

#[test]
fn remove_selection_drops_nodes_and_every_touching_edge() {
    let state = three_step_flow();
    let next = apply_edit(
        &state,
        &EditOp::RemoveSelection {
            node_ids: vec![nid("node-2")],
            edge_ids: Vec::new(),
        },
    )
    .expect("remove selection");

    assert_eq!(next.nodes().len(), 2);
    assert!(!next.contains_node(&nid("node-2")));
    // Both the incoming and the outgoing edge of node-2 are gone.
    assert!(next.edges().is_empty());
}

#[test]
fn remove_selection_with_edges_only_keeps_nodes() {
    let state = three_step_flow();
    let next = apply_edit(
        &state,
        &EditOp::RemoveSelection {
            node_ids: Vec::new(),
            edge_ids: vec![eid("node-2-node-3")],
        },
    )
    .expect("remove selection");

    assert_eq!(next.nodes().len(), 3);
    assert_eq!(next.edges().len(), 1);
    assert!(next.contains_edge(&eid("node-1-node-2")));
}

#[test]
fn remove_selection_ignores_ids_that_no_longer_exist() {
    let state = three_step_flow();
    let next = apply_edit(
        &state,
        &EditOp::RemoveSelection {
            node_ids: vec![nid("node-9")],
            edge_ids: vec![eid("gone")],
        },
    )
    .expect("stale selection is a no-op edit");

    assert_eq!(&next, &state);
}

#[test]
fn remove_selection_rejects_an_empty_selection() {
    let state = three_step_flow();
    let err = apply_edit(
        &state,
        &EditOp::RemoveSelection { node_ids: Vec::new(), edge_ids: Vec::new() },
    )
    .expect_err("empty selection");
    assert_eq!(err, EditError::EmptySelection);
}
