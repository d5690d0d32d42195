// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! End-to-end checks of the text → tasks → flow → edit pipeline.

use flowsketch::graph::build_flow;
use flowsketch::history::History;
use flowsketch::model::{EdgeId, Handle, NodeId, NodeShape, TaskKind};
use flowsketch::ops::{apply_edit, EditOp};
use flowsketch::parse::parse_tasks;

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn eid(value: &str) -> EdgeId {
    EdgeId::new(value).expect("edge id")
}

#[test]
fn one_task_per_non_blank_trimmed_line() {
    let text = "  Create project outline  \n\n   \nDraft requirements #docs\n\nShip it\n";
    let tasks = parse_tasks(text);

    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0].label(), "Create project outline");
    assert_eq!(tasks[2].node_id().as_str(), "node-3");
}

#[test]
fn regeneration_from_unchanged_text_is_structurally_identical() {
    let text = "Create project outline\nReview with leads\nIF approved THEN Ship ELSE Rework\nShip to production";
    let first = build_flow(&parse_tasks(text), true);
    let second = build_flow(&parse_tasks(text), true);

    assert_eq!(first, second);
}

#[test]
fn if_then_else_line_yields_decision_with_branch_edges() {
    let state = build_flow(
        &parse_tasks("Draft plan\nIF approved THEN Ship ELSE Rework\nShip it"),
        true,
    );

    let decision = state.node(&nid("node-2")).expect("decision node");
    assert_eq!(decision.kind(), TaskKind::Decision);
    assert_eq!(decision.label(), "approved");
    assert_eq!(decision.shape(), NodeShape::Diamond);

    let yes = state.edge(&eid("node-2-node-3-yes")).expect("yes edge");
    assert_eq!(yes.label(), Some("Yes"));
    assert_eq!(yes.source_handle(), Handle::SourceRight);

    let no = state.edge(&eid("node-2-node-1-no")).expect("no edge");
    assert_eq!(no.label(), Some("No"));
    assert_eq!(no.target(), &nid("node-1"));
}

#[test]
fn plain_create_line_is_an_ungrouped_process_task() {
    let tasks = parse_tasks("Create project outline");
    let task = &tasks[0];

    assert_eq!(task.kind(), TaskKind::Task);
    assert_eq!(task.verb(), Some("create"));
    assert_eq!(task.shape(), NodeShape::Process);
    assert_eq!(task.group(), None);
}

#[test]
fn tagged_line_strips_the_tag_and_keeps_the_group() {
    let tasks = parse_tasks("Design solution #design");
    let task = &tasks[0];

    assert_eq!(task.label(), "Design solution");
    assert_eq!(task.group(), Some("design"));
    assert_eq!(task.shape(), NodeShape::Process);
}

#[test]
fn sequential_tasks_connect_first_to_second() {
    let state = build_flow(&parse_tasks("Review with leads\nCollect feedback"), true);

    let edge = state.edge(&eid("node-1-node-2")).expect("sequential edge");
    assert_eq!(edge.source(), &nid("node-1"));
    assert_eq!(edge.target(), &nid("node-2"));
}

#[test]
fn deleting_a_node_cascades_to_its_edges_but_deleting_an_edge_does_not() {
    let state = build_flow(&parse_tasks("Draft plan\nBuild prototype\nShip it"), true);

    let without_node = apply_edit(
        &state,
        &EditOp::RemoveSelection {
            node_ids: vec![nid("node-2")],
            edge_ids: Vec::new(),
        },
    )
    .expect("remove node");
    assert_eq!(without_node.nodes().len(), 2);
    assert!(without_node.edges().is_empty());

    let without_edge = apply_edit(
        &state,
        &EditOp::RemoveSelection {
            node_ids: Vec::new(),
            edge_ids: vec![eid("node-1-node-2")],
        },
    )
    .expect("remove edge");
    assert_eq!(without_edge.nodes().len(), 3);
    assert_eq!(without_edge.edges().len(), 1);
}

#[test]
fn undo_redo_walks_exact_snapshots_and_stops_at_the_bounds() {
    let base = build_flow(&parse_tasks("Draft plan\nShip it"), true);
    let mut history = History::new(base.clone());

    let mut snapshots = vec![base];
    for (step, label) in ["first", "second", "third"].iter().enumerate() {
        let next = apply_edit(
            history.current(),
            &EditOp::SetNodeLabel {
                node_id: nid("node-1"),
                label: format!("Draft plan ({label})"),
            },
        )
        .expect("edit");
        history.push(next.clone());
        snapshots.push(next);
        assert_eq!(history.index(), step + 1);
    }

    // Undo after edit N lands on the state after edit N-1, exactly.
    assert_eq!(history.undo(), Some(&snapshots[2]));
    assert_eq!(history.undo(), Some(&snapshots[1]));
    assert_eq!(history.redo(), Some(&snapshots[2]));
    assert_eq!(history.redo(), Some(&snapshots[3]));

    assert_eq!(history.redo(), None);
    history.undo();
    history.undo();
    history.undo();
    assert_eq!(history.undo(), None);
    assert_eq!(history.current(), &snapshots[0]);
}
