// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! JSON wire format for flow snapshots.
//!
//! The document mirrors a node/edge canvas document: camelCase keys,
//! `editableNode` nodes and `smoothstep` edges, so downstream renderers can
//! load an exported diagram directly.

use serde::Serialize;

use crate::model::{FlowEdge, FlowNode, FlowState, TaskKind};

#[derive(Debug, Serialize)]
struct WireDoc {
    nodes: Vec<WireNode>,
    edges: Vec<WireEdge>,
}

#[derive(Debug, Serialize)]
struct WireNode {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    position: WirePosition,
    data: WireNodeData,
}

#[derive(Debug, Serialize)]
struct WirePosition {
    x: i64,
    y: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireNodeData {
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verb: Option<String>,
    kind: String,
    shape: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEdge {
    id: String,
    source: String,
    source_handle: String,
    target: String,
    target_handle: String,
    #[serde(rename = "type")]
    edge_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

fn kind_str(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Task => "task",
        TaskKind::Decision => "decision",
    }
}

fn wire_node(node: &FlowNode) -> WireNode {
    WireNode {
        id: node.node_id().to_string(),
        node_type: "editableNode".to_owned(),
        position: WirePosition {
            x: node.position().x,
            y: node.position().y,
        },
        data: WireNodeData {
            label: node.label().to_owned(),
            group: node.group().map(str::to_owned),
            verb: node.verb().map(str::to_owned),
            kind: kind_str(node.kind()).to_owned(),
            shape: node.shape().as_str().to_owned(),
        },
    }
}

fn wire_edge(edge: &FlowEdge) -> WireEdge {
    WireEdge {
        id: edge.edge_id().to_string(),
        source: edge.source().to_string(),
        source_handle: edge.source_handle().as_str().to_owned(),
        target: edge.target().to_string(),
        target_handle: edge.target_handle().as_str().to_owned(),
        edge_type: FlowEdge::CONNECTOR.to_owned(),
        label: edge.label().map(str::to_owned),
    }
}

/// Serializes a snapshot to pretty-printed JSON.
pub fn to_json(state: &FlowState) -> Result<String, serde_json::Error> {
    let doc = WireDoc {
        nodes: state.nodes().iter().map(wire_node).collect(),
        edges: state.edges().iter().map(wire_edge).collect(),
    };
    serde_json::to_string_pretty(&doc)
}

#[cfg(test)]
mod tests {
    use super::to_json;
    use crate::graph::build_flow;
    use crate::parse::parse_tasks;

    #[test]
    fn nodes_carry_wire_type_position_and_data() {
        let state = build_flow(&parse_tasks("Create outline #docs\nShip it"), true);
        let json = to_json(&state).expect("json");
        let doc: serde_json::Value = serde_json::from_str(&json).expect("parse back");

        let first = &doc["nodes"][0];
        assert_eq!(first["id"], "node-1");
        assert_eq!(first["type"], "editableNode");
        assert_eq!(first["position"]["x"], 0);
        assert_eq!(first["position"]["y"], 0);
        assert_eq!(first["data"]["label"], "Create outline");
        assert_eq!(first["data"]["group"], "docs");
        assert_eq!(first["data"]["verb"], "create");
        assert_eq!(first["data"]["kind"], "task");
        assert_eq!(first["data"]["shape"], "process");

        // Absent optionals are omitted, not null.
        let second = &doc["nodes"][1];
        assert!(second["data"].get("group").is_none());
    }

    #[test]
    fn edges_carry_handles_connector_and_branch_labels() {
        let state = build_flow(&parse_tasks("Draft plan\nIF approved THEN Ship ELSE Rework\nShip it"), true);
        let json = to_json(&state).expect("json");
        let doc: serde_json::Value = serde_json::from_str(&json).expect("parse back");

        let edges = doc["edges"].as_array().expect("edges");
        assert_eq!(edges.len(), 4);

        let forward = &edges[0];
        assert_eq!(forward["id"], "node-1-node-2");
        assert_eq!(forward["sourceHandle"], "sb");
        assert_eq!(forward["targetHandle"], "t");
        assert_eq!(forward["type"], "smoothstep");
        assert!(forward.get("label").is_none());

        let yes = &edges[1];
        assert_eq!(yes["id"], "node-2-node-3-yes");
        assert_eq!(yes["sourceHandle"], "sr");
        assert_eq!(yes["label"], "Yes");
    }
}
