// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! Core data model.
//!
//! Tasks are what the parser produces; flow nodes/edges/states are what the
//! builder produces and what the canvas, history and exporters operate on.

pub mod flow;
pub mod ids;
pub mod task;

pub use flow::{FlowEdge, FlowNode, FlowState, Handle, Position};
pub use ids::{EdgeId, Id, IdError, NodeId};
pub use task::{NodeShape, ParseNodeShapeError, ParsedTask, TaskKind};
