// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

use super::ids::NodeId;

/// Classification of a parsed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskKind {
    #[default]
    Task,
    Decision,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Decision => "decision",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual shape hint for a node.
///
/// Either written explicitly as a `{shape}` marker at the start of a line or
/// inferred from the line's leading verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeShape {
    Pill,
    #[default]
    Process,
    Wave,
    Diamond,
}

impl NodeShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pill => "pill",
            Self::Process => "process",
            Self::Wave => "wave",
            Self::Diamond => "diamond",
        }
    }
}

impl fmt::Display for NodeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeShapeError {
    token: String,
}

impl ParseNodeShapeError {
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for ParseNodeShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown node shape '{}' (expected pill/process/wave/diamond)",
            self.token
        )
    }
}

impl std::error::Error for ParseNodeShapeError {}

impl FromStr for NodeShape {
    type Err = ParseNodeShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pill" => Ok(Self::Pill),
            "process" => Ok(Self::Process),
            "wave" => Ok(Self::Wave),
            "diamond" => Ok(Self::Diamond),
            _ => Err(ParseNodeShapeError { token: s.to_owned() }),
        }
    }
}

/// One typed task record, produced per non-empty input line.
///
/// The id is ordinal and reflects input line order; regeneration from the
/// same text always yields the same ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTask {
    node_id: NodeId,
    label: String,
    group: Option<String>,
    verb: Option<String>,
    kind: TaskKind,
    branch_yes: Option<String>,
    branch_no: Option<String>,
    shape: NodeShape,
}

impl ParsedTask {
    pub fn new(node_id: NodeId, label: impl Into<String>, kind: TaskKind, shape: NodeShape) -> Self {
        Self {
            node_id,
            label: label.into(),
            group: None,
            verb: None,
            kind,
            branch_yes: None,
            branch_no: None,
            shape,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn verb(&self) -> Option<&str> {
        self.verb.as_deref()
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn branch_yes(&self) -> Option<&str> {
        self.branch_yes.as_deref()
    }

    pub fn branch_no(&self) -> Option<&str> {
        self.branch_no.as_deref()
    }

    pub fn shape(&self) -> NodeShape {
        self.shape
    }

    pub fn set_group<T: Into<String>>(&mut self, group: Option<T>) {
        self.group = group.map(Into::into);
    }

    pub fn set_verb<T: Into<String>>(&mut self, verb: Option<T>) {
        self.verb = verb.map(Into::into);
    }

    pub fn set_branches<T: Into<String>>(&mut self, yes: Option<T>, no: Option<T>) {
        self.branch_yes = yes.map(Into::into);
        self.branch_no = no.map(Into::into);
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeShape, ParsedTask, TaskKind};
    use crate::model::NodeId;

    #[test]
    fn node_shape_parses_case_insensitively() {
        assert_eq!("PILL".parse::<NodeShape>(), Ok(NodeShape::Pill));
        assert_eq!("diamond".parse::<NodeShape>(), Ok(NodeShape::Diamond));
        assert_eq!("Wave".parse::<NodeShape>(), Ok(NodeShape::Wave));

        let err = "blob".parse::<NodeShape>().expect_err("unknown shape");
        assert_eq!(err.token(), "blob");
    }

    #[test]
    fn parsed_task_defaults_are_empty() {
        let id = NodeId::new("node-1").expect("node id");
        let task = ParsedTask::new(id, "Ship it", TaskKind::Task, NodeShape::Process);

        assert_eq!(task.label(), "Ship it");
        assert_eq!(task.group(), None);
        assert_eq!(task.verb(), None);
        assert_eq!(task.branch_yes(), None);
        assert_eq!(task.branch_no(), None);
        assert_eq!(task.kind(), TaskKind::Task);
        assert_eq!(task.shape(), NodeShape::Process);
    }

    #[test]
    fn parsed_task_setters_update_optionals() {
        let id = NodeId::new("node-2").expect("node id");
        let mut task = ParsedTask::new(id, "approved", TaskKind::Decision, NodeShape::Diamond);

        task.set_group(Some("release"));
        task.set_verb(Some("review"));
        task.set_branches(Some("Ship"), Some("Rework"));

        assert_eq!(task.group(), Some("release"));
        assert_eq!(task.verb(), Some("review"));
        assert_eq!(task.branch_yes(), Some("Ship"));
        assert_eq!(task.branch_no(), Some("Rework"));

        task.set_group::<&str>(None);
        assert_eq!(task.group(), None);
    }
}
