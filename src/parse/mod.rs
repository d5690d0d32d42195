// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! Task parser: free-form text lines → typed task records.
//!
//! Parsing is total. Every non-empty trimmed line maps to exactly one
//! [`ParsedTask`]; unmatched lines fall back to a plain `task` with the
//! default `process` shape. Blank lines are dropped and do not consume an id.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{NodeId, NodeShape, ParsedTask, TaskKind};

/// Verbs whose leading occurrence classifies a line as a decision.
///
/// Matching is a raw case-insensitive prefix check, so `Testing` counts.
const DECISION_VERBS: [&str; 4] = ["if", "test", "check", "review"];

/// The leading-verb vocabulary recorded on tasks for downstream display.
const LEADING_VERBS: [&str; 13] = [
    "create", "design", "draft", "review", "approve", "plan", "define", "build", "test", "deploy",
    "release", "audit", "publish",
];

const PROCESS_VERBS: [&str; 7] = ["create", "design", "draft", "build", "implement", "deploy", "order"];
const PILL_VERBS: [&str; 2] = ["call", "meet"];
const WAVE_VERBS: [&str; 3] = ["report", "form", "document"];

fn hashtag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#([\p{L}\p{N}_-]+)").expect("hashtag regex"))
}

fn shape_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\{(pill|process|wave|diamond)\}\s*").expect("shape regex"))
}

fn decision_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^if\s+(.+?)\s+then\s+(.+?)(?:\s+else\s+(.+))?$").expect("decision regex")
    })
}

/// Builds the ordinal node id for the task at `ordinal` (zero-based).
pub fn node_id_for_ordinal(ordinal: usize) -> NodeId {
    NodeId::new(format!("node-{}", ordinal + 1)).expect("ordinal node id")
}

/// Parses raw multi-line text into an ordered task sequence.
pub fn parse_tasks(input: &str) -> Vec<ParsedTask> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(ordinal, line)| parse_line(ordinal, line))
        .collect()
}

fn parse_line(ordinal: usize, line: &str) -> ParsedTask {
    let node_id = node_id_for_ordinal(ordinal);

    // Tags first: the first one becomes the group, all of them leave the label.
    let group = hashtag_regex()
        .captures(line)
        .map(|caps| caps[1].to_owned());
    let without_tags = hashtag_regex().replace_all(line, "");
    let without_tags = without_tags.trim();

    // Optional explicit `{shape}` marker at line start.
    let (explicit_shape, working) = match shape_marker_regex().captures(without_tags) {
        Some(caps) => {
            let shape = caps[1].parse::<NodeShape>().expect("marker shape");
            (Some(shape), without_tags[caps[0].len()..].trim())
        }
        None => (None, without_tags),
    };

    let first_word = working
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let lowered = working.to_lowercase();
    let branch_match = decision_regex().captures(working);

    let (kind, label, branch_yes, branch_no) = if let Some(caps) = &branch_match {
        let yes = caps.get(2).map(|m| m.as_str().trim().to_owned());
        let no = caps.get(3).map(|m| m.as_str().trim().to_owned());
        (
            TaskKind::Decision,
            caps[1].trim().to_owned(),
            yes,
            no,
        )
    } else if working.starts_with('?')
        || DECISION_VERBS.iter().any(|verb| lowered.starts_with(verb))
    {
        let label = working.strip_prefix('?').unwrap_or(working).trim().to_owned();
        (TaskKind::Decision, label, None, None)
    } else {
        (TaskKind::Task, working.to_owned(), None, None)
    };

    let shape = explicit_shape.unwrap_or_else(|| infer_shape(kind, &first_word));

    let mut task = ParsedTask::new(node_id, label, kind, shape);
    task.set_group(group);
    if LEADING_VERBS.contains(&first_word.as_str()) {
        task.set_verb(Some(first_word));
    }
    task.set_branches(branch_yes, branch_no);
    task
}

fn infer_shape(kind: TaskKind, first_word: &str) -> NodeShape {
    if kind == TaskKind::Decision {
        return NodeShape::Diamond;
    }
    if PROCESS_VERBS.contains(&first_word) {
        return NodeShape::Process;
    }
    if PILL_VERBS.contains(&first_word) {
        return NodeShape::Pill;
    }
    if WAVE_VERBS.contains(&first_word) {
        return NodeShape::Wave;
    }
    NodeShape::Process
}
