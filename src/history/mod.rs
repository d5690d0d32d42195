// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! Undo/redo history: an append-only snapshot list with a movable pointer.
//!
//! Pushing while the pointer sits before the tail discards the redo tail
//! first. Snapshots are never mutated after being pushed.

use crate::model::FlowState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    snapshots: Vec<FlowState>,
    index: usize,
}

impl History {
    pub fn new(initial: FlowState) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &FlowState {
        &self.snapshots[self.index]
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// A history always holds at least the initial snapshot.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Appends a new snapshot, truncating any redo tail at the pointer.
    pub fn push(&mut self, next: FlowState) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(next);
        self.index += 1;
    }

    /// Moves the pointer back one snapshot; no-op at the lower bound.
    pub fn undo(&mut self) -> Option<&FlowState> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Moves the pointer forward one snapshot; no-op at the upper bound.
    pub fn redo(&mut self) -> Option<&FlowState> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::History;
    use crate::graph::build_flow;
    use crate::model::FlowState;
    use crate::parse::parse_tasks;

    fn snapshot(text: &str) -> FlowState {
        build_flow(&parse_tasks(text), true)
    }

    #[test]
    fn starts_at_the_initial_snapshot() {
        let history = History::new(snapshot("A"));
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_restores_the_previous_snapshot_and_redo_reapplies_it() {
        let first = snapshot("A");
        let second = snapshot("A\nB");
        let third = snapshot("A\nB\nC");

        let mut history = History::new(first.clone());
        history.push(second.clone());
        history.push(third.clone());

        assert_eq!(history.undo(), Some(&second));
        assert_eq!(history.undo(), Some(&first));
        assert_eq!(history.redo(), Some(&second));
        assert_eq!(history.redo(), Some(&third));
    }

    #[test]
    fn undo_and_redo_are_no_ops_at_the_bounds() {
        let mut history = History::new(snapshot("A"));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);

        history.push(snapshot("A\nB"));
        assert_eq!(history.redo(), None);
        history.undo().expect("undo");
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn push_after_undo_discards_the_redo_tail() {
        let mut history = History::new(snapshot("A"));
        history.push(snapshot("A\nB"));
        history.push(snapshot("A\nB\nC"));

        history.undo().expect("undo");
        let replacement = snapshot("A\nD");
        history.push(replacement.clone());

        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), &replacement);
        assert!(!history.can_redo());
    }
}
