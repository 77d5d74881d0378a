use crate::error::FlowError;
use crate::model::Flow;
use crate::ops::Command;
use std::collections::VecDeque;

/// Caller-owned "current flow" with undo and redo.
///
/// The history replaces its current flow only after a command succeeds, so a failed
/// command leaves the current flow and both stacks exactly as they were. Commands that
/// return an identical flow (e.g. connecting an existing edge) are not recorded.
#[derive(Debug, Clone)]
pub struct FlowHistory {
    current: Flow,
    undo: VecDeque<Flow>,
    redo: Vec<Flow>,
    limit: usize,
}

impl FlowHistory {
    pub const DEFAULT_LIMIT: usize = 100;

    pub fn new(flow: Flow) -> Self {
        Self::with_limit(flow, Self::DEFAULT_LIMIT)
    }

    /// Keeps at most `limit` undo snapshots; the oldest are dropped first.
    pub fn with_limit(flow: Flow, limit: usize) -> Self {
        Self {
            current: flow,
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    pub fn current(&self) -> &Flow {
        &self.current
    }

    pub fn into_current(self) -> Flow {
        self.current
    }

    pub fn execute(&mut self, command: &Command) -> Result<&Flow, FlowError> {
        let next = command.apply(&self.current)?;
        if next != self.current {
            let previous = std::mem::replace(&mut self.current, next);
            self.push_undo(previous);
            self.redo.clear();
        }
        Ok(&self.current)
    }

    /// Steps back one command. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop_back() {
            Some(previous) => {
                let undone = std::mem::replace(&mut self.current, previous);
                self.redo.push(undone);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                let previous = std::mem::replace(&mut self.current, next);
                self.push_undo(previous);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    fn push_undo(&mut self, flow: Flow) {
        if self.limit == 0 {
            return;
        }
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(flow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::create_skeleton;

    fn add_variant(flow: &Flow, title: &str) -> Command {
        Command::AddVariant {
            step_id: flow.steps[0].id.clone(),
            title: title.to_string(),
        }
    }

    #[test]
    fn undo_and_redo_walk_snapshots() {
        let skeleton = create_skeleton("Landing").unwrap();
        let mut history = FlowHistory::new(skeleton.clone());

        history.execute(&add_variant(&skeleton, "B")).unwrap();
        let with_b = history.current().clone();
        assert_eq!(with_b.variants.len(), 2);

        assert!(history.undo());
        assert_eq!(history.current(), &skeleton);
        assert!(!history.undo());

        assert!(history.redo());
        assert_eq!(history.current(), &with_b);
        assert!(!history.can_redo());
    }

    #[test]
    fn failed_command_changes_nothing() {
        let skeleton = create_skeleton("Landing").unwrap();
        let mut history = FlowHistory::new(skeleton.clone());
        let launch = Command::LaunchWinnerForStep {
            step_id: skeleton.steps[0].id.clone(),
        };

        assert!(matches!(
            history.execute(&launch),
            Err(FlowError::NoWinner { .. })
        ));
        assert_eq!(history.current(), &skeleton);
        assert!(!history.can_undo());
    }

    #[test]
    fn oldest_snapshots_are_dropped_past_the_limit() {
        let skeleton = create_skeleton("Landing").unwrap();
        let mut history = FlowHistory::with_limit(skeleton.clone(), 2);
        for title in ["B", "C", "D"] {
            history.execute(&add_variant(&skeleton, title)).unwrap();
        }

        assert!(history.undo());
        assert!(history.undo());
        assert!(!history.undo());
        assert_eq!(history.current().variants.len(), 2);
    }
}
