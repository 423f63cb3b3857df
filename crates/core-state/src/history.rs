use core_text::{Buffer, TextError};
use tracing::trace;

use crate::{Command, CursorState, ViewId};

/// Grouping and retention policy for a `CommandHistory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Fold adjacent same-kind commands from one view into a single entry.
    pub group_edits: bool,
    /// Drop the oldest undo entry once the stack grows past this depth.
    pub max_depth: Option<usize>,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            group_edits: true,
            max_depth: None,
        }
    }
}

/// Result of a successful undo or redo: the cursor state to hand back and the
/// view that produced the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStep {
    pub state: CursorState,
    pub origin: ViewId,
}

/// Undo / redo stacks for one document (most recent last).
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    options: HistoryOptions,
    trimmed: u64,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: HistoryOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn peek_undo(&self) -> Option<&Command> {
        self.undo_stack.last()
    }
    /// Count of entries dropped by the `max_depth` cap.
    pub fn trimmed(&self) -> u64 {
        self.trimmed
    }

    /// Execute `command` and record it, folding it into the stack top when
    /// grouping allows. Clears the redo stack. Nothing is recorded if the
    /// forward effect fails.
    pub fn record(
        &mut self,
        buffer: &mut Buffer,
        command: Command,
    ) -> Result<CursorState, TextError> {
        let after = command.execute(buffer)?;
        let merged = if self.options.group_edits {
            self.undo_stack.last().and_then(|top| top.merge(&command))
        } else {
            None
        };
        match merged {
            Some(merged) => {
                if let Some(top) = self.undo_stack.last_mut() {
                    *top = merged;
                }
                trace!(target: "state.history", kind = ?command.kind(), origin = %command.origin(), undo_depth = self.undo_stack.len(), "command_merged");
            }
            None => {
                trace!(target: "state.history", kind = ?command.kind(), origin = %command.origin(), undo_depth = self.undo_stack.len() + 1, "command_pushed");
                self.undo_stack.push(command);
                self.enforce_max_depth();
            }
        }
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.history", "redo_stack_cleared_on_new_edit");
        }
        Ok(after)
    }

    /// Revert the most recent entry. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self, buffer: &mut Buffer) -> Result<Option<HistoryStep>, TextError> {
        let Some(command) = self.undo_stack.pop() else {
            trace!(target: "state.history", "undo_empty");
            return Ok(None);
        };
        let state = match command.revert(buffer) {
            Ok(state) => state,
            Err(e) => {
                self.undo_stack.push(command);
                return Err(e);
            }
        };
        let origin = command.origin();
        self.redo_stack.push(command);
        trace!(target: "state.history", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), %origin, "undo_pop");
        Ok(Some(HistoryStep { state, origin }))
    }

    /// Re-apply the most recently undone entry. `Ok(None)` when there is nothing to redo.
    pub fn redo(&mut self, buffer: &mut Buffer) -> Result<Option<HistoryStep>, TextError> {
        let Some(command) = self.redo_stack.pop() else {
            trace!(target: "state.history", "redo_empty");
            return Ok(None);
        };
        let state = match command.execute(buffer) {
            Ok(state) => state,
            Err(e) => {
                self.redo_stack.push(command);
                return Err(e);
            }
        };
        let origin = command.origin();
        self.undo_stack.push(command);
        trace!(target: "state.history", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), %origin, "redo_pop");
        Ok(Some(HistoryStep { state, origin }))
    }

    fn enforce_max_depth(&mut self) {
        let Some(max) = self.options.max_depth else {
            return;
        };
        while self.undo_stack.len() > max {
            self.undo_stack.remove(0);
            self.trimmed += 1;
            trace!(target: "state.history", max, "undo_stack_trimmed");
        }
    }
}
