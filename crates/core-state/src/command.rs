//! Reversible edit commands.
//!
//! A `Command` captures everything needed to apply and exactly undo one edit:
//! the inserted text or the deleted text (copied out of the buffer when the
//! command is built), the position, the originating view, and the cursor /
//! selection of that view from before the edit.
//!
//! Invariant: `execute` followed by `revert` against the buffer state the
//! command was built for leaves the buffer unchanged, and `revert` always
//! yields `before`.

use core_text::{Buffer, TextError};

use crate::{CursorState, ViewId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Insert,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert {
        text: String,
        /// Insertion point at time of execution.
        offset: usize,
        before: CursorState,
        origin: ViewId,
    },
    Delete {
        /// Half-open range over the content *before* deletion.
        start: usize,
        end: usize,
        deleted_text: String,
        before: CursorState,
        origin: ViewId,
    },
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl Command {
    /// Build an insert validated against the current buffer.
    pub fn insert(
        buffer: &Buffer,
        text: impl Into<String>,
        offset: usize,
        before: CursorState,
        origin: ViewId,
    ) -> Result<Self, TextError> {
        buffer.check_offset(offset)?;
        Ok(Command::Insert {
            text: text.into(),
            offset,
            before,
            origin,
        })
    }

    /// Build a delete of `[start,end)`, capturing the doomed text now.
    pub fn delete(
        buffer: &Buffer,
        start: usize,
        end: usize,
        before: CursorState,
        origin: ViewId,
    ) -> Result<Self, TextError> {
        let deleted_text = buffer.slice(start, end)?;
        Ok(Command::Delete {
            start,
            end,
            deleted_text,
            before,
            origin,
        })
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Insert { .. } => CommandKind::Insert,
            Command::Delete { .. } => CommandKind::Delete,
        }
    }

    pub fn origin(&self) -> ViewId {
        match self {
            Command::Insert { origin, .. } | Command::Delete { origin, .. } => *origin,
        }
    }

    pub fn before(&self) -> CursorState {
        match self {
            Command::Insert { before, .. } | Command::Delete { before, .. } => *before,
        }
    }

    /// Text carried by the command: inserted text or deleted text.
    pub fn text(&self) -> &str {
        match self {
            Command::Insert { text, .. } => text,
            Command::Delete { deleted_text, .. } => deleted_text,
        }
    }

    /// True when applying the command would not change the buffer.
    pub fn is_noop(&self) -> bool {
        self.text().is_empty()
    }

    /// Apply the forward effect. Returns the acting view's cursor afterwards
    /// (selection always cleared).
    pub fn execute(&self, buffer: &mut Buffer) -> Result<CursorState, TextError> {
        match self {
            Command::Insert { text, offset, .. } => {
                buffer.insert(*offset, text)?;
                Ok(CursorState::at(offset + char_len(text)))
            }
            Command::Delete {
                start,
                end,
                deleted_text,
                ..
            } => {
                let removed = buffer.remove(*start, *end)?;
                debug_assert_eq!(&removed, deleted_text, "delete executed against foreign state");
                Ok(CursorState::at(*start))
            }
        }
    }

    /// Apply the reverse effect. Returns the cursor state captured before the command ran.
    pub fn revert(&self, buffer: &mut Buffer) -> Result<CursorState, TextError> {
        match self {
            Command::Insert {
                text,
                offset,
                before,
                ..
            } => {
                buffer.remove(*offset, offset + char_len(text))?;
                Ok(*before)
            }
            Command::Delete {
                start,
                deleted_text,
                before,
                ..
            } => {
                buffer.insert(*start, deleted_text)?;
                Ok(*before)
            }
        }
    }

    /// Fold `next` (already executed right after `self`) into a single new
    /// command, or `None` when they are not the same kind, not from the same
    /// view, or not adjacent.
    ///
    /// * Insert: `next.offset == self.offset + len(self.text)`.
    /// * Delete, backspace run: `next.end == self.start`; the run extends left
    ///   and the deleted text is `next + self`.
    /// * Delete, forward-delete run: `next.start == self.start`; the run
    ///   extends right and the deleted text is `self + next`.
    ///
    /// The merged command keeps `self.before` so one undo returns the cursor
    /// to where the run started.
    pub fn merge(&self, next: &Command) -> Option<Command> {
        if self.origin() != next.origin() {
            return None;
        }
        match (self, next) {
            (
                Command::Insert {
                    text,
                    offset,
                    before,
                    origin,
                },
                Command::Insert {
                    text: next_text,
                    offset: next_offset,
                    ..
                },
            ) => {
                if *next_offset != offset + char_len(text) {
                    return None;
                }
                Some(Command::Insert {
                    text: format!("{text}{next_text}"),
                    offset: *offset,
                    before: *before,
                    origin: *origin,
                })
            }
            (
                Command::Delete {
                    start,
                    end,
                    deleted_text,
                    before,
                    origin,
                },
                Command::Delete {
                    start: next_start,
                    end: next_end,
                    deleted_text: next_text,
                    ..
                },
            ) => {
                if next.is_noop() {
                    return None;
                }
                if *next_end == *start {
                    Some(Command::Delete {
                        start: *next_start,
                        end: *end,
                        deleted_text: format!("{next_text}{deleted_text}"),
                        before: *before,
                        origin: *origin,
                    })
                } else if *next_start == *start {
                    // `next` ranges over the post-deletion buffer; in the
                    // pre-deletion buffer its characters follow `end`.
                    Some(Command::Delete {
                        start: *start,
                        end: end + (next_end - next_start),
                        deleted_text: format!("{deleted_text}{next_text}"),
                        before: *before,
                        origin: *origin,
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
