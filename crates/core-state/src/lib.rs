//! Edit state: reversible commands, the shared undo/redo history, and the
//! small value types (view identity, selection, cursor snapshot) they carry.
//!
//! Command Grouping:
//! - Consecutive commands of the same kind, from the same view, at adjacent
//!   positions fold into one undo entry (typing a word undoes as one step).
//! - Adjacency is purely positional. There are no timers, so grouping is
//!   deterministic for a given command sequence.
//! - Any new edit clears the redo stack.
//!
//! This crate knows nothing about attached views beyond the opaque `ViewId`
//! stamped on each command; fan-out and per-view cursor bookkeeping live in
//! `core-model`.

use std::fmt;

pub mod command;
pub mod history;

pub use command::{Command, CommandKind};
pub use history::{CommandHistory, HistoryOptions, HistoryStep};

/// Opaque identity of a view attached to a document.
///
/// Identities are never reused within one document, so a stale id held by a
/// detached view cannot alias a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Half-open selected range `[start,end)` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Construct a selection normalizing ordering so that start <= end.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Cursor + selection of one view at one instant. Commands capture the state
/// from before they ran so undo can hand it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorState {
    pub cursor: usize,
    pub selection: Option<Selection>,
}

impl CursorState {
    pub fn new(cursor: usize, selection: Option<Selection>) -> Self {
        Self { cursor, selection }
    }

    /// Bare cursor, no selection.
    pub fn at(cursor: usize) -> Self {
        Self {
            cursor,
            selection: None,
        }
    }

    /// Pull every offset back inside `[0, len]`. A selection that collapses to
    /// nothing is dropped.
    pub fn clamp_to(&mut self, len: usize) {
        self.cursor = self.cursor.min(len);
        if let Some(sel) = self.selection {
            let clamped = Selection::new(sel.start.min(len), sel.end.min(len));
            self.selection = (!clamped.is_empty()).then_some(clamped);
        }
    }
}
