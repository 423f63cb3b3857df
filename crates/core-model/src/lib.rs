//! Document model shared by multiple views.
//!
//! A `Document` is the single owner of the text buffer and the command
//! history. Views never hold a copy of the content; they hold a `ViewId` that
//! indexes into the document's view registry, and every mutation flows through
//! `Document` methods so the single-writer invariant stays explicit.
//!
//! Why a `View` type?
//! ------------------
//! A `View` carries the per-surface presentation state: cursor, selection,
//! the sticky goal column for vertical motion, and the anchor used when a drag
//! or shift-click extends a selection. Keeping it inside the document (rather
//! than in the view layer) lets the document re-clamp every view after an edit
//! made by someone else.
//!
//! Notification protocol:
//! * Every successful `apply` / `undo` / `redo` returns the list of views to
//!   notify, in registration order. The acting view is never in the list for
//!   `apply`; for `undo` / `redo` the owning view of the command is left out
//!   because it receives its restored cursor directly.
//! * Empty operations (nothing to undo, deleting at a buffer edge) return an
//!   empty list.
//! * `SharedDocument` turns that list into synchronous callbacks on weakly
//!   held observers for GUI-style glue. After an undo / redo requested by
//!   another view it also calls back the owner, whose content changed too.
//!
//! Core invariants (must hold after every public call):
//! * Every attached view satisfies `cursor <= len` and any selection lies in
//!   `[0, len]` with `start < end`.
//! * The redo stack is empty after any edit that is not an undo / redo.
//! * `ViewId`s are never reused within a document.

pub use core_state::{CursorState, HistoryOptions, Selection, ViewId};
use core_text::TextError;
use thiserror::Error;

mod document;
mod shared;

pub use document::{DetachOutcome, Document, EditOutcome, EditRequest, HistoryOutcome, Motion};
pub use shared::{SharedDocument, ViewObserver};

/// Errors surfaced by document operations. Empty history is not an error; it
/// is reported as `Ok(None)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    OutOfRange(#[from] TextError),
    #[error("{0} is not attached to this document")]
    UnknownView(ViewId),
    #[error("reentrant mutation: a change notification handler called back into the document")]
    ReentrantMutation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub id: ViewId,
    pub cursor: usize,
    pub selection: Option<Selection>,
    /// Sticky column for Up/Down; reset by horizontal moves, edits and clicks.
    pub goal_col: Option<usize>,
    /// Fixed end of a selection being extended by drag or shift-click.
    pub anchor: Option<usize>,
}

impl View {
    pub fn new(id: ViewId) -> Self {
        Self {
            id,
            cursor: 0,
            selection: None,
            goal_col: None,
            anchor: None,
        }
    }

    pub fn state(&self) -> CursorState {
        CursorState::new(self.cursor, self.selection)
    }

    /// Adopt a cursor state produced by the document (edit result or history
    /// restore). The anchor follows the selection end opposite the cursor.
    pub fn restore(&mut self, state: CursorState) {
        self.cursor = state.cursor;
        self.selection = state.selection;
        self.goal_col = None;
        self.anchor = Some(match state.selection {
            Some(sel) if sel.start == state.cursor => sel.end,
            Some(sel) => sel.start,
            None => state.cursor,
        });
    }

    /// Re-derive validity after someone else's edit.
    pub fn clamp_to(&mut self, len: usize) {
        let mut state = self.state();
        state.clamp_to(len);
        self.cursor = state.cursor;
        self.selection = state.selection;
        self.anchor = self.anchor.map(|a| a.min(len));
    }
}

/// Registry of attached views in registration order.
#[derive(Debug, Default)]
pub struct ViewManager {
    views: Vec<View>,
    next_id: u64,
}

impl ViewManager {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn attach(&mut self) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        self.views.push(View::new(id));
        id
    }
    pub fn detach(&mut self, id: ViewId) -> Option<View> {
        let idx = self.views.iter().position(|v| v.id == id)?;
        Some(self.views.remove(idx))
    }
    pub fn get(&self, id: ViewId) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }
    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.views.iter_mut().find(|v| v.id == id)
    }
    pub fn views(&self) -> &[View] {
        &self.views
    }
    pub fn len(&self) -> usize {
        self.views.len()
    }
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Clamp every view other than `except` to `len` and return their ids in
    /// registration order.
    fn clamp_others(&mut self, except: ViewId, len: usize) -> Vec<ViewId> {
        self.views
            .iter_mut()
            .filter(|v| v.id != except)
            .map(|v| {
                v.clamp_to(len);
                v.id
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_ids_are_not_reused() {
        let mut mgr = ViewManager::new();
        let a = mgr.attach();
        let b = mgr.attach();
        assert!(mgr.detach(a).is_some());
        let c = mgr.attach();
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert_eq!(mgr.views().iter().map(|v| v.id).collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn detach_unknown_is_none() {
        let mut mgr = ViewManager::new();
        assert!(mgr.detach(ViewId(9)).is_none());
        assert!(mgr.is_empty());
    }

    #[test]
    fn restore_sets_anchor_opposite_cursor() {
        let mut v = View::new(ViewId(0));
        v.goal_col = Some(4);
        v.restore(CursorState::new(1, Some(Selection::new(1, 4))));
        assert_eq!(v.anchor, Some(4));
        assert_eq!(v.goal_col, None);
        v.restore(CursorState::new(4, Some(Selection::new(1, 4))));
        assert_eq!(v.anchor, Some(1));
        v.restore(CursorState::at(2));
        assert_eq!(v.anchor, Some(2));
    }

    #[test]
    fn clamp_others_skips_actor_and_keeps_order() {
        let mut mgr = ViewManager::new();
        let a = mgr.attach();
        let b = mgr.attach();
        let c = mgr.attach();
        for id in [a, b, c] {
            mgr.get_mut(id).unwrap().cursor = 10;
        }
        let notified = mgr.clamp_others(b, 3);
        assert_eq!(notified, vec![a, c]);
        assert_eq!(mgr.get(a).unwrap().cursor, 3);
        assert_eq!(mgr.get(b).unwrap().cursor, 10);
    }
}
