use core_state::{
    Command, CommandHistory, CursorState, HistoryOptions, HistoryStep, Selection, ViewId,
};
use core_text::{Buffer, LineEnding, RowCol, motion, normalize_line_endings, offset_to_row_col};
use tracing::{debug, trace, warn};

use crate::{EditError, View, ViewManager};

/// Inbound edit intent. Offsets are "at time of call" and validated against
/// the current buffer length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRequest {
    Insert { text: String, at: usize },
    Delete { start: usize, end: usize },
}

impl EditRequest {
    pub fn insert(text: impl Into<String>, at: usize) -> Self {
        EditRequest::Insert {
            text: text.into(),
            at,
        }
    }
    pub fn delete(start: usize, end: usize) -> Self {
        EditRequest::Delete { start, end }
    }
}

/// Result of an edit for the acting view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Acting view's cursor/selection after the edit.
    pub state: CursorState,
    /// Other attached views that must re-render (registration order).
    pub notify: Vec<ViewId>,
    /// False for no-op requests; `notify` is then empty.
    pub changed: bool,
}

impl EditOutcome {
    fn unchanged(state: CursorState) -> Self {
        Self {
            state,
            notify: Vec::new(),
            changed: false,
        }
    }

    /// Fold a follow-up edit of the same gesture into one outcome so the
    /// gesture fans out once.
    fn absorb(mut self, next: EditOutcome) -> Self {
        for id in next.notify {
            if !self.notify.contains(&id) {
                self.notify.push(id);
            }
        }
        self.state = next.state;
        self.changed |= next.changed;
        self
    }
}

/// Result of a successful undo / redo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryOutcome {
    /// View that produced the command; its state was restored directly.
    pub owner: ViewId,
    pub state: CursorState,
    /// Every attached view except `owner` (registration order).
    pub notify: Vec<ViewId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachOutcome {
    /// No views remain; terminal event for the document's GUI lifecycle.
    pub last_view_closed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
}

/// Owner of the buffer, the shared history and the attached views.
///
/// Buffer edits are rope splices; nothing here is optimized beyond that.
#[derive(Debug)]
pub struct Document {
    name: String,
    buffer: Buffer,
    history: CommandHistory,
    views: ViewManager,
    original_line_ending: LineEnding,
    dirty: bool,
}

impl Document {
    /// Load already-decoded text. `\r\n` collapses to `\n` here and nowhere else.
    pub fn load(name: impl Into<String>, raw: &str) -> Self {
        Self::load_with_options(name, raw, HistoryOptions::default())
    }

    pub fn load_with_options(name: impl Into<String>, raw: &str, options: HistoryOptions) -> Self {
        let name = name.into();
        let norm = normalize_line_endings(raw);
        if norm.mixed {
            warn!(target: "model.document", name = name.as_str(), "mixed_line_endings_detected");
        }
        let buffer = Buffer::new(&norm.normalized);
        debug!(target: "model.document", name = name.as_str(), chars = buffer.len_chars(), lines = buffer.line_count(), original = ?norm.original, "document_loaded");
        Self {
            name,
            buffer,
            history: CommandHistory::with_options(options),
            views: ViewManager::new(),
            original_line_ending: norm.original,
            dirty: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn content(&self) -> String {
        self.buffer.to_string()
    }
    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }
    pub fn original_line_ending(&self) -> LineEnding {
        self.original_line_ending
    }
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(id)
    }
    pub fn views(&self) -> &[View] {
        self.views.views()
    }

    /// Serialize content verbatim (no line-ending re-expansion) and mark clean.
    pub fn save(&mut self) -> String {
        self.dirty = false;
        let out = self.buffer.to_string();
        debug!(target: "model.document", name = self.name.as_str(), chars = self.buffer.len_chars(), "document_saved");
        out
    }

    pub fn save_bytes(&mut self) -> Vec<u8> {
        self.save().into_bytes()
    }

    // ----------------------------------------------------------------------------
    // View lifecycle
    // ----------------------------------------------------------------------------

    pub fn attach(&mut self) -> ViewId {
        let id = self.views.attach();
        debug!(target: "model.document", view = %id, views = self.views.len(), "view_attached");
        id
    }

    pub fn detach(&mut self, id: ViewId) -> Result<DetachOutcome, EditError> {
        self.views.detach(id).ok_or(EditError::UnknownView(id))?;
        let last_view_closed = self.views.is_empty();
        debug!(target: "model.document", view = %id, views = self.views.len(), last_view_closed, "view_detached");
        Ok(DetachOutcome { last_view_closed })
    }

    // ----------------------------------------------------------------------------
    // Mutation entry points
    // ----------------------------------------------------------------------------

    /// Build a command from `request`, record it, move the acting view's
    /// cursor and clamp everyone else. Empty inserts / ranges change nothing.
    pub fn apply(&mut self, view: ViewId, request: EditRequest) -> Result<EditOutcome, EditError> {
        let before = self.view_ref(view)?.state();
        let command = match request {
            EditRequest::Insert { text, at } => {
                Command::insert(&self.buffer, text, at, before, view)?
            }
            EditRequest::Delete { start, end } => {
                Command::delete(&self.buffer, start, end, before, view)?
            }
        };
        if command.is_noop() {
            trace!(target: "model.document", view = %view, "apply_noop");
            return Ok(EditOutcome::unchanged(before));
        }
        let kind = command.kind();
        let after = self.history.record(&mut self.buffer, command)?;
        self.dirty = true;
        self.view_mut(view)?.restore(after);
        let notify = self.views.clamp_others(view, self.buffer.len_chars());
        trace!(target: "model.document", view = %view, ?kind, cursor = after.cursor, notify = notify.len(), "apply");
        Ok(EditOutcome {
            state: after,
            notify,
            changed: true,
        })
    }

    /// Undo the most recent entry, whichever view produced it. `Ok(None)`
    /// when there is nothing to undo.
    pub fn undo(&mut self, requester: ViewId) -> Result<Option<HistoryOutcome>, EditError> {
        self.view_ref(requester)?;
        match self.history.undo(&mut self.buffer)? {
            Some(step) => Ok(Some(self.finish_history_step(requester, step, "undo"))),
            None => {
                debug!(target: "model.document", view = %requester, "nothing_to_undo");
                Ok(None)
            }
        }
    }

    pub fn redo(&mut self, requester: ViewId) -> Result<Option<HistoryOutcome>, EditError> {
        self.view_ref(requester)?;
        match self.history.redo(&mut self.buffer)? {
            Some(step) => Ok(Some(self.finish_history_step(requester, step, "redo"))),
            None => {
                debug!(target: "model.document", view = %requester, "nothing_to_redo");
                Ok(None)
            }
        }
    }

    fn finish_history_step(
        &mut self,
        requester: ViewId,
        step: HistoryStep,
        op: &'static str,
    ) -> HistoryOutcome {
        self.dirty = true;
        let len = self.buffer.len_chars();
        let mut state = step.state;
        state.clamp_to(len);
        // A detached owner simply gets nothing restored.
        if let Some(owner) = self.views.get_mut(step.origin) {
            owner.restore(state);
        }
        let notify = self.views.clamp_others(step.origin, len);
        debug!(target: "model.document", op, requester = %requester, owner = %step.origin, cursor = state.cursor, notify = notify.len(), "history_step");
        HistoryOutcome {
            owner: step.origin,
            state,
            notify,
        }
    }

    // ----------------------------------------------------------------------------
    // Editing gestures
    // ----------------------------------------------------------------------------

    /// Type `text` at the cursor, replacing the selection when there is one.
    pub fn type_text(&mut self, view: ViewId, text: &str) -> Result<EditOutcome, EditError> {
        let deleted = self.delete_selection(view)?;
        let cursor = self.view_ref(view)?.cursor;
        let inserted = self.apply(view, EditRequest::insert(text, cursor))?;
        Ok(match deleted {
            Some(deleted) => deleted.absorb(inserted),
            None => inserted,
        })
    }

    /// Delete the selection, or the character before the cursor.
    pub fn backspace(&mut self, view: ViewId) -> Result<EditOutcome, EditError> {
        if let Some(outcome) = self.delete_selection(view)? {
            return Ok(outcome);
        }
        let v = self.view_ref(view)?;
        if v.cursor == 0 {
            return Ok(EditOutcome::unchanged(v.state()));
        }
        let cursor = v.cursor;
        self.apply(view, EditRequest::delete(cursor - 1, cursor))
    }

    /// Delete the selection, or the character under the cursor.
    pub fn delete_forward(&mut self, view: ViewId) -> Result<EditOutcome, EditError> {
        if let Some(outcome) = self.delete_selection(view)? {
            return Ok(outcome);
        }
        let v = self.view_ref(view)?;
        if v.cursor >= self.buffer.len_chars() {
            return Ok(EditOutcome::unchanged(v.state()));
        }
        let cursor = v.cursor;
        self.apply(view, EditRequest::delete(cursor, cursor + 1))
    }

    fn delete_selection(&mut self, view: ViewId) -> Result<Option<EditOutcome>, EditError> {
        match self.view_ref(view)?.selection {
            Some(sel) if !sel.is_empty() => self
                .apply(view, EditRequest::delete(sel.start, sel.end))
                .map(Some),
            _ => Ok(None),
        }
    }

    // ----------------------------------------------------------------------------
    // Cursor & selection (no content change, no fan-out)
    // ----------------------------------------------------------------------------

    /// Arrow-key motion. Clears the selection; only Up/Down keep the goal column.
    pub fn move_cursor(&mut self, view: ViewId, m: Motion) -> Result<CursorState, EditError> {
        let v = self.view_ref(view)?;
        let (cursor, goal) = match m {
            Motion::Left => (motion::left(&self.buffer, v.cursor), None),
            Motion::Right => (motion::right(&self.buffer, v.cursor), None),
            Motion::LineStart => (motion::line_start(&self.buffer, v.cursor)?, None),
            Motion::LineEnd => (motion::line_end(&self.buffer, v.cursor)?, None),
            Motion::Up => motion::up(&self.buffer, v.cursor, v.goal_col)?,
            Motion::Down => motion::down(&self.buffer, v.cursor, v.goal_col)?,
        };
        let v = self.view_mut(view)?;
        v.restore(CursorState::at(cursor));
        v.goal_col = goal;
        trace!(target: "model.document", view = %view, motion = ?m, cursor, goal_col = ?goal, "move_cursor");
        Ok(v.state())
    }

    /// Place the cursor (mouse press). Sets the anchor for a following drag.
    pub fn click(&mut self, view: ViewId, offset: usize) -> Result<CursorState, EditError> {
        self.buffer.check_offset(offset)?;
        let v = self.view_mut(view)?;
        v.restore(CursorState::at(offset));
        Ok(v.state())
    }

    /// Move the cursor to `offset` keeping the anchor fixed (drag or
    /// shift-click). The selection spans anchor..offset and is empty when they meet.
    pub fn extend_to(&mut self, view: ViewId, offset: usize) -> Result<CursorState, EditError> {
        self.buffer.check_offset(offset)?;
        let v = self.view_mut(view)?;
        let anchor = v.anchor.unwrap_or(v.cursor);
        v.cursor = offset;
        v.selection = (offset != anchor).then(|| Selection::new(anchor, offset));
        v.anchor = Some(anchor);
        v.goal_col = None;
        Ok(v.state())
    }

    /// Explicit selection with the cursor at `head`.
    pub fn select(
        &mut self,
        view: ViewId,
        anchor: usize,
        head: usize,
    ) -> Result<CursorState, EditError> {
        self.buffer.check_offset(anchor)?;
        self.buffer.check_offset(head)?;
        let v = self.view_mut(view)?;
        v.cursor = head;
        v.anchor = Some(anchor);
        v.selection = (anchor != head).then(|| Selection::new(anchor, head));
        v.goal_col = None;
        Ok(v.state())
    }

    /// Text under the view's selection, for an external clipboard.
    pub fn selected_text(&self, view: ViewId) -> Result<Option<String>, EditError> {
        match self.view_ref(view)?.selection {
            Some(sel) => Ok(Some(self.buffer.slice(sel.start, sel.end)?)),
            None => Ok(None),
        }
    }

    pub fn cursor_row_col(&self, view: ViewId) -> Result<RowCol, EditError> {
        let cursor = self.view_ref(view)?.cursor;
        Ok(offset_to_row_col(&self.buffer, cursor)?)
    }

    fn view_ref(&self, id: ViewId) -> Result<&View, EditError> {
        self.views.get(id).ok_or(EditError::UnknownView(id))
    }

    fn view_mut(&mut self, id: ViewId) -> Result<&mut View, EditError> {
        self.views.get_mut(id).ok_or(EditError::UnknownView(id))
    }
}
