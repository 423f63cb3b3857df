//! Callback fan-out for view layers that share one document.
//!
//! `SharedDocument` wraps a `Document` for cooperative single-threaded GUI
//! glue: every view registers a weakly held `ViewObserver`, and after each
//! successful mutation the handle calls `content_changed` on the views named
//! in the outcome's notify list, in registration order. The document never
//! keeps a view alive; observers that were dropped without detaching are
//! pruned (and their views detached) before the next mutation.
//!
//! Undo and redo also call back the owning view when another view requested
//! the step: its cursor was restored in place and it has to re-render too.
//!
//! Handlers receive a read-only `&Document`. Calling back into a mutating
//! method while a fan-out is running is a programming error in the view layer
//! and panics.

use std::cell::{Cell, RefCell};
use std::rc::Weak;

use core_state::ViewId;
use tracing::{debug, trace};

use crate::{DetachOutcome, Document, EditError, EditOutcome, EditRequest, HistoryOutcome};

/// Re-render hook implemented by the view layer.
pub trait ViewObserver {
    /// Content changed underneath `view`; its cursor has already been clamped.
    fn content_changed(&self, view: ViewId, doc: &Document);
}

pub struct SharedDocument {
    doc: RefCell<Document>,
    observers: RefCell<Vec<(ViewId, Weak<dyn ViewObserver>)>>,
    notifying: Cell<bool>,
}

struct FanOutGuard<'a>(&'a Cell<bool>);

impl Drop for FanOutGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl SharedDocument {
    pub fn new(doc: Document) -> Self {
        Self {
            doc: RefCell::new(doc),
            observers: RefCell::new(Vec::new()),
            notifying: Cell::new(false),
        }
    }

    /// Run `f` with read access. Allowed from inside notification handlers.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.doc.borrow())
    }

    pub fn attach(&self, observer: Weak<dyn ViewObserver>) -> ViewId {
        let id = self.mutate(|doc| doc.attach());
        self.observers.borrow_mut().push((id, observer));
        id
    }

    pub fn detach(&self, view: ViewId) -> Result<DetachOutcome, EditError> {
        let outcome = self.mutate(|doc| doc.detach(view))?;
        self.observers.borrow_mut().retain(|(id, _)| *id != view);
        Ok(outcome)
    }

    pub fn apply(&self, view: ViewId, request: EditRequest) -> Result<EditOutcome, EditError> {
        let outcome = self.mutate(|doc| doc.apply(view, request))?;
        self.fan_out(&outcome.notify);
        Ok(outcome)
    }

    pub fn type_text(&self, view: ViewId, text: &str) -> Result<EditOutcome, EditError> {
        let outcome = self.mutate(|doc| doc.type_text(view, text))?;
        self.fan_out(&outcome.notify);
        Ok(outcome)
    }

    pub fn backspace(&self, view: ViewId) -> Result<EditOutcome, EditError> {
        let outcome = self.mutate(|doc| doc.backspace(view))?;
        self.fan_out(&outcome.notify);
        Ok(outcome)
    }

    pub fn delete_forward(&self, view: ViewId) -> Result<EditOutcome, EditError> {
        let outcome = self.mutate(|doc| doc.delete_forward(view))?;
        self.fan_out(&outcome.notify);
        Ok(outcome)
    }

    pub fn undo(&self, view: ViewId) -> Result<Option<HistoryOutcome>, EditError> {
        let outcome = self.mutate(|doc| doc.undo(view))?;
        if let Some(o) = &outcome {
            self.history_fan_out(view, o);
        }
        Ok(outcome)
    }

    pub fn redo(&self, view: ViewId) -> Result<Option<HistoryOutcome>, EditError> {
        let outcome = self.mutate(|doc| doc.redo(view))?;
        if let Some(o) = &outcome {
            self.history_fan_out(view, o);
        }
        Ok(outcome)
    }

    /// Mutable access for operations without fan-out (cursor motion, selection, save).
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        self.mutate(f)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        assert!(!self.notifying.get(), "{}", EditError::ReentrantMutation);
        self.prune_dead_observers();
        f(&mut self.doc.borrow_mut())
    }

    fn prune_dead_observers(&self) {
        let mut dead = Vec::new();
        self.observers.borrow_mut().retain(|(id, obs)| {
            let alive = obs.strong_count() > 0;
            if !alive {
                dead.push(*id);
            }
            alive
        });
        if dead.is_empty() {
            return;
        }
        let mut doc = self.doc.borrow_mut();
        for id in dead {
            // Already detached through `Document` directly is fine.
            let _ = doc.detach(id);
            debug!(target: "model.shared", view = %id, "observer_dropped_view_detached");
        }
    }

    /// `notify` already holds every view but the owner; add the owner back
    /// unless it is the requester (whose caller holds the outcome).
    fn history_fan_out(&self, requester: ViewId, outcome: &HistoryOutcome) {
        let owner_attached = self.doc.borrow().view(outcome.owner).is_some();
        if outcome.owner != requester && owner_attached {
            let mut targets = outcome.notify.clone();
            targets.push(outcome.owner);
            self.fan_out(&targets);
        } else {
            self.fan_out(&outcome.notify);
        }
    }

    /// Call `content_changed` on every live observer named in `notify`, in
    /// registration order.
    fn fan_out(&self, notify: &[ViewId]) {
        if notify.is_empty() {
            return;
        }
        self.notifying.set(true);
        let _guard = FanOutGuard(&self.notifying);
        let targets: Vec<_> = self
            .observers
            .borrow()
            .iter()
            .filter(|(id, _)| notify.contains(id))
            .filter_map(|(id, w)| w.upgrade().map(|o| (*id, o)))
            .collect();
        let doc = self.doc.borrow();
        for (id, observer) in targets {
            trace!(target: "model.shared", view = %id, "content_changed");
            observer.content_changed(id, &doc);
        }
    }
}
