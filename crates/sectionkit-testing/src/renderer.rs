//! A renderer that records what it is asked to draw.

use std::cell::RefCell;
use std::rc::Rc;

use sectionkit_core::{Completion, EntityKind, RenderUpdate, RendererAdapter};

/// Completions a deferring [`RecordingRenderer`] is holding on to.
///
/// Cloned out of the renderer before it is moved into a data source, so a
/// test can finish visual updates while an `apply_async` future is alive.
#[derive(Clone, Default)]
pub struct PendingCompletions {
    inner: Rc<RefCell<Vec<Completion>>>,
}

impl PendingCompletions {
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Completes every held update, oldest first. Returns how many ran.
    pub fn complete_all(&self) -> usize {
        let drained: Vec<Completion> = self.inner.borrow_mut().drain(..).collect();
        let count = drained.len();
        for completion in drained {
            completion.complete();
        }
        count
    }

    fn push(&self, completion: Completion) {
        self.inner.borrow_mut().push(completion);
    }
}

pub struct RecordingRenderer {
    registered: Vec<EntityKind>,
    updates: Vec<RenderUpdate>,
    pending: PendingCompletions,
    defer_completion: bool,
    supports_reconfigure: bool,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRenderer {
    /// Completes every update immediately and supports reconfiguration.
    pub fn new() -> Self {
        Self {
            registered: Vec::new(),
            updates: Vec::new(),
            pending: PendingCompletions::default(),
            defer_completion: false,
            supports_reconfigure: true,
        }
    }

    /// Holds completions until [`PendingCompletions::complete_all`] runs.
    pub fn deferring() -> Self {
        Self {
            defer_completion: true,
            ..Self::new()
        }
    }

    pub fn without_reconfigure(mut self) -> Self {
        self.supports_reconfigure = false;
        self
    }

    pub fn pending_completions(&self) -> PendingCompletions {
        self.pending.clone()
    }

    pub fn registered_kinds(&self) -> &[EntityKind] {
        &self.registered
    }

    pub fn updates(&self) -> &[RenderUpdate] {
        &self.updates
    }

    pub fn last_update(&self) -> Option<&RenderUpdate> {
        self.updates.last()
    }

    pub fn update_count(&self) -> usize {
        self.updates.len()
    }
}

impl RendererAdapter for RecordingRenderer {
    fn register(&mut self, kind: &EntityKind) {
        log::trace!("recording registration of {kind:?}");
        self.registered.push(*kind);
    }

    fn apply(&mut self, update: RenderUpdate, completion: Completion) {
        self.updates.push(update);
        if self.defer_completion {
            self.pending.push(completion);
        } else {
            completion.complete();
        }
    }

    fn supports_reconfigure(&self) -> bool {
        self.supports_reconfigure
    }
}
