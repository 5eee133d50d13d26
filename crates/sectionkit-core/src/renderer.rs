//! The seam between committed snapshots and whatever draws them.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::changes::SnapshotChanges;
use crate::content::EntityKind;
use crate::snapshot::Snapshot;

/// One committed transaction, handed to the renderer.
#[derive(Clone, Debug)]
pub struct RenderUpdate {
    pub snapshot: Rc<Snapshot>,
    pub changes: SnapshotChanges,
    pub animated: bool,
}

/// Draws committed snapshots.
///
/// `apply` runs exactly once per transaction that changed something. The
/// renderer calls [`Completion::complete`] when the visual update has
/// finished, which may be long after `apply` returned. Dropping the
/// completion counts as completing it.
pub trait RendererAdapter {
    /// Called once for every content kind, before the first update that
    /// contains it.
    fn register(&mut self, kind: &EntityKind);

    fn apply(&mut self, update: RenderUpdate, completion: Completion);

    /// Whether reconfigure-or-reload requests can be served in place.
    fn supports_reconfigure(&self) -> bool {
        true
    }
}

/// Fires the caller's completion callback exactly once.
pub struct Completion {
    callback: Option<Box<dyn FnOnce()>>,
}

impl Completion {
    pub fn new(callback: impl FnOnce() + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    pub fn noop() -> Self {
        Self { callback: None }
    }

    /// A completion paired with a future that resolves once it fires.
    pub fn signal() -> (Completion, CompletionSignal) {
        let state = Rc::new(RefCell::new(SignalState::default()));
        let weak = Rc::downgrade(&state);
        let completion = Completion::new(move || {
            if let Some(state) = weak.upgrade() {
                let mut state = state.borrow_mut();
                state.done = true;
                if let Some(waker) = state.waker.take() {
                    waker.wake();
                }
            }
        });
        (completion, CompletionSignal { state })
    }

    pub fn complete(mut self) {
        self.fire();
    }

    /// Drops the callback without running it.
    pub(crate) fn discard(mut self) {
        self.callback = None;
    }

    fn fire(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

#[derive(Default)]
struct SignalState {
    done: bool,
    waker: Option<Waker>,
}

/// Resolves when the paired [`Completion`] fires or is dropped.
pub struct CompletionSignal {
    state: Rc<RefCell<SignalState>>,
}

impl CompletionSignal {
    pub fn is_complete(&self) -> bool {
        self.state.borrow().done
    }
}

impl Future for CompletionSignal {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.state.borrow_mut();
        if state.done {
            return Poll::Ready(());
        }
        state.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}
