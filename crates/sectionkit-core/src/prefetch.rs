//! Prefetch scheduling over the flattened item order.
//!
//! Items just outside the visible window are handed out ahead of time so a
//! renderer can measure them (or start their image work) before they scroll
//! in. Section boundaries are ignored: the last item of one section is
//! directly followed by the first item of the next.

use std::collections::VecDeque;

use crate::identity::ItemId;
use crate::snapshot::Snapshot;

#[derive(Clone, Debug)]
pub struct PrefetchStrategy {
    /// Items to queue beyond the visible window.
    pub prefetch_count: usize,
    pub enabled: bool,
}

impl Default for PrefetchStrategy {
    fn default() -> Self {
        Self {
            prefetch_count: 2,
            enabled: true,
        }
    }
}

impl PrefetchStrategy {
    pub fn new(prefetch_count: usize) -> Self {
        Self {
            prefetch_count,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            prefetch_count: 0,
            enabled: false,
        }
    }
}

/// Which way the window is moving. Forward means towards later items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Forward,
    Backward,
}

impl ScrollDirection {
    /// Sign convention of a scroll delta: zero counts as forward.
    pub fn from_delta(delta: f32) -> Self {
        if delta >= 0.0 {
            ScrollDirection::Forward
        } else {
            ScrollDirection::Backward
        }
    }
}

#[derive(Debug, Default)]
pub struct PrefetchScheduler {
    prefetch_queue: VecDeque<ItemId>,
}

impl PrefetchScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the queue for the window spanning `first_visible` to
    /// `last_visible`, nearest item first.
    ///
    /// Ids missing from `snapshot` clear the queue.
    pub fn update(
        &mut self,
        snapshot: &Snapshot,
        first_visible: ItemId,
        last_visible: ItemId,
        direction: ScrollDirection,
        strategy: &PrefetchStrategy,
    ) {
        self.prefetch_queue.clear();
        if !strategy.enabled || strategy.prefetch_count == 0 {
            return;
        }

        let flat: Vec<ItemId> = snapshot.item_ids().collect();
        let position = |id: ItemId| flat.iter().position(|candidate| *candidate == id);
        let (Some(first), Some(last)) = (position(first_visible), position(last_visible)) else {
            log::trace!("prefetch window {first_visible:?}..{last_visible:?} is not in the snapshot");
            return;
        };
        let (first, last) = (first.min(last), first.max(last));

        match direction {
            ScrollDirection::Forward => {
                self.prefetch_queue
                    .extend(flat.iter().skip(last + 1).take(strategy.prefetch_count));
            }
            ScrollDirection::Backward => {
                self.prefetch_queue
                    .extend(flat[..first].iter().rev().take(strategy.prefetch_count));
            }
        }
    }

    pub fn next_prefetch(&mut self) -> Option<ItemId> {
        self.prefetch_queue.pop_front()
    }

    pub fn pending_prefetches(&self) -> &VecDeque<ItemId> {
        &self.prefetch_queue
    }
}
