//! Owns the committed snapshot and feeds its changes to a renderer.

use std::rc::Rc;

use crate::changes::SnapshotChanges;
use crate::collections::map::HashSet;
use crate::content::EntityKind;
use crate::divider::{separate_sections, DefaultDividerStrategy, DividerStrategy};
use crate::error::{ExtentError, SnapshotError};
use crate::identity::{ItemId, SectionId};
use crate::item::Item;
use crate::layout_cache::{Axis, CalculationContextProvider};
use crate::prefetch::{PrefetchScheduler, PrefetchStrategy, ScrollDirection};
use crate::renderer::{Completion, RenderUpdate, RendererAdapter};
use crate::section::Section;
use crate::snapshot::Snapshot;
use crate::transaction::{apply_transaction, Transaction, TransactionOutcome};

#[derive(Clone, Debug, Default)]
pub struct DataSourceConfig {
    /// `debug_assert!` on rejected transactions. The error is returned either
    /// way; release builds only log it.
    pub assert_on_failure: bool,
    pub prefetch: PrefetchStrategy,
}

/// Serializes transactions against one committed [`Snapshot`].
///
/// Every successful transaction is committed in one replace and, if it
/// changed anything, reaches the renderer exactly once. A rejected
/// transaction leaves the committed snapshot untouched and never calls the
/// renderer.
pub struct DataSource<R: RendererAdapter> {
    renderer: R,
    snapshot: Rc<Snapshot>,
    divider_strategy: Box<dyn DividerStrategy>,
    context_provider: Box<dyn CalculationContextProvider>,
    registered_kinds: HashSet<EntityKind>,
    prefetch: PrefetchScheduler,
    config: DataSourceConfig,
}

impl<R: RendererAdapter> DataSource<R> {
    pub fn new(renderer: R, context_provider: impl CalculationContextProvider + 'static) -> Self {
        Self::with_config(renderer, context_provider, DataSourceConfig::default())
    }

    pub fn with_config(
        renderer: R,
        context_provider: impl CalculationContextProvider + 'static,
        config: DataSourceConfig,
    ) -> Self {
        Self {
            renderer,
            snapshot: Rc::new(Snapshot::new()),
            divider_strategy: Box::new(DefaultDividerStrategy),
            context_provider: Box::new(context_provider),
            registered_kinds: HashSet::default(),
            prefetch: PrefetchScheduler::new(),
            config,
        }
    }

    /// Replaces the divider policy. Takes effect with the next transaction.
    pub fn with_divider_strategy(mut self, strategy: impl DividerStrategy + 'static) -> Self {
        self.divider_strategy = Box::new(strategy);
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The committed snapshot as handed to the renderer.
    pub fn shared_snapshot(&self) -> Rc<Snapshot> {
        Rc::clone(&self.snapshot)
    }

    /// Replaces every section at once.
    pub fn apply_sections(
        &mut self,
        sections: Vec<Section>,
        animated: bool,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<(), SnapshotError> {
        self.apply(Transaction::new().set_sections(sections), animated, on_complete)
    }

    /// Validates and commits `transaction`.
    ///
    /// `on_complete` runs once the renderer finished the visual update, or
    /// right away when nothing changed. It never runs for a rejected
    /// transaction.
    pub fn apply(
        &mut self,
        transaction: Transaction,
        animated: bool,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<(), SnapshotError> {
        self.commit(transaction, animated, Completion::new(on_complete))
    }

    /// Like [`DataSource::apply`], resolving once the renderer signalled
    /// completion.
    pub async fn apply_async(
        &mut self,
        transaction: Transaction,
        animated: bool,
    ) -> Result<(), SnapshotError> {
        let (completion, signal) = Completion::signal();
        self.commit(transaction, animated, completion)?;
        signal.await;
        Ok(())
    }

    pub fn append_items(
        &mut self,
        items: Vec<Item>,
        to_section: Option<SectionId>,
        animated: bool,
    ) -> Result<(), SnapshotError> {
        if items.is_empty() {
            return Ok(());
        }
        self.apply(Transaction::new().append_items(items, to_section), animated, || {})
    }

    pub fn append_sections(&mut self, sections: Vec<Section>, animated: bool) -> Result<(), SnapshotError> {
        if sections.is_empty() {
            return Ok(());
        }
        self.apply(Transaction::new().append_sections(sections), animated, || {})
    }

    pub fn delete_items(&mut self, items: Vec<ItemId>, animated: bool) -> Result<(), SnapshotError> {
        if items.is_empty() {
            return Ok(());
        }
        self.apply(Transaction::new().delete_items(items), animated, || {})
    }

    pub fn delete_sections(&mut self, sections: Vec<SectionId>, animated: bool) -> Result<(), SnapshotError> {
        if sections.is_empty() {
            return Ok(());
        }
        self.apply(Transaction::new().delete_sections(sections), animated, || {})
    }

    pub fn insert_items_after(
        &mut self,
        items: Vec<Item>,
        after: ItemId,
        animated: bool,
    ) -> Result<(), SnapshotError> {
        if items.is_empty() {
            return Ok(());
        }
        self.apply(Transaction::new().insert_items_after_item(items, after), animated, || {})
    }

    pub fn insert_sections_after(
        &mut self,
        sections: Vec<Section>,
        after: SectionId,
        animated: bool,
    ) -> Result<(), SnapshotError> {
        if sections.is_empty() {
            return Ok(());
        }
        self.apply(
            Transaction::new().insert_sections_after_section(sections, after),
            animated,
            || {},
        )
    }

    pub fn reload_items(&mut self, items: Vec<ItemId>, animated: bool) -> Result<(), SnapshotError> {
        if items.is_empty() {
            return Ok(());
        }
        self.apply(Transaction::new().reload_items(items), animated, || {})
    }

    pub fn reconfigure_items(&mut self, items: Vec<ItemId>, animated: bool) -> Result<(), SnapshotError> {
        if items.is_empty() {
            return Ok(());
        }
        self.apply(Transaction::new().reconfigure_items(items), animated, || {})
    }

    pub fn reconfigure_or_reload_items(
        &mut self,
        items: Vec<ItemId>,
        animated: bool,
    ) -> Result<(), SnapshotError> {
        if items.is_empty() {
            return Ok(());
        }
        self.apply(Transaction::new().reconfigure_or_reload_items(items), animated, || {})
    }

    /// Extent of a committed item under the current environment. `None` when
    /// the item is not in the snapshot.
    pub fn item_extent(
        &self,
        id: ItemId,
        available_orthogonal_dimension: f32,
        axis: Axis,
    ) -> Result<Option<f32>, ExtentError> {
        let context = self.context_provider.context_for(available_orthogonal_dimension);
        self.snapshot
            .item(id)
            .map(|item| item.compute_extent(&context, axis))
            .transpose()
    }

    /// Content extent of a committed section, insets included.
    pub fn section_extent(
        &self,
        id: SectionId,
        available_orthogonal_dimension: f32,
        axis: Axis,
    ) -> Result<Option<f32>, ExtentError> {
        let context = self.context_provider.context_for(available_orthogonal_dimension);
        self.snapshot
            .section(id)
            .map(|section| section.compute_content_extent(&context, axis))
            .transpose()
    }

    /// Returns whether the item was found.
    pub fn invalidate_item_extents(&self, id: ItemId) -> bool {
        match self.snapshot.item(id) {
            Some(item) => {
                item.invalidate_extents();
                true
            }
            None => false,
        }
    }

    /// Forgets every memoized extent, e.g. after an environment change the
    /// fingerprint cannot express.
    pub fn clear_cached_extents(&self) {
        for section in self.snapshot.sections() {
            section.clear_cached_extents();
        }
    }

    /// Items to prepare next for the given visible window, nearest first.
    pub fn update_visible_range(
        &mut self,
        first_visible: ItemId,
        last_visible: ItemId,
        direction: ScrollDirection,
    ) -> Vec<ItemId> {
        self.prefetch.update(
            &self.snapshot,
            first_visible,
            last_visible,
            direction,
            &self.config.prefetch,
        );
        self.prefetch.pending_prefetches().iter().copied().collect()
    }

    /// Pops the next queued prefetch.
    pub fn next_prefetch(&mut self) -> Option<ItemId> {
        self.prefetch.next_prefetch()
    }

    fn commit(
        &mut self,
        transaction: Transaction,
        animated: bool,
        completion: Completion,
    ) -> Result<(), SnapshotError> {
        let TransactionOutcome { mut snapshot, marks } =
            match apply_transaction(&self.snapshot, transaction) {
                Ok(outcome) => outcome,
                Err(err) => {
                    completion.discard();
                    self.report_failure(&err);
                    return Err(err);
                }
            };

        separate_sections(self.divider_strategy.as_ref(), snapshot.sections_mut());
        let changes = SnapshotChanges::between(
            &self.snapshot,
            &snapshot,
            &marks,
            self.renderer.supports_reconfigure(),
        );
        let snapshot = Rc::new(snapshot);
        self.snapshot = Rc::clone(&snapshot);

        if changes.is_empty() {
            log::trace!("transaction committed without visible changes");
            completion.complete();
            return Ok(());
        }

        self.register_new_kinds();
        log::debug!(
            "committing {} sections / {} items (+{} -{} ~{} items)",
            snapshot.number_of_sections(),
            snapshot.number_of_items(),
            changes.inserted_items.len(),
            changes.deleted_items.len(),
            changes.updated_items.len(),
        );
        self.renderer.apply(
            RenderUpdate {
                snapshot,
                changes,
                animated,
            },
            completion,
        );
        Ok(())
    }

    fn register_new_kinds(&mut self) {
        for section in self.snapshot.sections() {
            let kinds = section
                .items()
                .iter()
                .map(Item::kind)
                .chain(section.supplementary_items().map(|item| item.kind()))
                .chain(section.decoration_items().map(|item| item.kind()));
            for kind in kinds {
                if self.registered_kinds.insert(kind) {
                    log::trace!("registering content kind {}", kind.name());
                    self.renderer.register(&kind);
                }
            }
        }
    }

    fn report_failure(&self, err: &SnapshotError) {
        log::warn!("transaction rejected: {err}");
        debug_assert!(!self.config.assert_on_failure, "transaction rejected: {err}");
    }
}
