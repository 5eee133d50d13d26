//! Ordered, all-or-nothing edits against a committed snapshot.
//!
//! [`apply_transaction`] clones the committed snapshot into a working copy and
//! runs every [`Action`] against it in order. Each precondition sees the
//! effects of the actions before it, so a transaction may append an item and
//! insert after that same item later on. The first failing action discards
//! the working copy and its error is returned; the committed snapshot is never
//! touched.

use crate::changes::ChangeMarks;
use crate::error::SnapshotError;
use crate::identity::{ItemId, SectionId};
use crate::item::Item;
use crate::section::Section;
use crate::snapshot::{Placement, Snapshot};

#[derive(Clone, Debug)]
pub enum Action {
    SetSections(Vec<Section>),
    AppendSections(Vec<Section>),
    DeleteSections(Vec<SectionId>),
    /// Appends to `to_section`, or to the last section when `None`.
    AppendItems {
        items: Vec<Item>,
        to_section: Option<SectionId>,
    },
    DeleteItems(Vec<ItemId>),
    InsertItemsAfterItem {
        items: Vec<Item>,
        after: ItemId,
    },
    InsertItemsBeforeItem {
        items: Vec<Item>,
        before: ItemId,
    },
    InsertSectionsAfterSection {
        sections: Vec<Section>,
        after: SectionId,
    },
    InsertSectionsBeforeSection {
        sections: Vec<Section>,
        before: SectionId,
    },
    MoveItemAfterItem {
        item: ItemId,
        after: ItemId,
    },
    MoveItemBeforeItem {
        item: ItemId,
        before: ItemId,
    },
    MoveSectionAfterSection {
        section: SectionId,
        after: SectionId,
    },
    MoveSectionBeforeSection {
        section: SectionId,
        before: SectionId,
    },
    ReloadItems(Vec<ItemId>),
    ReloadSections(Vec<SectionId>),
    /// In-place refresh without replacing the visual.
    ReconfigureItems(Vec<ItemId>),
    /// Reconfigure where the renderer supports it, reload otherwise.
    ReconfigureOrReloadItems(Vec<ItemId>),
}

impl Action {
    /// Actions with an empty operand list change nothing.
    ///
    /// `SetSections` with no sections is not a no-op: it clears the snapshot.
    pub fn is_noop(&self) -> bool {
        match self {
            Action::SetSections(_) => false,
            Action::AppendSections(sections)
            | Action::InsertSectionsAfterSection { sections, .. }
            | Action::InsertSectionsBeforeSection { sections, .. } => sections.is_empty(),
            Action::AppendItems { items, .. }
            | Action::InsertItemsAfterItem { items, .. }
            | Action::InsertItemsBeforeItem { items, .. } => items.is_empty(),
            Action::DeleteSections(ids) | Action::ReloadSections(ids) => ids.is_empty(),
            Action::DeleteItems(ids)
            | Action::ReloadItems(ids)
            | Action::ReconfigureItems(ids)
            | Action::ReconfigureOrReloadItems(ids) => ids.is_empty(),
            Action::MoveItemAfterItem { .. }
            | Action::MoveItemBeforeItem { .. }
            | Action::MoveSectionAfterSection { .. }
            | Action::MoveSectionBeforeSection { .. } => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::SetSections(_) => "set_sections",
            Action::AppendSections(_) => "append_sections",
            Action::DeleteSections(_) => "delete_sections",
            Action::AppendItems { .. } => "append_items",
            Action::DeleteItems(_) => "delete_items",
            Action::InsertItemsAfterItem { .. } => "insert_items_after_item",
            Action::InsertItemsBeforeItem { .. } => "insert_items_before_item",
            Action::InsertSectionsAfterSection { .. } => "insert_sections_after_section",
            Action::InsertSectionsBeforeSection { .. } => "insert_sections_before_section",
            Action::MoveItemAfterItem { .. } => "move_item_after_item",
            Action::MoveItemBeforeItem { .. } => "move_item_before_item",
            Action::MoveSectionAfterSection { .. } => "move_section_after_section",
            Action::MoveSectionBeforeSection { .. } => "move_section_before_section",
            Action::ReloadItems(_) => "reload_items",
            Action::ReloadSections(_) => "reload_sections",
            Action::ReconfigureItems(_) => "reconfigure_items",
            Action::ReconfigureOrReloadItems(_) => "reconfigure_or_reload_items",
        }
    }
}

/// An ordered list of [`Action`]s validated and applied as one unit.
///
/// ```rust,ignore
/// let transaction = Transaction::new()
///     .append_items(vec![row], Some(feed))
///     .insert_items_after_item(vec![ad], row_id)
///     .reconfigure_items(vec![header_id]);
/// data_source.apply(transaction, true, || {})?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct Transaction {
    actions: Vec<Action>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn set_sections(self, sections: Vec<Section>) -> Self {
        self.push(Action::SetSections(sections))
    }

    pub fn append_sections(self, sections: Vec<Section>) -> Self {
        self.push(Action::AppendSections(sections))
    }

    pub fn delete_sections(self, sections: Vec<SectionId>) -> Self {
        self.push(Action::DeleteSections(sections))
    }

    pub fn append_items(self, items: Vec<Item>, to_section: Option<SectionId>) -> Self {
        self.push(Action::AppendItems { items, to_section })
    }

    pub fn delete_items(self, items: Vec<ItemId>) -> Self {
        self.push(Action::DeleteItems(items))
    }

    pub fn insert_items_after_item(self, items: Vec<Item>, after: ItemId) -> Self {
        self.push(Action::InsertItemsAfterItem { items, after })
    }

    pub fn insert_items_before_item(self, items: Vec<Item>, before: ItemId) -> Self {
        self.push(Action::InsertItemsBeforeItem { items, before })
    }

    pub fn insert_sections_after_section(self, sections: Vec<Section>, after: SectionId) -> Self {
        self.push(Action::InsertSectionsAfterSection { sections, after })
    }

    pub fn insert_sections_before_section(self, sections: Vec<Section>, before: SectionId) -> Self {
        self.push(Action::InsertSectionsBeforeSection { sections, before })
    }

    pub fn move_item_after_item(self, item: ItemId, after: ItemId) -> Self {
        self.push(Action::MoveItemAfterItem { item, after })
    }

    pub fn move_item_before_item(self, item: ItemId, before: ItemId) -> Self {
        self.push(Action::MoveItemBeforeItem { item, before })
    }

    pub fn move_section_after_section(self, section: SectionId, after: SectionId) -> Self {
        self.push(Action::MoveSectionAfterSection { section, after })
    }

    pub fn move_section_before_section(self, section: SectionId, before: SectionId) -> Self {
        self.push(Action::MoveSectionBeforeSection { section, before })
    }

    pub fn reload_items(self, items: Vec<ItemId>) -> Self {
        self.push(Action::ReloadItems(items))
    }

    pub fn reload_sections(self, sections: Vec<SectionId>) -> Self {
        self.push(Action::ReloadSections(sections))
    }

    pub fn reconfigure_items(self, items: Vec<ItemId>) -> Self {
        self.push(Action::ReconfigureItems(items))
    }

    pub fn reconfigure_or_reload_items(self, items: Vec<ItemId>) -> Self {
        self.push(Action::ReconfigureOrReloadItems(items))
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// True when every action has an empty operand list.
    pub fn is_noop(&self) -> bool {
        self.actions.iter().all(Action::is_noop)
    }
}

/// Working copy that passed validation end to end, ready to be committed.
#[derive(Debug)]
pub struct TransactionOutcome {
    pub snapshot: Snapshot,
    pub marks: ChangeMarks,
}

/// Validates and applies `transaction` on a copy of `committed`.
pub fn apply_transaction(
    committed: &Snapshot,
    transaction: Transaction,
) -> Result<TransactionOutcome, SnapshotError> {
    let mut working = committed.clone();
    let mut marks = ChangeMarks::default();

    for (index, action) in transaction.actions.into_iter().enumerate() {
        if action.is_noop() {
            log::trace!("action #{index} ({}) has no operands, skipping", action.name());
            continue;
        }
        let name = action.name();
        if let Err(err) = apply_action(&mut working, &mut marks, action) {
            log::debug!("transaction discarded at action #{index} ({name}): {err}");
            return Err(err);
        }
    }

    marks.retain_existing(&working);
    Ok(TransactionOutcome {
        snapshot: working,
        marks,
    })
}

fn apply_action(
    working: &mut Snapshot,
    marks: &mut ChangeMarks,
    action: Action,
) -> Result<(), SnapshotError> {
    match action {
        Action::SetSections(sections) => working.replace_sections(sections),
        Action::AppendSections(sections) => {
            let end = working.number_of_sections();
            working.insert_sections(end, sections)
        }
        Action::DeleteSections(ids) => {
            working.delete_sections(&ids);
            Ok(())
        }
        Action::AppendItems { items, to_section } => working.append_items(items, to_section),
        Action::DeleteItems(ids) => working.delete_items(&ids),
        Action::InsertItemsAfterItem { items, after } => {
            working.insert_items_next_to(items, after, Placement::After)
        }
        Action::InsertItemsBeforeItem { items, before } => {
            working.insert_items_next_to(items, before, Placement::Before)
        }
        Action::InsertSectionsAfterSection { sections, after } => {
            working.insert_sections_next_to(sections, after, Placement::After)
        }
        Action::InsertSectionsBeforeSection { sections, before } => {
            working.insert_sections_next_to(sections, before, Placement::Before)
        }
        Action::MoveItemAfterItem { item, after } => {
            working.move_item(item, after, Placement::After)
        }
        Action::MoveItemBeforeItem { item, before } => {
            working.move_item(item, before, Placement::Before)
        }
        Action::MoveSectionAfterSection { section, after } => {
            working.move_section(section, after, Placement::After)
        }
        Action::MoveSectionBeforeSection { section, before } => {
            working.move_section(section, before, Placement::Before)
        }
        Action::ReloadItems(ids) => {
            require_items(working, &ids)?;
            marks.reloaded_items.extend(ids);
            Ok(())
        }
        Action::ReloadSections(ids) => {
            if let Some(missing) = ids.iter().find(|id| !working.contains_section(**id)) {
                return Err(SnapshotError::NotExistingSection { section: *missing });
            }
            marks.reloaded_sections.extend(ids);
            Ok(())
        }
        Action::ReconfigureItems(ids) => {
            require_items(working, &ids)?;
            marks.reconfigured_items.extend(ids);
            Ok(())
        }
        Action::ReconfigureOrReloadItems(ids) => {
            require_items(working, &ids)?;
            marks.reconfigured_or_reloaded_items.extend(ids);
            Ok(())
        }
    }
}

fn require_items(working: &Snapshot, ids: &[ItemId]) -> Result<(), SnapshotError> {
    match ids.iter().find(|id| !working.contains_item(**id)) {
        Some(missing) => Err(SnapshotError::NotExistingItem { item: *missing }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Sizable;
    use crate::layout_cache::{Axis, CalculationContext};

    #[derive(Hash)]
    struct Row(u128);

    impl Sizable for Row {
        fn measure(&self, _context: &CalculationContext, _axis: Axis) -> f32 {
            44.0
        }
    }

    fn item(n: u128) -> Item {
        Item::with_id(ItemId::from_u128(n), Row(n))
    }

    fn section(n: u128, items: &[u128]) -> Section {
        Section::with_id(SectionId::from_u128(n), items.iter().copied().map(item).collect()).unwrap()
    }

    fn committed() -> Snapshot {
        Snapshot::from_sections(vec![section(1, &[1, 2])]).unwrap()
    }

    fn item_ids(snapshot: &Snapshot) -> Vec<u128> {
        snapshot.item_ids().map(|id| id.as_u128()).collect()
    }

    #[test]
    fn later_actions_see_earlier_ones() {
        let transaction = Transaction::new()
            .append_items(vec![item(3)], Some(SectionId::from_u128(1)))
            .insert_items_after_item(vec![item(4)], ItemId::from_u128(3))
            .insert_items_before_item(vec![item(5)], ItemId::from_u128(1));

        let outcome = apply_transaction(&committed(), transaction).unwrap();

        assert_eq!(item_ids(&outcome.snapshot), vec![5, 1, 2, 3, 4]);
    }

    #[test]
    fn failure_reports_the_first_broken_action() {
        let base = committed();
        let transaction = Transaction::new()
            .append_items(vec![item(3)], None)
            .insert_items_after_item(vec![item(4)], ItemId::from_u128(9))
            .append_items(vec![item(1)], None);

        let err = apply_transaction(&base, transaction).unwrap_err();

        assert_eq!(err, SnapshotError::NotExistingItem { item: ItemId::from_u128(9) });
        assert_eq!(item_ids(&base), vec![1, 2]);
    }

    #[test]
    fn insert_after_checks_anchor_then_collisions() {
        let base = committed();

        let existing = Transaction::new().insert_items_after_item(vec![item(2)], ItemId::from_u128(1));
        assert_eq!(
            apply_transaction(&base, existing).unwrap_err(),
            SnapshotError::ExistingItem { item: ItemId::from_u128(2) }
        );

        let repeated =
            Transaction::new().insert_items_after_item(vec![item(7), item(7)], ItemId::from_u128(1));
        assert_eq!(
            apply_transaction(&base, repeated).unwrap_err(),
            SnapshotError::NotUniqueItems { item: ItemId::from_u128(7) }
        );
    }

    #[test]
    fn section_inserts_mirror_item_inserts() {
        let base = committed();

        let missing = Transaction::new()
            .insert_sections_after_section(vec![section(2, &[20])], SectionId::from_u128(9));
        assert_eq!(
            apply_transaction(&base, missing).unwrap_err(),
            SnapshotError::NotExistingSection { section: SectionId::from_u128(9) }
        );

        let existing = Transaction::new()
            .insert_sections_after_section(vec![section(1, &[20])], SectionId::from_u128(1));
        assert_eq!(
            apply_transaction(&base, existing).unwrap_err(),
            SnapshotError::ExistingSection { section: SectionId::from_u128(1) }
        );

        let repeated = Transaction::new().insert_sections_after_section(
            vec![section(2, &[20]), section(2, &[21])],
            SectionId::from_u128(1),
        );
        assert_eq!(
            apply_transaction(&base, repeated).unwrap_err(),
            SnapshotError::NotUniqueSections { section: SectionId::from_u128(2) }
        );

        let inserted = Transaction::new()
            .insert_sections_before_section(vec![section(2, &[20])], SectionId::from_u128(1));
        let outcome = apply_transaction(&base, inserted).unwrap();
        let order: Vec<u128> = outcome.snapshot.section_ids().map(|id| id.as_u128()).collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn empty_operands_are_skipped_inside_a_batch() {
        let transaction = Transaction::new()
            .append_items(Vec::new(), None)
            .delete_items(Vec::new())
            .append_items(vec![item(3)], None);
        assert!(!transaction.is_noop());

        let outcome = apply_transaction(&committed(), transaction).unwrap();
        assert_eq!(item_ids(&outcome.snapshot), vec![1, 2, 3]);
    }

    #[test]
    fn marks_require_existing_targets_and_drop_deleted_ones() {
        let base = committed();
        let missing = Transaction::new().reconfigure_items(vec![ItemId::from_u128(8)]);
        assert_eq!(
            apply_transaction(&base, missing).unwrap_err(),
            SnapshotError::NotExistingItem { item: ItemId::from_u128(8) }
        );

        let transaction = Transaction::new()
            .reload_items(vec![ItemId::from_u128(1), ItemId::from_u128(2)])
            .delete_items(vec![ItemId::from_u128(1)]);
        let outcome = apply_transaction(&base, transaction).unwrap();
        let reloaded: Vec<ItemId> = outcome.marks.reloaded_items.iter().copied().collect();
        assert_eq!(reloaded, vec![ItemId::from_u128(2)]);
    }

    #[test]
    fn append_without_sections_fails() {
        let err = apply_transaction(&Snapshot::new(), Transaction::new().append_items(vec![item(1)], None))
            .unwrap_err();
        assert_eq!(err, SnapshotError::NoSections);
    }
}
