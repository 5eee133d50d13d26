//! Id-based difference between two committed snapshots.
//!
//! Renderers receive a [`SnapshotChanges`] with every committed snapshot and
//! decide on their own how (and whether) to animate it.

use crate::collections::map::HashMap;
use crate::collections::ordered::OrderedSet;
use crate::identity::{ItemId, SectionId};
use crate::snapshot::Snapshot;

/// Explicit refresh requests collected while a transaction runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeMarks {
    pub reloaded_sections: OrderedSet<SectionId>,
    pub reloaded_items: OrderedSet<ItemId>,
    pub reconfigured_items: OrderedSet<ItemId>,
    pub reconfigured_or_reloaded_items: OrderedSet<ItemId>,
}

impl ChangeMarks {
    pub fn is_empty(&self) -> bool {
        self.reloaded_sections.is_empty()
            && self.reloaded_items.is_empty()
            && self.reconfigured_items.is_empty()
            && self.reconfigured_or_reloaded_items.is_empty()
    }

    /// Forgets marks on entities a later action deleted.
    pub(crate) fn retain_existing(&mut self, snapshot: &Snapshot) {
        self.reloaded_sections
            .retain(|id| snapshot.contains_section(*id));
        self.reloaded_items.retain(|id| snapshot.contains_item(*id));
        self.reconfigured_items.retain(|id| snapshot.contains_item(*id));
        self.reconfigured_or_reloaded_items
            .retain(|id| snapshot.contains_item(*id));
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotChanges {
    pub inserted_sections: Vec<SectionId>,
    pub deleted_sections: Vec<SectionId>,
    pub moved_sections: Vec<SectionId>,
    /// Sections whose insets or boundary content changed.
    pub updated_sections: Vec<SectionId>,
    pub reloaded_sections: Vec<SectionId>,
    pub inserted_items: Vec<ItemId>,
    pub deleted_items: Vec<ItemId>,
    pub moved_items: Vec<ItemId>,
    /// Items that kept their id but whose content or capabilities changed.
    pub updated_items: Vec<ItemId>,
    pub reloaded_items: Vec<ItemId>,
    pub reconfigured_items: Vec<ItemId>,
}

impl SnapshotChanges {
    /// Diffs `old` against `new` and folds in the explicit marks.
    ///
    /// `reconfigured_or_reloaded_items` resolve to reconfigures when the
    /// renderer supports in-place reconfiguration and to reloads otherwise. An
    /// item marked for both a reload and a reconfigure is only reloaded.
    pub fn between(
        old: &Snapshot,
        new: &Snapshot,
        marks: &ChangeMarks,
        supports_reconfigure: bool,
    ) -> Self {
        let mut changes = SnapshotChanges::default();
        changes.diff_sections(old, new);
        changes.diff_items(old, new);

        changes.reloaded_sections = marks.reloaded_sections.iter().copied().collect();

        let mut reloaded: OrderedSet<ItemId> = marks.reloaded_items.clone();
        let mut reconfigured: OrderedSet<ItemId> = marks.reconfigured_items.clone();
        if supports_reconfigure {
            reconfigured.extend(marks.reconfigured_or_reloaded_items.iter().copied());
        } else {
            reloaded.extend(marks.reconfigured_or_reloaded_items.iter().copied());
        }
        reconfigured.retain(|id| !reloaded.contains(id));
        changes.reloaded_items = reloaded.into_iter().collect();
        changes.reconfigured_items = reconfigured.into_iter().collect();
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.inserted_sections.is_empty()
            && self.deleted_sections.is_empty()
            && self.moved_sections.is_empty()
            && self.updated_sections.is_empty()
            && self.reloaded_sections.is_empty()
            && self.inserted_items.is_empty()
            && self.deleted_items.is_empty()
            && self.moved_items.is_empty()
            && self.updated_items.is_empty()
            && self.reloaded_items.is_empty()
            && self.reconfigured_items.is_empty()
    }

    fn diff_sections(&mut self, old: &Snapshot, new: &Snapshot) {
        let old_positions: HashMap<SectionId, usize> = old
            .section_ids()
            .enumerate()
            .map(|(index, id)| (id, index))
            .collect();

        self.deleted_sections = old
            .section_ids()
            .filter(|id| !new.contains_section(*id))
            .collect();

        let mut common = Vec::new();
        for section in new.sections() {
            match old_positions.get(&section.id()) {
                None => self.inserted_sections.push(section.id()),
                Some(&position) => {
                    common.push((section.id(), position));
                    let previous = &old.sections()[position];
                    if !previous.boundary_content_eq(section) {
                        self.updated_sections.push(section.id());
                    }
                }
            }
        }

        let sequence: Vec<usize> = common.iter().map(|(_, position)| *position).collect();
        let stable = longest_increasing_run(&sequence);
        self.moved_sections = common
            .iter()
            .zip(stable)
            .filter(|(_, stable)| !stable)
            .map(|((id, _), _)| *id)
            .collect();
    }

    fn diff_items(&mut self, old: &Snapshot, new: &Snapshot) {
        let old_positions: HashMap<ItemId, (usize, usize)> = old
            .sections()
            .iter()
            .enumerate()
            .flat_map(|(section_index, section)| {
                section
                    .item_ids()
                    .enumerate()
                    .map(move |(item_index, id)| (id, (section_index, item_index)))
            })
            .collect();

        self.deleted_items = old
            .item_ids()
            .filter(|id| !new.contains_item(*id))
            .collect();

        for section in new.sections() {
            // Old positions of the items that stayed in this section, in new order.
            let mut stayed: Vec<(ItemId, usize)> = Vec::new();
            for item in section.items() {
                let Some(&(previous_section, previous_item)) = old_positions.get(&item.id()) else {
                    self.inserted_items.push(item.id());
                    continue;
                };
                let previous_section = &old.sections()[previous_section];
                if &previous_section.items()[previous_item] != item {
                    self.updated_items.push(item.id());
                }
                if previous_section.id() == section.id() {
                    stayed.push((item.id(), previous_item));
                } else {
                    self.moved_items.push(item.id());
                }
            }

            let sequence: Vec<usize> = stayed.iter().map(|(_, position)| *position).collect();
            let stable = longest_increasing_run(&sequence);
            self.moved_items.extend(
                stayed
                    .iter()
                    .zip(stable)
                    .filter(|(_, stable)| !stable)
                    .map(|((id, _), _)| *id),
            );
        }
    }
}

/// Marks the members of one longest strictly increasing subsequence.
///
/// Entries outside it are the minimal set that has to move to turn the old
/// order into the new one.
fn longest_increasing_run(sequence: &[usize]) -> Vec<bool> {
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; sequence.len()];

    for (index, &value) in sequence.iter().enumerate() {
        let slot = tails.partition_point(|&tail| sequence[tail] < value);
        if slot > 0 {
            previous[index] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(index);
        } else {
            tails[slot] = index;
        }
    }

    let mut keep = vec![false; sequence.len()];
    let mut cursor = tails.last().copied();
    while let Some(index) = cursor {
        keep[index] = true;
        cursor = previous[index];
    }
    keep
}
