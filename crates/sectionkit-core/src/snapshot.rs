//! The ordered sections-and-items state handed to renderers.
//!
//! Outside this crate a [`Snapshot`] is read-only value data. The mutators
//! are crate-private and used by the transaction processor on its working
//! copy only. Each of them validates first and mutates second, so a failing
//! call leaves the working copy exactly as it was.

use std::fmt;

use crate::collections::map::{HashMap, HashSet};
use crate::error::SnapshotError;
use crate::identity::{ItemId, SectionId};
use crate::item::Item;
use crate::section::Section;

/// Position of an item: section index, then item index within that section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexPath {
    pub section: usize,
    pub item: usize,
}

impl IndexPath {
    pub fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Placement {
    Before,
    After,
}

/// Sections in display order, each owning its items in display order.
///
/// Invariants: section ids are unique, item ids are unique across all
/// sections, and no section is empty.
#[derive(Clone, Default)]
pub struct Snapshot {
    sections: Vec<Section>,
    /// Owning section of every item.
    item_sections: HashMap<ItemId, SectionId>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sections(sections: Vec<Section>) -> Result<Self, SnapshotError> {
        let mut snapshot = Self::new();
        snapshot.replace_sections(sections)?;
        Ok(snapshot)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|section| section.id() == id)
    }

    pub fn section_index(&self, id: SectionId) -> Option<usize> {
        self.sections.iter().position(|section| section.id() == id)
    }

    pub fn section_ids(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections.iter().map(Section::id)
    }

    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn number_of_items(&self) -> usize {
        self.item_sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn contains_section(&self, id: SectionId) -> bool {
        self.section_index(id).is_some()
    }

    pub fn contains_item(&self, id: ItemId) -> bool {
        self.item_sections.contains_key(&id)
    }

    pub fn section_id_of_item(&self, id: ItemId) -> Option<SectionId> {
        self.item_sections.get(&id).copied()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        let section = self.section_id_of_item(id)?;
        self.section(section)?.item(id)
    }

    pub fn index_path(&self, id: ItemId) -> Option<IndexPath> {
        let section = self.section_index(self.section_id_of_item(id)?)?;
        let item = self.sections[section].position_of(id)?;
        Some(IndexPath { section, item })
    }

    pub fn item_at(&self, path: IndexPath) -> Option<&Item> {
        self.sections.get(path.section)?.items().get(path.item)
    }

    /// Every item, section by section.
    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.sections.iter().flat_map(|section| section.items().iter())
    }

    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items().map(Item::id)
    }

    /// Re-checks every invariant from scratch.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        Snapshot::new().check_new_sections(&self.sections)?;
        if let Some(section) = self.sections.iter().find(|section| section.is_empty()) {
            return Err(SnapshotError::EmptyItems {
                section: Some(section.id()),
            });
        }
        Ok(())
    }

    pub(crate) fn sections_mut(&mut self) -> &mut [Section] {
        &mut self.sections
    }

    pub(crate) fn replace_sections(&mut self, sections: Vec<Section>) -> Result<(), SnapshotError> {
        Snapshot::new().check_new_sections(&sections)?;
        self.sections.clear();
        self.item_sections.clear();
        self.insert_unchecked(0, sections);
        Ok(())
    }

    /// Inserts `sections` so the first lands at `index`.
    pub(crate) fn insert_sections(
        &mut self,
        index: usize,
        sections: Vec<Section>,
    ) -> Result<(), SnapshotError> {
        self.check_new_sections(&sections)?;
        self.insert_unchecked(index, sections);
        Ok(())
    }

    pub(crate) fn insert_sections_next_to(
        &mut self,
        sections: Vec<Section>,
        anchor: SectionId,
        placement: Placement,
    ) -> Result<(), SnapshotError> {
        let anchor_index = self
            .section_index(anchor)
            .ok_or(SnapshotError::NotExistingSection { section: anchor })?;
        let index = match placement {
            Placement::Before => anchor_index,
            Placement::After => anchor_index + 1,
        };
        self.insert_sections(index, sections)
    }

    /// Removes the listed sections with all their items. Unknown ids are
    /// ignored.
    pub(crate) fn delete_sections(&mut self, ids: &[SectionId]) {
        let doomed: HashSet<SectionId> = ids.iter().copied().collect();
        let item_sections = &mut self.item_sections;
        self.sections.retain(|section| {
            if !doomed.contains(&section.id()) {
                return true;
            }
            for id in section.item_ids() {
                item_sections.remove(&id);
            }
            false
        });
    }

    /// Appends to `section`, or to the last section when `None`.
    pub(crate) fn append_items(
        &mut self,
        items: Vec<Item>,
        section: Option<SectionId>,
    ) -> Result<(), SnapshotError> {
        let section_index = match section {
            Some(id) => self
                .section_index(id)
                .ok_or(SnapshotError::NotExistingSection { section: id })?,
            None => self
                .sections
                .len()
                .checked_sub(1)
                .ok_or(SnapshotError::NoSections)?,
        };
        let position = self.sections[section_index].len();
        self.insert_items(section_index, position, items)
    }

    pub(crate) fn insert_items_next_to(
        &mut self,
        items: Vec<Item>,
        anchor: ItemId,
        placement: Placement,
    ) -> Result<(), SnapshotError> {
        let path = self
            .index_path(anchor)
            .ok_or(SnapshotError::NotExistingItem { item: anchor })?;
        let position = match placement {
            Placement::Before => path.item,
            Placement::After => path.item + 1,
        };
        self.insert_items(path.section, position, items)
    }

    /// Removes the listed items. Unknown ids are ignored; emptying a section
    /// is refused before anything is removed.
    pub(crate) fn delete_items(&mut self, ids: &[ItemId]) -> Result<(), SnapshotError> {
        let doomed: HashSet<ItemId> = ids
            .iter()
            .copied()
            .filter(|id| self.contains_item(*id))
            .collect();
        if doomed.is_empty() {
            return Ok(());
        }

        for section in &self.sections {
            if section.item_ids().all(|id| doomed.contains(&id)) {
                return Err(SnapshotError::EmptyItems {
                    section: Some(section.id()),
                });
            }
        }

        for section in &mut self.sections {
            section.items_mut().retain(|item| !doomed.contains(&item.id()));
        }
        for id in &doomed {
            self.item_sections.remove(id);
        }
        Ok(())
    }

    pub(crate) fn move_item(
        &mut self,
        item: ItemId,
        anchor: ItemId,
        placement: Placement,
    ) -> Result<(), SnapshotError> {
        let from = self
            .index_path(item)
            .ok_or(SnapshotError::NotExistingItem { item })?;
        let anchor_section = self
            .section_id_of_item(anchor)
            .ok_or(SnapshotError::NotExistingItem { item: anchor })?;
        if item == anchor {
            return Ok(());
        }
        let source = &self.sections[from.section];
        if source.len() == 1 && source.id() != anchor_section {
            return Err(SnapshotError::EmptyItems {
                section: Some(source.id()),
            });
        }

        let moved = self.sections[from.section].items_mut().remove(from.item);
        let to = self
            .index_path(anchor)
            .ok_or(SnapshotError::NotExistingItem { item: anchor })?;
        let position = match placement {
            Placement::Before => to.item,
            Placement::After => to.item + 1,
        };
        self.sections[to.section].items_mut().insert(position, moved);
        self.item_sections.insert(item, anchor_section);
        Ok(())
    }

    pub(crate) fn move_section(
        &mut self,
        section: SectionId,
        anchor: SectionId,
        placement: Placement,
    ) -> Result<(), SnapshotError> {
        let from = self
            .section_index(section)
            .ok_or(SnapshotError::NotExistingSection { section })?;
        if !self.contains_section(anchor) {
            return Err(SnapshotError::NotExistingSection { section: anchor });
        }
        if section == anchor {
            return Ok(());
        }

        let moved = self.sections.remove(from);
        let anchor_index = self
            .section_index(anchor)
            .ok_or(SnapshotError::NotExistingSection { section: anchor })?;
        let index = match placement {
            Placement::Before => anchor_index,
            Placement::After => anchor_index + 1,
        };
        self.sections.insert(index, moved);
        Ok(())
    }

    fn insert_items(
        &mut self,
        section_index: usize,
        position: usize,
        items: Vec<Item>,
    ) -> Result<(), SnapshotError> {
        self.check_new_items(&items)?;
        let section = &mut self.sections[section_index];
        let section_id = section.id();
        for item in &items {
            self.item_sections.insert(item.id(), section_id);
        }
        let position = position.min(section.len());
        section.items_mut().splice(position..position, items);
        Ok(())
    }

    fn insert_unchecked(&mut self, index: usize, sections: Vec<Section>) {
        for section in &sections {
            for id in section.item_ids() {
                self.item_sections.insert(id, section.id());
            }
        }
        let index = index.min(self.sections.len());
        self.sections.splice(index..index, sections);
    }

    /// Items must be absent from the snapshot and unique among themselves.
    fn check_new_items(&self, items: &[Item]) -> Result<(), SnapshotError> {
        let mut seen = HashSet::default();
        for item in items {
            if self.contains_item(item.id()) {
                return Err(SnapshotError::ExistingItem { item: item.id() });
            }
            if !seen.insert(item.id()) {
                return Err(SnapshotError::NotUniqueItems { item: item.id() });
            }
        }
        Ok(())
    }

    /// Sections and their items must be absent from the snapshot and unique
    /// among themselves.
    fn check_new_sections(&self, sections: &[Section]) -> Result<(), SnapshotError> {
        let mut seen_sections = HashSet::default();
        let mut owners: HashMap<ItemId, SectionId> = HashMap::default();
        for section in sections {
            if self.contains_section(section.id()) {
                return Err(SnapshotError::ExistingSection {
                    section: section.id(),
                });
            }
            if !seen_sections.insert(section.id()) {
                return Err(SnapshotError::NotUniqueSections {
                    section: section.id(),
                });
            }
            for item in section.items() {
                if self.contains_item(item.id()) {
                    return Err(SnapshotError::ExistingItem { item: item.id() });
                }
                match owners.insert(item.id(), section.id()) {
                    Some(owner) if owner == section.id() => {
                        return Err(SnapshotError::ExistingItemInSection {
                            item: item.id(),
                            section: owner,
                        })
                    }
                    Some(_) => return Err(SnapshotError::NotUniqueItems { item: item.id() }),
                    None => {}
                }
            }
        }
        Ok(())
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.sections == other.sections
    }
}

impl Eq for Snapshot {}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("sections", &self.sections)
            .finish()
    }
}
