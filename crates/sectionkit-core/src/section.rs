//! Sections: ordered, never-empty runs of items plus keyed boundary content.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::collections::ordered::OrderedMap;
use crate::error::{ExtentError, SnapshotError};
use crate::identity::{ElementKind, EntityRef, ItemId, SectionId};
use crate::item::{DecorationItem, Item, SupplementaryItem};
use crate::layout_cache::{is_valid_extent, Axis, CalculationContext};

/// Padding around a section's items.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeInsets {
    pub top: f32,
    pub leading: f32,
    pub bottom: f32,
    pub trailing: f32,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets {
        top: 0.0,
        leading: 0.0,
        bottom: 0.0,
        trailing: 0.0,
    };

    pub fn uniform(inset: f32) -> Self {
        Self {
            top: inset,
            leading: inset,
            bottom: inset,
            trailing: inset,
        }
    }

    /// Total inset consumed along `axis`.
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Width => self.leading + self.trailing,
            Axis::Height => self.top + self.bottom,
        }
    }

    fn bits(&self) -> [u32; 4] {
        [
            self.top.to_bits(),
            self.leading.to_bits(),
            self.bottom.to_bits(),
            self.trailing.to_bits(),
        ]
    }
}

impl PartialEq for EdgeInsets {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for EdgeInsets {}

impl Hash for EdgeInsets {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

/// A non-empty, ordered collection of items with supplementary and
/// decoration items keyed by element kind.
///
/// Supplementary and decoration kinds share one namespace: a kind may appear
/// at most once across both maps.
#[derive(Clone)]
pub struct Section {
    id: SectionId,
    items: Vec<Item>,
    supplementary_items: OrderedMap<ElementKind, SupplementaryItem>,
    decoration_items: OrderedMap<ElementKind, DecorationItem>,
    content_insets: EdgeInsets,
}

impl Section {
    pub fn new(items: Vec<Item>) -> Result<Self, SnapshotError> {
        Self::with_id(SectionId::new(), items)
    }

    pub fn with_id(id: SectionId, items: Vec<Item>) -> Result<Self, SnapshotError> {
        if items.is_empty() {
            return Err(SnapshotError::EmptyItems { section: None });
        }
        Ok(Self {
            id,
            items,
            supplementary_items: OrderedMap::default(),
            decoration_items: OrderedMap::default(),
            content_insets: EdgeInsets::ZERO,
        })
    }

    /// Builds a section with all of its boundary content at once.
    pub fn with_boundary_items(
        id: SectionId,
        items: Vec<Item>,
        supplementary_items: Vec<SupplementaryItem>,
        decoration_items: Vec<DecorationItem>,
    ) -> Result<Self, SnapshotError> {
        let mut section = Self::with_id(id, items)?;
        for item in supplementary_items {
            section.insert_supplementary_item(item)?;
        }
        for item in decoration_items {
            section.insert_decoration_item(item)?;
        }
        Ok(section)
    }

    pub fn with_supplementary_item(mut self, item: SupplementaryItem) -> Result<Self, SnapshotError> {
        self.insert_supplementary_item(item)?;
        Ok(self)
    }

    pub fn with_decoration_item(mut self, item: DecorationItem) -> Result<Self, SnapshotError> {
        self.insert_decoration_item(item)?;
        Ok(self)
    }

    pub fn with_content_insets(mut self, insets: EdgeInsets) -> Self {
        self.content_insets = insets;
        self
    }

    pub fn insert_supplementary_item(&mut self, item: SupplementaryItem) -> Result<(), SnapshotError> {
        self.ensure_kind_is_free(item.element_kind())?;
        self.supplementary_items
            .insert(item.element_kind().clone(), item);
        Ok(())
    }

    pub fn insert_decoration_item(&mut self, item: DecorationItem) -> Result<(), SnapshotError> {
        self.ensure_kind_is_free(item.element_kind())?;
        self.decoration_items.insert(item.element_kind().clone(), item);
        Ok(())
    }

    pub fn remove_supplementary_item(&mut self, kind: &ElementKind) -> Option<SupplementaryItem> {
        self.supplementary_items.shift_remove(kind)
    }

    pub fn remove_decoration_item(&mut self, kind: &ElementKind) -> Option<DecorationItem> {
        self.decoration_items.shift_remove(kind)
    }

    fn ensure_kind_is_free(&self, kind: &ElementKind) -> Result<(), SnapshotError> {
        if self.supplementary_items.contains_key(kind) || self.decoration_items.contains_key(kind) {
            return Err(SnapshotError::DuplicateElementKind { kind: kind.clone() });
        }
        Ok(())
    }

    /// Replaces every item at once. No identity checks run against the old
    /// items: this is a local replace, not a diff.
    pub fn set_items(&mut self, items: Vec<Item>) -> Result<(), SnapshotError> {
        if items.is_empty() {
            return Err(SnapshotError::EmptyItems {
                section: Some(self.id),
            });
        }
        self.items = items;
        Ok(())
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(Item::id)
    }

    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false` for a constructed section.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn supplementary_item(&self, kind: &ElementKind) -> Option<&SupplementaryItem> {
        self.supplementary_items.get(kind)
    }

    pub fn supplementary_items(&self) -> impl Iterator<Item = &SupplementaryItem> {
        self.supplementary_items.values()
    }

    pub fn decoration_item(&self, kind: &ElementKind) -> Option<&DecorationItem> {
        self.decoration_items.get(kind)
    }

    pub fn decoration_items(&self) -> impl Iterator<Item = &DecorationItem> {
        self.decoration_items.values()
    }

    pub fn content_insets(&self) -> EdgeInsets {
        self.content_insets
    }

    /// Sum of every item's extent along `axis` plus the insets on that axis.
    pub fn compute_content_extent(
        &self,
        context: &CalculationContext,
        axis: Axis,
    ) -> Result<f32, ExtentError> {
        let mut total = self.content_insets.along(axis);
        for item in &self.items {
            total += item.compute_extent(context, axis)?;
        }
        if !is_valid_extent(total) {
            return Err(ExtentError::DegenerateExtent {
                value: total,
                entity: EntityRef::Section(self.id),
                context: *context,
                axis,
            });
        }
        Ok(total)
    }

    /// Drops every memoized extent of the items and the boundary content.
    pub fn clear_cached_extents(&self) {
        for item in &self.items {
            item.invalidate_extents();
        }
        for item in self.supplementary_items.values() {
            item.invalidate_extents();
        }
        for item in self.decoration_items.values() {
            item.invalidate_extents();
        }
    }

    /// Compares everything except the item list.
    pub fn boundary_content_eq(&self, other: &Section) -> bool {
        self.id == other.id
            && self.content_insets == other.content_insets
            && self.supplementary_items == other.supplementary_items
            && self.decoration_items == other.decoration_items
    }

    pub(crate) fn items_mut(&mut self) -> &mut Vec<Item> {
        &mut self.items
    }
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.boundary_content_eq(other) && self.items == other.items
    }
}

impl Eq for Section {}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("id", &self.id)
            .field("items", &self.items)
            .field("supplementary_items", &self.supplementary_items.values().collect::<Vec<_>>())
            .field("decoration_items", &self.decoration_items.values().collect::<Vec<_>>())
            .field("content_insets", &self.content_insets)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Sizable;
    use crate::layout_cache::EnvironmentFingerprint;

    #[derive(Hash)]
    struct Row(u32);

    impl Sizable for Row {
        fn measure(&self, _context: &CalculationContext, axis: Axis) -> f32 {
            match axis {
                Axis::Width => 320.0,
                Axis::Height => self.0 as f32,
            }
        }
    }

    #[derive(Hash)]
    struct Broken;

    impl Sizable for Broken {
        fn measure(&self, _context: &CalculationContext, _axis: Axis) -> f32 {
            f32::NAN
        }
    }

    fn ctx() -> CalculationContext {
        CalculationContext::new(320.0, EnvironmentFingerprint::of("compact"))
    }

    #[test]
    fn empty_sections_cannot_be_built() {
        assert_eq!(
            Section::new(Vec::new()).unwrap_err(),
            SnapshotError::EmptyItems { section: None }
        );
    }

    #[test]
    fn set_items_rejects_empty_and_keeps_old_items() {
        let mut section = Section::new(vec![Item::new(Row(44))]).unwrap();
        let before = section.clone();

        let err = section.set_items(Vec::new()).unwrap_err();

        assert_eq!(err, SnapshotError::EmptyItems { section: Some(section.id()) });
        assert_eq!(section, before);

        section.set_items(vec![Item::new(Row(10)), Item::new(Row(20))]).unwrap();
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn element_kinds_are_unique_across_both_maps() {
        let section = Section::new(vec![Item::new(Row(44))])
            .unwrap()
            .with_supplementary_item(SupplementaryItem::new(ElementKind::HEADER, Row(30)))
            .unwrap();

        let duplicate = section
            .clone()
            .with_supplementary_item(SupplementaryItem::new(ElementKind::HEADER, Row(31)));
        assert_eq!(
            duplicate.unwrap_err(),
            SnapshotError::DuplicateElementKind { kind: ElementKind::HEADER }
        );

        let across = section
            .clone()
            .with_decoration_item(DecorationItem::new(ElementKind::HEADER, Row(1)));
        assert_eq!(
            across.unwrap_err(),
            SnapshotError::DuplicateElementKind { kind: ElementKind::HEADER }
        );

        let built = Section::with_boundary_items(
            SectionId::new(),
            vec![Item::new(Row(1))],
            vec![SupplementaryItem::new("footer", Row(2))],
            vec![DecorationItem::new("footer", Row(3))],
        );
        assert!(matches!(built, Err(SnapshotError::DuplicateElementKind { .. })));
    }

    #[test]
    fn content_extent_sums_items_and_insets() {
        let section = Section::new(vec![Item::new(Row(44)), Item::new(Row(56))])
            .unwrap()
            .with_content_insets(EdgeInsets {
                top: 8.0,
                bottom: 12.0,
                ..EdgeInsets::ZERO
            });

        assert_eq!(section.compute_content_extent(&ctx(), Axis::Height), Ok(120.0));
    }

    #[test]
    fn degenerate_item_extent_fails_the_section() {
        let section = Section::new(vec![Item::new(Row(44)), Item::new(Broken)]).unwrap();
        let err = section.compute_content_extent(&ctx(), Axis::Height).unwrap_err();
        let ExtentError::DegenerateExtent { entity, .. } = err;
        assert_eq!(entity, EntityRef::Item(section.items()[1].id()));
    }

    #[test]
    fn clear_cached_extents_reaches_boundary_items() {
        let section = Section::new(vec![Item::new(Row(44))])
            .unwrap()
            .with_supplementary_item(SupplementaryItem::new(ElementKind::HEADER, Row(30)))
            .unwrap();
        section.compute_content_extent(&ctx(), Axis::Height).unwrap();
        let header = section.supplementary_item(&ElementKind::HEADER).unwrap();
        header.compute_extent(&ctx(), Axis::Height).unwrap();

        section.clear_cached_extents();

        assert_eq!(section.items()[0].cached_extent(&ctx(), Axis::Height), None);
        assert_eq!(header.cached_extent(&ctx(), Axis::Height), None);
    }
}
