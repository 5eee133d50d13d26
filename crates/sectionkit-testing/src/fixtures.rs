//! Deterministic ids and small builders.

use sectionkit_core::{Axis, CalculationContext, Item, ItemId, Section, SectionId, Sizable};

pub fn item_id(n: u128) -> ItemId {
    ItemId::from_u128(n)
}

pub fn section_id(n: u128) -> SectionId {
    SectionId::from_u128(n)
}

/// Fixed-height row keyed by a number.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Row(pub u128);

impl Sizable for Row {
    fn measure(&self, context: &CalculationContext, axis: Axis) -> f32 {
        match axis {
            Axis::Height => 44.0,
            Axis::Width => context.available_orthogonal_dimension(),
        }
    }
}

/// Row item whose id and content are both derived from `n`.
pub fn item(n: u128) -> Item {
    Item::with_id(item_id(n), Row(n))
}

/// Section `n` holding rows `items`.
///
/// # Panics
///
/// Panics when `items` is empty.
pub fn section(n: u128, items: &[u128]) -> Section {
    match Section::with_id(section_id(n), items.iter().copied().map(item).collect()) {
        Ok(section) => section,
        Err(err) => panic!("fixture section {n}: {err}"),
    }
}
