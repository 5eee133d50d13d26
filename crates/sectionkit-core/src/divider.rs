//! Policies deciding which items show a trailing separator.

use crate::capabilities::Capabilities;
use crate::section::Section;

/// One section's items as seen by a [`DividerStrategy`]: readable in full,
/// writable only through divider visibility.
pub struct SectionDividers<'a> {
    section: &'a mut Section,
}

impl<'a> SectionDividers<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    pub fn section(&self) -> &Section {
        self.section
    }

    pub fn len(&self) -> usize {
        self.section.len()
    }

    pub fn is_empty(&self) -> bool {
        self.section.is_empty()
    }

    /// Shows or hides the divider of the item at `index`. Out-of-range
    /// indices and items without a divider model are left alone.
    pub fn set_hidden(&mut self, index: usize, hidden: bool) -> bool {
        self.section
            .items_mut()
            .get_mut(index)
            .is_some_and(|item| item.capabilities_mut().set_divider_hidden(hidden))
    }

    /// Read access to every item's capabilities, in order.
    pub fn capabilities(&self) -> impl Iterator<Item = &Capabilities> + '_ {
        self.section.items().iter().map(|item| item.capabilities())
    }
}

/// Runs on every working copy before it is committed, so divider visibility
/// is part of the committed snapshot and of item equality.
///
/// Called once per section. Only items that opted into a
/// [`DividerModel`](crate::DividerModel) are touched.
pub trait DividerStrategy {
    fn separate_items(&self, dividers: &mut SectionDividers<'_>);
}

pub(crate) fn separate_sections(strategy: &dyn DividerStrategy, sections: &mut [Section]) {
    for section in sections {
        strategy.separate_items(&mut SectionDividers::new(section));
    }
}

/// Every divider visible except the one after the last item of a section.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDividerStrategy;

impl DividerStrategy for DefaultDividerStrategy {
    fn separate_items(&self, dividers: &mut SectionDividers<'_>) {
        let last = dividers.len().saturating_sub(1);
        for index in 0..dividers.len() {
            dividers.set_hidden(index, index == last);
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoDividersStrategy;

impl DividerStrategy for NoDividersStrategy {
    fn separate_items(&self, dividers: &mut SectionDividers<'_>) {
        for index in 0..dividers.len() {
            dividers.set_hidden(index, true);
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AllDividersStrategy;

impl DividerStrategy for AllDividersStrategy {
    fn separate_items(&self, dividers: &mut SectionDividers<'_>) {
        for index in 0..dividers.len() {
            dividers.set_hidden(index, false);
        }
    }
}
