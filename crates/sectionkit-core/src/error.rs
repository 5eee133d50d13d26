use std::fmt;

use crate::identity::{ElementKind, EntityRef, ItemId, SectionId};
use crate::layout_cache::{Axis, CalculationContext};

/// Structural and existence violations raised while building sections or
/// validating a transaction.
///
/// A returned error always means nothing was mutated: construction failed
/// or the whole transaction was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// A section would be left without items. `section` is `None` when the
    /// section was still being constructed.
    EmptyItems { section: Option<SectionId> },
    DuplicateElementKind { kind: ElementKind },
    NotUniqueItems { item: ItemId },
    NotUniqueSections { section: SectionId },
    NotExistingItem { item: ItemId },
    NotExistingSection { section: SectionId },
    ExistingItem { item: ItemId },
    ExistingSection { section: SectionId },
    ExistingItemInSection { item: ItemId, section: SectionId },
    /// Items were appended without a target section to an empty snapshot.
    NoSections,
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::EmptyItems { section: Some(section) } => {
                write!(f, "{section} would be left without items")
            }
            SnapshotError::EmptyItems { section: None } => {
                write!(f, "a section needs at least one item")
            }
            SnapshotError::DuplicateElementKind { kind } => {
                write!(f, "element kind `{kind}` is used more than once in one section")
            }
            SnapshotError::NotUniqueItems { item } => write!(f, "{item} appears more than once"),
            SnapshotError::NotUniqueSections { section } => {
                write!(f, "{section} appears more than once")
            }
            SnapshotError::NotExistingItem { item } => write!(f, "{item} does not exist"),
            SnapshotError::NotExistingSection { section } => {
                write!(f, "{section} does not exist")
            }
            SnapshotError::ExistingItem { item } => write!(f, "{item} already exists"),
            SnapshotError::ExistingSection { section } => write!(f, "{section} already exists"),
            SnapshotError::ExistingItemInSection { item, section } => {
                write!(f, "{item} already exists in {section}")
            }
            SnapshotError::NoSections => write!(f, "cannot append items: there are no sections"),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// A measurement that produced a physically impossible size.
///
/// This points at a content or renderer defect; retrying yields the same value.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtentError {
    DegenerateExtent {
        value: f32,
        entity: EntityRef,
        context: CalculationContext,
        axis: Axis,
    },
}

impl fmt::Display for ExtentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtentError::DegenerateExtent {
                value,
                entity,
                context,
                axis,
            } => write!(
                f,
                "{entity} measured a degenerate {axis} of {value} (available {}, environment {:#x})",
                context.available_orthogonal_dimension(),
                context.environment().raw()
            ),
        }
    }
}

impl std::error::Error for ExtentError {}
