//! Assertion helpers over committed snapshots.
//!
//! Ids are compared through their `as_u128` value so failures print the
//! small numbers the fixtures were built from.

use sectionkit_core::{Snapshot, SnapshotError};

/// Assert that `section` holds exactly `expected`, in order.
pub fn assert_item_order(snapshot: &Snapshot, section: u128, expected: &[u128]) {
    let id = crate::section_id(section);
    let actual: Vec<u128> = match snapshot.section(id) {
        Some(section) => section.item_ids().map(|id| id.as_u128()).collect(),
        None => panic!("section {section} is not in the snapshot: {snapshot:?}"),
    };
    assert_eq!(actual, expected, "item order of section {section}");
}

/// Assert the section order of the whole snapshot.
pub fn assert_section_order(snapshot: &Snapshot, expected: &[u128]) {
    let actual: Vec<u128> = snapshot.section_ids().map(|id| id.as_u128()).collect();
    assert_eq!(actual, expected, "section order");
}

/// Assert uniqueness of every id and that no section is empty.
pub fn assert_snapshot_invariants(snapshot: &Snapshot) {
    if let Err(err) = snapshot.validate() {
        panic!("snapshot violates its invariants: {err}");
    }
    assert_eq!(
        snapshot.items().count(),
        snapshot.number_of_items(),
        "item index out of sync with sections"
    );
    let empty: Option<SnapshotError> = snapshot
        .sections()
        .iter()
        .find(|section| section.is_empty())
        .map(|section| SnapshotError::EmptyItems {
            section: Some(section.id()),
        });
    assert_eq!(empty, None);
    for section in snapshot.sections() {
        for id in section.item_ids() {
            assert_eq!(
                snapshot.item(id).map(|item| item.id()),
                Some(id),
                "item {id:?} is in a section but cannot be looked up"
            );
        }
    }
}
