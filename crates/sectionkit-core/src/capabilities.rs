//! Opt-in observable state attached to items.
//!
//! Everything in here takes part in item equality and hashing: toggling a
//! capability is a content change the renderer gets to see.

use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::hash;

/// Trailing separator drawn after an item.
#[derive(Clone, Copy, Debug, Default)]
pub struct DividerModel {
    pub is_hidden: bool,
    pub leading_inset: f32,
    pub trailing_inset: f32,
}

impl DividerModel {
    pub fn inset(leading_inset: f32, trailing_inset: f32) -> Self {
        Self {
            is_hidden: false,
            leading_inset,
            trailing_inset,
        }
    }
}

impl PartialEq for DividerModel {
    fn eq(&self, other: &Self) -> bool {
        self.is_hidden == other.is_hidden
            && self.leading_inset.to_bits() == other.leading_inset.to_bits()
            && self.trailing_inset.to_bits() == other.trailing_inset.to_bits()
    }
}

impl Eq for DividerModel {}

impl Hash for DividerModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.is_hidden.hash(state);
        self.leading_inset.to_bits().hash(state);
        self.trailing_inset.to_bits().hash(state);
    }
}

/// Identifies an image source an item holds on to. The renderer owns the
/// actual fetching and cancels it when the item leaves the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageProviderKey(u64);

impl ImageProviderKey {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Keys an image source by any hashable locator (URL, asset name, ...).
    pub fn of<T: Hash + ?Sized>(locator: &T) -> Self {
        Self(hash::digest(locator))
    }
}

/// Most items hold at most a thumbnail and an avatar.
pub type ImageProviders = SmallVec<[ImageProviderKey; 2]>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    pub tappable: bool,
    pub shimmering: bool,
    pub divider: Option<DividerModel>,
    pub image_providers: ImageProviders,
}

impl Capabilities {
    pub fn has_visible_divider(&self) -> bool {
        self.divider.is_some_and(|divider| !divider.is_hidden)
    }

    /// Shows or hides the divider. Items without a divider model stay as they
    /// are; returns whether anything changed.
    pub fn set_divider_hidden(&mut self, hidden: bool) -> bool {
        match self.divider.as_mut() {
            Some(divider) if divider.is_hidden != hidden => {
                divider.is_hidden = hidden;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divider_toggle_ignores_items_without_a_divider() {
        let mut plain = Capabilities::default();
        assert!(!plain.set_divider_hidden(true));
        assert_eq!(plain.divider, None);

        let mut divided = Capabilities {
            divider: Some(DividerModel::inset(16.0, 0.0)),
            ..Capabilities::default()
        };
        assert!(divided.has_visible_divider());
        assert!(divided.set_divider_hidden(true));
        assert!(!divided.set_divider_hidden(true));
        assert!(!divided.has_visible_divider());
    }

    #[test]
    fn capability_state_changes_equality() {
        let base = Capabilities::default();
        let tappable = Capabilities {
            tappable: true,
            ..Capabilities::default()
        };
        let with_image = Capabilities {
            image_providers: ImageProviders::from_slice(&[ImageProviderKey::of("https://a/b.png")]),
            ..Capabilities::default()
        };

        assert_ne!(base, tappable);
        assert_ne!(base, with_image);
        assert_eq!(with_image.clone(), with_image);
    }
}
