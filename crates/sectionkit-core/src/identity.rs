//! Stable identifiers for sections, items and their boundary content.
//!
//! Every identifier wraps a random 128-bit UUID, so ids minted anywhere in the
//! process never collide. Applications that already own stable keys can mint
//! deterministic ids with `from_u128`.

use std::borrow::Cow;
use std::fmt;

use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Uuid);

        impl $name {
            /// Mints a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps a caller-provided 128-bit value.
            pub const fn from_u128(value: u128) -> Self {
                Self(Uuid::from_u128(value))
            }

            pub fn as_u128(&self) -> u128 {
                self.0.as_u128()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({:x})"), self.0.as_u128())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " {}"), self.0.hyphenated())
            }
        }
    };
}

entity_id!(
    /// Identity of a [`Section`](crate::Section).
    SectionId,
    "section"
);
entity_id!(
    /// Identity of an [`Item`](crate::Item). Unique across a whole snapshot.
    ItemId,
    "item"
);
entity_id!(
    /// Identity of a [`SupplementaryItem`](crate::SupplementaryItem).
    SupplementaryId,
    "supplementary"
);
entity_id!(
    /// Identity of a [`DecorationItem`](crate::DecorationItem).
    DecorationId,
    "decoration"
);

/// Role of a supplementary or decoration item inside its section
/// (header, footer, background, ...).
///
/// Kinds must stay stable for the lifetime of the renderer that draws them:
/// renderers prepare reusable resources per kind.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKind(Cow<'static, str>);

impl ElementKind {
    pub const HEADER: ElementKind = ElementKind(Cow::Borrowed("header"));
    pub const FOOTER: ElementKind = ElementKind(Cow::Borrowed("footer"));
    pub const BACKGROUND: ElementKind = ElementKind(Cow::Borrowed("background"));

    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ElementKind {
    fn from(kind: &'static str) -> Self {
        Self(Cow::Borrowed(kind))
    }
}

impl From<String> for ElementKind {
    fn from(kind: String) -> Self {
        Self(Cow::Owned(kind))
    }
}

impl fmt::Debug for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementKind({:?})", self.as_str())
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any identity-bearing entity, used to point at the culprit in errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Section(SectionId),
    Item(ItemId),
    Supplementary(SupplementaryId),
    Decoration(DecorationId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Section(id) => write!(f, "{id}"),
            EntityRef::Item(id) => write!(f, "{id}"),
            EntityRef::Supplementary(id) => write!(f, "{id}"),
            EntityRef::Decoration(id) => write!(f, "{id}"),
        }
    }
}
