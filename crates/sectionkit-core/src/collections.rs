//! Map and set aliases used throughout the engine.
//!
//! Lookups keyed by entity ids go through [`map`]. Element-kind tables and
//! change marks need a stable iteration order and go through [`ordered`].

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
}

#[cfg(feature = "std-hash")]
pub mod ordered {
    pub type OrderedMap<K, V> = indexmap::IndexMap<K, V>;
    pub type OrderedSet<T> = indexmap::IndexSet<T>;
}

#[cfg(not(feature = "std-hash"))]
pub mod ordered {
    use std::hash::BuildHasherDefault;

    use rustc_hash::FxHasher;

    pub type OrderedMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;
    pub type OrderedSet<T> = indexmap::IndexSet<T, BuildHasherDefault<FxHasher>>;
}
