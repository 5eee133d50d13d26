//! Type-erased content carried by items and boundary items.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::hash;
use crate::layout_cache::{Axis, CalculationContext};

/// Measures a throwaway rendition of an entity.
///
/// Called only on cache misses; the result is validated and memoized by the
/// owning entity's extent cache.
pub trait Sizable {
    fn measure(&self, context: &CalculationContext, axis: Axis) -> f32;
}

/// Content a renderer can draw and the engine can diff.
///
/// Anything hashable and sizable is content; its hash becomes the
/// [`ContentKey`] used for change detection.
pub trait ItemContent: Sizable + 'static {
    fn content_key(&self) -> ContentKey;
}

impl<T> ItemContent for T
where
    T: Sizable + Hash + 'static,
{
    fn content_key(&self) -> ContentKey {
        ContentKey::of(self)
    }
}

/// Digest of an entity's content. Equal content yields equal keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentKey(u64);

impl ContentKey {
    pub fn of<T: Hash + ?Sized>(value: &T) -> Self {
        Self(hash::digest(value))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// The kind of visual an entity needs. Renderers register reusable
/// resources once per kind.
#[derive(Clone, Copy)]
pub struct EntityKind {
    type_id: TypeId,
    name: &'static str,
}

impl EntityKind {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EntityKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EntityKind {}

impl Hash for EntityKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKind({})", self.name)
    }
}

/// Shared, type-erased handle to one piece of content.
///
/// Keeps the concrete value reachable for renderers (via downcast) and for
/// measurement, alongside the precomputed key used for diffing.
#[derive(Clone)]
pub(crate) struct ErasedContent {
    kind: EntityKind,
    key: ContentKey,
    value: Rc<dyn Any>,
    sizing: Rc<dyn Sizable>,
}

impl ErasedContent {
    pub(crate) fn new<C: ItemContent>(content: C) -> Self {
        let key = content.content_key();
        let value = Rc::new(content);
        Self {
            kind: EntityKind::of::<C>(),
            key,
            value: Rc::clone(&value) as Rc<dyn Any>,
            sizing: value,
        }
    }

    pub(crate) fn kind(&self) -> EntityKind {
        self.kind
    }

    pub(crate) fn key(&self) -> ContentKey {
        self.key
    }

    pub(crate) fn downcast<C: 'static>(&self) -> Option<&C> {
        self.value.downcast_ref::<C>()
    }

    pub(crate) fn measure(&self, context: &CalculationContext, axis: Axis) -> f32 {
        self.sizing.measure(context, axis)
    }

    /// Kind and key equality; the handle itself never takes part.
    pub(crate) fn same_content(&self, other: &Self) -> bool {
        self.kind == other.kind && self.key == other.key
    }

    pub(crate) fn hash_content<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.key.hash(state);
    }
}
