//! Memoized entity sizes keyed by the context that produced them.
//!
//! Every item, supplementary item and decoration item owns one
//! [`ExtentCache`] with an independent map per [`Axis`]. A lookup with an
//! equal [`CalculationContext`] always answers from the cache, even when the
//! entity's content changed since: whoever mutates size-affecting state must
//! either fold that state into the context or invalidate the cache before the
//! next layout pass.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::collections::map::HashMap;
use crate::error::ExtentError;
use crate::hash;
use crate::identity::EntityRef;

/// Direction a size is measured along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::Width => Axis::Height,
            Axis::Height => Axis::Width,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Width => f.write_str("width"),
            Axis::Height => f.write_str("height"),
        }
    }
}

/// Digest of the host environment (size class, text scale, ...) a
/// measurement depends on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EnvironmentFingerprint(u64);

impl EnvironmentFingerprint {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Fingerprints any hashable description of the environment.
    pub fn of<T: Hash + ?Sized>(environment: &T) -> Self {
        Self(hash::digest(environment))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Conditions under which a cached size is valid.
///
/// The available dimension is compared by bit pattern so the context can be a
/// map key.
#[derive(Clone, Copy, Debug)]
pub struct CalculationContext {
    available_orthogonal_dimension: f32,
    environment: EnvironmentFingerprint,
}

impl CalculationContext {
    pub fn new(available_orthogonal_dimension: f32, environment: EnvironmentFingerprint) -> Self {
        Self {
            available_orthogonal_dimension,
            environment,
        }
    }

    pub fn available_orthogonal_dimension(&self) -> f32 {
        self.available_orthogonal_dimension
    }

    pub fn environment(&self) -> EnvironmentFingerprint {
        self.environment
    }
}

impl PartialEq for CalculationContext {
    fn eq(&self, other: &Self) -> bool {
        self.available_orthogonal_dimension.to_bits() == other.available_orthogonal_dimension.to_bits()
            && self.environment == other.environment
    }
}

impl Eq for CalculationContext {}

impl Hash for CalculationContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.available_orthogonal_dimension.to_bits().hash(state);
        self.environment.hash(state);
    }
}

/// Supplies the environment half of a [`CalculationContext`].
pub trait CalculationContextProvider {
    fn environment_fingerprint(&self) -> EnvironmentFingerprint;

    fn context_for(&self, available_orthogonal_dimension: f32) -> CalculationContext {
        CalculationContext::new(available_orthogonal_dimension, self.environment_fingerprint())
    }
}

/// Provider for hosts whose environment never changes.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedEnvironment(pub EnvironmentFingerprint);

impl CalculationContextProvider for FixedEnvironment {
    fn environment_fingerprint(&self) -> EnvironmentFingerprint {
        self.0
    }
}

impl<F> CalculationContextProvider for F
where
    F: Fn() -> EnvironmentFingerprint,
{
    fn environment_fingerprint(&self) -> EnvironmentFingerprint {
        self()
    }
}

/// Per-axis memo of measured sizes.
#[derive(Clone, Debug)]
pub struct ExtentCache<C = CalculationContext> {
    along_width: HashMap<C, f32>,
    along_height: HashMap<C, f32>,
}

impl<C> Default for ExtentCache<C> {
    fn default() -> Self {
        Self {
            along_width: HashMap::default(),
            along_height: HashMap::default(),
        }
    }
}

impl<C: Hash + Eq> ExtentCache<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, axis: Axis, context: &C) -> Option<f32> {
        self.map(axis).get(context).copied()
    }

    pub fn insert(&mut self, axis: Axis, context: C, extent: f32) {
        self.map_mut(axis).insert(context, extent);
    }

    /// Drops every entry measured along `axis`.
    pub fn invalidate(&mut self, axis: Axis) {
        self.map_mut(axis).clear();
    }

    pub fn invalidate_all(&mut self) {
        self.along_width.clear();
        self.along_height.clear();
    }

    pub fn len(&self, axis: Axis) -> usize {
        self.map(axis).len()
    }

    pub fn is_empty(&self) -> bool {
        self.along_width.is_empty() && self.along_height.is_empty()
    }

    fn map(&self, axis: Axis) -> &HashMap<C, f32> {
        match axis {
            Axis::Width => &self.along_width,
            Axis::Height => &self.along_height,
        }
    }

    fn map_mut(&mut self, axis: Axis) -> &mut HashMap<C, f32> {
        match axis {
            Axis::Width => &mut self.along_width,
            Axis::Height => &mut self.along_height,
        }
    }
}

/// Cache handle shared by every copy of one entity.
///
/// Snapshot working copies clone entities; the clones keep answering from
/// (and filling) the same memo.
#[derive(Clone, Default)]
pub(crate) struct SharedExtentCache {
    inner: Rc<RefCell<ExtentCache>>,
}

impl SharedExtentCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the cached extent or measures, validates and stores a new one.
    pub(crate) fn compute(
        &self,
        entity: EntityRef,
        context: &CalculationContext,
        axis: Axis,
        measure: impl FnOnce() -> f32,
    ) -> Result<f32, ExtentError> {
        if let Some(extent) = self.inner.borrow().get(axis, context) {
            log::trace!("{entity}: cached {axis} {extent}");
            return Ok(extent);
        }

        let value = measure();
        if !is_valid_extent(value) {
            return Err(ExtentError::DegenerateExtent {
                value,
                entity,
                context: *context,
                axis,
            });
        }
        log::trace!("{entity}: measured {axis} {value}");
        self.inner.borrow_mut().insert(axis, *context, value);
        Ok(value)
    }

    pub(crate) fn invalidate(&self, axis: Axis) {
        self.inner.borrow_mut().invalidate(axis);
    }

    pub(crate) fn invalidate_all(&self) {
        self.inner.borrow_mut().invalidate_all();
    }

    pub(crate) fn cached(&self, axis: Axis, context: &CalculationContext) -> Option<f32> {
        self.inner.borrow().get(axis, context)
    }
}

/// Zero or a normal, positive float.
pub fn is_valid_extent(value: f32) -> bool {
    value == 0.0 || (value.is_normal() && value > 0.0)
}
