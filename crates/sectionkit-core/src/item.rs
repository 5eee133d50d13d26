//! Items and the supplementary/decoration content anchored to sections.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::capabilities::{Capabilities, DividerModel, ImageProviderKey};
use crate::content::{ContentKey, EntityKind, ErasedContent, ItemContent};
use crate::error::ExtentError;
use crate::identity::{DecorationId, ElementKind, EntityRef, ItemId, SupplementaryId};
use crate::layout_cache::{Axis, CalculationContext, SharedExtentCache};

/// One renderable unit of a section.
///
/// Identity is the [`ItemId`] and never changes. Equality additionally
/// compares the content key, the content kind and every capability, so two
/// items are equal only when nothing the renderer can observe differs.
///
/// Clones share the extent cache; an item built from scratch starts with an
/// empty cache even when it reuses an existing id.
#[derive(Clone)]
pub struct Item {
    id: ItemId,
    content: ErasedContent,
    capabilities: Capabilities,
    extents: SharedExtentCache,
}

impl Item {
    pub fn new<C: ItemContent>(content: C) -> Self {
        Self::with_id(ItemId::new(), content)
    }

    pub fn with_id<C: ItemContent>(id: ItemId, content: C) -> Self {
        Self {
            id,
            content: ErasedContent::new(content),
            capabilities: Capabilities::default(),
            extents: SharedExtentCache::new(),
        }
    }

    pub fn tappable(mut self, tappable: bool) -> Self {
        self.capabilities.tappable = tappable;
        self
    }

    pub fn shimmering(mut self, shimmering: bool) -> Self {
        self.capabilities.shimmering = shimmering;
        self
    }

    pub fn with_divider(mut self, divider: DividerModel) -> Self {
        self.capabilities.divider = Some(divider);
        self
    }

    pub fn with_image_provider(mut self, provider: ImageProviderKey) -> Self {
        self.capabilities.image_providers.push(provider);
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.content.kind()
    }

    pub fn content_key(&self) -> ContentKey {
        self.content.key()
    }

    /// Borrows the concrete content if it is a `C`.
    pub fn content<C: 'static>(&self) -> Option<&C> {
        self.content.downcast()
    }

    /// Swaps the content in place, keeping the identity.
    ///
    /// Cached extents are left alone; call [`Item::invalidate_extents`] when
    /// the new content measures differently.
    pub fn set_content<C: ItemContent>(&mut self, content: C) {
        self.content = ErasedContent::new(content);
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.capabilities
    }

    pub fn compute_extent(
        &self,
        context: &CalculationContext,
        axis: Axis,
    ) -> Result<f32, ExtentError> {
        self.extents
            .compute(EntityRef::Item(self.id), context, axis, || {
                self.content.measure(context, axis)
            })
    }

    pub fn cached_extent(&self, context: &CalculationContext, axis: Axis) -> Option<f32> {
        self.extents.cached(axis, context)
    }

    pub fn invalidate_extent(&self, axis: Axis) {
        self.extents.invalidate(axis);
    }

    pub fn invalidate_extents(&self) {
        self.extents.invalidate_all();
    }

    /// Same identity; content may differ.
    pub fn is_identical(&self, other: &Item) -> bool {
        self.id == other.id
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.content.same_content(&other.content)
            && self.capabilities == other.capabilities
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.content.hash_content(state);
        self.capabilities.hash(state);
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("kind", &self.content.kind())
            .field("content_key", &self.content.key())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Where an anchored item sits relative to its section's items.
pub trait AnchorRole: 'static {
    type Id: Copy + Eq + Hash + fmt::Debug;

    const NAME: &'static str;

    fn new_id() -> Self::Id;

    fn entity(id: Self::Id) -> EntityRef;
}

/// Headers, footers and other views laid out alongside the items.
#[derive(Debug)]
pub enum Supplementary {}

/// Backgrounds and other views drawn behind a section.
#[derive(Debug)]
pub enum Decoration {}

impl AnchorRole for Supplementary {
    type Id = SupplementaryId;

    const NAME: &'static str = "SupplementaryItem";

    fn new_id() -> SupplementaryId {
        SupplementaryId::new()
    }

    fn entity(id: SupplementaryId) -> EntityRef {
        EntityRef::Supplementary(id)
    }
}

impl AnchorRole for Decoration {
    type Id = DecorationId;

    const NAME: &'static str = "DecorationItem";

    fn new_id() -> DecorationId {
        DecorationId::new()
    }

    fn entity(id: DecorationId) -> EntityRef {
        EntityRef::Decoration(id)
    }
}

/// Content anchored to a section by an [`ElementKind`].
pub struct AnchoredItem<R: AnchorRole> {
    id: R::Id,
    element_kind: ElementKind,
    content: ErasedContent,
    extents: SharedExtentCache,
    _role: PhantomData<R>,
}

pub type SupplementaryItem = AnchoredItem<Supplementary>;
pub type DecorationItem = AnchoredItem<Decoration>;

impl<R: AnchorRole> AnchoredItem<R> {
    pub fn new<C: ItemContent>(element_kind: impl Into<ElementKind>, content: C) -> Self {
        Self::with_id(R::new_id(), element_kind, content)
    }

    pub fn with_id<C: ItemContent>(
        id: R::Id,
        element_kind: impl Into<ElementKind>,
        content: C,
    ) -> Self {
        Self {
            id,
            element_kind: element_kind.into(),
            content: ErasedContent::new(content),
            extents: SharedExtentCache::new(),
            _role: PhantomData,
        }
    }

    pub fn id(&self) -> R::Id {
        self.id
    }

    pub fn element_kind(&self) -> &ElementKind {
        &self.element_kind
    }

    pub fn kind(&self) -> EntityKind {
        self.content.kind()
    }

    pub fn content_key(&self) -> ContentKey {
        self.content.key()
    }

    pub fn content<C: 'static>(&self) -> Option<&C> {
        self.content.downcast()
    }

    pub fn set_content<C: ItemContent>(&mut self, content: C) {
        self.content = ErasedContent::new(content);
    }

    pub fn compute_extent(
        &self,
        context: &CalculationContext,
        axis: Axis,
    ) -> Result<f32, ExtentError> {
        self.extents.compute(R::entity(self.id), context, axis, || {
            self.content.measure(context, axis)
        })
    }

    pub fn cached_extent(&self, context: &CalculationContext, axis: Axis) -> Option<f32> {
        self.extents.cached(axis, context)
    }

    pub fn invalidate_extent(&self, axis: Axis) {
        self.extents.invalidate(axis);
    }

    pub fn invalidate_extents(&self) {
        self.extents.invalidate_all();
    }
}

impl<R: AnchorRole> Clone for AnchoredItem<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            element_kind: self.element_kind.clone(),
            content: self.content.clone(),
            extents: self.extents.clone(),
            _role: PhantomData,
        }
    }
}

impl<R: AnchorRole> PartialEq for AnchoredItem<R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.element_kind == other.element_kind
            && self.content.same_content(&other.content)
    }
}

impl<R: AnchorRole> Eq for AnchoredItem<R> {}

impl<R: AnchorRole> Hash for AnchoredItem<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.element_kind.hash(state);
        self.content.hash_content(state);
    }
}

impl<R: AnchorRole> fmt::Debug for AnchoredItem<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(R::NAME)
            .field("id", &self.id)
            .field("element_kind", &self.element_kind)
            .field("kind", &self.content.kind())
            .field("content_key", &self.content.key())
            .finish()
    }
}
