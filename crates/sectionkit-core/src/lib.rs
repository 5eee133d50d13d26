#![doc = r"Snapshot reconciliation engine for sectioned lists and grids."]

pub mod capabilities;
pub mod changes;
pub mod collections;
pub mod content;
pub mod data_source;
pub mod divider;
pub mod error;
pub mod hash;
pub mod identity;
pub mod item;
pub mod layout_cache;
pub mod prefetch;
pub mod renderer;
pub mod section;
pub mod snapshot;
pub mod transaction;

pub use capabilities::{Capabilities, DividerModel, ImageProviderKey, ImageProviders};
pub use changes::{ChangeMarks, SnapshotChanges};
pub use content::{ContentKey, EntityKind, ItemContent, Sizable};
pub use data_source::{DataSource, DataSourceConfig};
pub use divider::{
    AllDividersStrategy, DefaultDividerStrategy, DividerStrategy, NoDividersStrategy, SectionDividers,
};
pub use error::{ExtentError, SnapshotError};
pub use identity::{DecorationId, ElementKind, EntityRef, ItemId, SectionId, SupplementaryId};
pub use item::{AnchorRole, AnchoredItem, Decoration, DecorationItem, Item, Supplementary, SupplementaryItem};
pub use layout_cache::{
    is_valid_extent, Axis, CalculationContext, CalculationContextProvider, EnvironmentFingerprint,
    ExtentCache, FixedEnvironment,
};
pub use prefetch::{PrefetchScheduler, PrefetchStrategy, ScrollDirection};
pub use renderer::{Completion, CompletionSignal, RenderUpdate, RendererAdapter};
pub use section::{EdgeInsets, Section};
pub use snapshot::{IndexPath, Snapshot};
pub use transaction::{apply_transaction, Action, Transaction, TransactionOutcome};
