//! Testing utilities for sectionkit

pub mod assertions;
pub mod fixtures;
pub mod poll;
pub mod probe;
pub mod renderer;

pub use assertions::{assert_item_order, assert_section_order, assert_snapshot_invariants};
pub use fixtures::{item, item_id, section, section_id, Row};
pub use poll::{poll_once, CountingWaker};
pub use probe::{MeasureProbe, ProbeContent};
pub use renderer::{PendingCompletions, RecordingRenderer};

pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::fixtures::*;
    pub use crate::poll::*;
    pub use crate::probe::*;
    pub use crate::renderer::*;
}
