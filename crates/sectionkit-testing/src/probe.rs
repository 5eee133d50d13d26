//! Content that counts how often it gets measured.

use std::cell::Cell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use sectionkit_core::{Axis, CalculationContext, Sizable};

pub const LINE_HEIGHT: f32 = 22.0;

/// Shared measurement counter. Clones observe the same count.
#[derive(Clone, Debug, Default)]
pub struct MeasureProbe {
    count: Rc<Cell<usize>>,
}

impl MeasureProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }

    pub fn reset(&self) {
        self.count.set(0);
    }

    fn record(&self) {
        self.count.set(self.count.get() + 1);
    }
}

/// Multi-line text: one [`LINE_HEIGHT`] per line, full available width.
///
/// The probe does not take part in hashing, so two probes over the same
/// text are the same content.
#[derive(Clone, Debug)]
pub struct ProbeContent {
    pub text: String,
    probe: MeasureProbe,
}

impl ProbeContent {
    pub fn new(text: impl Into<String>, probe: &MeasureProbe) -> Self {
        Self {
            text: text.into(),
            probe: probe.clone(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count().max(1)
    }
}

impl Hash for ProbeContent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl Sizable for ProbeContent {
    fn measure(&self, context: &CalculationContext, axis: Axis) -> f32 {
        self.probe.record();
        match axis {
            Axis::Height => LINE_HEIGHT * self.line_count() as f32,
            Axis::Width => context.available_orthogonal_dimension(),
        }
    }
}
