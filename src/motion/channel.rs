//! Single-slot input channel
//!
//! The only communication path between the sensor loop and the simulation
//! loop: a last-value-wins cell. Both loops run cooperatively on the same
//! execution context (one iteration per display refresh, never overlapping),
//! so a plain `Cell` behind a shared handle is sufficient - no lock needed.

use std::cell::Cell;
use std::rc::Rc;

use super::MotionSample;

/// Cloneable handle to the latest motion sample. The sensor publishes, the
/// game loop reads a copy once per tick; a stale or default sample is
/// returned if none has arrived yet.
#[derive(Clone, Default)]
pub struct InputSlot {
    latest: Rc<Cell<MotionSample>>,
}

impl InputSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot with the newest sample
    pub fn publish(&self, sample: MotionSample) {
        self.latest.set(sample);
    }

    /// Copy out the latest sample without consuming it
    pub fn latest(&self) -> MotionSample {
        self.latest.get()
    }
}
