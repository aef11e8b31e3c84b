//! Gates in front of the selector: one that lets a location through only
//! once enough time has passed *and* the user has moved far enough, and one
//! that only believes a floor change after it has been seen many times in a
//! row.

use std::time::{Duration, Instant};

use log::debug;

use crate::location::{Location, LocationEvent};

/// The last location accepted for bearing computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    pub location: Location,
    pub at: Instant,
}

/// Time and displacement gate.
#[derive(Debug, Clone)]
pub struct CheckpointGate {
    min_interval: Duration,
    min_displacement: f64,
    checkpoint: Option<Checkpoint>,
}

/// What the gate made of one location sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Unknown position; nothing changes.
    Invalid,
    /// First usable position, it becomes the checkpoint.
    Seeded,
    /// Too soon or too close to the checkpoint.
    Held,
    /// Accepted. Carries the checkpoint it replaced and the distance from it.
    Passed { previous: Checkpoint, displacement: f64 },
}

impl CheckpointGate {
    pub fn new(min_interval: Duration, min_displacement: f64) -> Self {
        Self {
            min_interval,
            min_displacement,
            checkpoint: None,
        }
    }

    pub fn checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoint.as_ref()
    }

    /// Forgets the checkpoint, back to idle.
    pub fn reset(&mut self) {
        self.checkpoint = None;
    }

    pub fn offer(&mut self, event: &LocationEvent) -> GateDecision {
        if !event.location.is_valid() {
            return GateDecision::Invalid;
        }
        let current = Checkpoint {
            location: event.location,
            at: event.at,
        };
        let Some(previous) = self.checkpoint else {
            self.checkpoint = Some(current);
            return GateDecision::Seeded;
        };

        let elapsed = event.at.saturating_duration_since(previous.at);
        if elapsed <= self.min_interval {
            return GateDecision::Held;
        }
        let displacement = previous.location.distance_to(&event.location);
        if displacement < self.min_displacement {
            debug!("held: moved {displacement:.2} m in {elapsed:?}");
            return GateDecision::Held;
        }

        self.checkpoint = Some(current);
        GateDecision::Passed {
            previous,
            displacement,
        }
    }
}

/// Consecutive observations of the same floor needed before a change counts.
pub const FLOOR_CHANGE_THRESHOLD: u32 = 20;

/// Floor change hysteresis.
#[derive(Debug, Clone)]
pub struct FloorTracker {
    threshold: u32,
    temporary: Option<i32>,
    count: u32,
    committed: Option<i32>,
}

impl Default for FloorTracker {
    fn default() -> Self {
        Self::new(FLOOR_CHANGE_THRESHOLD)
    }
}

impl FloorTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            temporary: None,
            count: 0,
            committed: None,
        }
    }

    pub fn committed(&self) -> Option<i32> {
        self.committed
    }

    /// Feeds one ground floor observation. Returns the newly committed floor
    /// on the observation that tips the count over the threshold.
    pub fn observe(&mut self, floor: i32) -> Option<i32> {
        if self.temporary == Some(floor) {
            self.count = self.count.saturating_add(1);
        } else {
            self.temporary = Some(floor);
            self.count = 1;
        }

        if self.count > self.threshold && self.committed != self.temporary {
            self.committed = self.temporary;
            debug!("floor committed: {floor}");
            return self.committed;
        }
        None
    }
}
