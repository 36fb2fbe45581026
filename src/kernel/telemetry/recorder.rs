use std::collections::VecDeque;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};

/// A widget visit produces a few dozen events. This keeps hours of them.
pub const DEFAULT_CAPACITY: usize = 1_024;

/// Bounded event log. The oldest events are evicted first and counted.
#[derive(Debug)]
pub struct TelemetryRecorder {
    log: VecDeque<TelemetryEvent>,
    capacity: usize,
    evicted: u64,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            log: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if self.log.len() == self.capacity {
            self.log.pop_front();
            self.evicted += 1;
        }
        self.log.push_back(event);
    }

    /// Counts over the retained window, plus how much fell out of it.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        let mut snap = compute_snapshot(&self.log);
        snap.evicted = self.evicted;
        snap
    }

    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.log.iter()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
