//! Time slot model.
//!
//! A slot is a fixed interval of the conference day. Each room can host
//! one paper per slot. Slots are totally ordered by start time, with the
//! in-day ordering index and id as tie-breakers.
//!
//! # Time Model
//! Intervals are half-open: `[start_ms, start_ms + duration_ms)`.
//! Back-to-back slots do not overlap unless a buffer is applied.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A scheduling slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Unique slot identifier.
    pub id: String,
    /// Slot start (ms, inclusive).
    pub start_ms: i64,
    /// Slot length (ms).
    pub duration_ms: i64,
    /// Ordering index within the day.
    #[serde(default)]
    pub order: u32,
}

impl Slot {
    /// Creates a new slot.
    pub fn new(id: impl Into<String>, start_ms: i64, duration_ms: i64) -> Self {
        Self {
            id: id.into(),
            start_ms,
            duration_ms,
            order: 0,
        }
    }

    /// Sets the in-day ordering index.
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Slot end (ms, exclusive). Saturates at `i64::MAX`.
    #[inline]
    pub fn end_ms(&self) -> i64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    /// Whether two slots overlap in time.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.overlaps_with_buffer(other, 0)
    }

    /// Whether two slots conflict once each is padded by `buffer_ms`.
    ///
    /// With `buffer_ms > 0`, slots closer than the buffer conflict too
    /// (e.g., a presenter needs time to move between rooms).
    pub fn overlaps_with_buffer(&self, other: &Self, buffer_ms: i64) -> bool {
        self.start_ms < other.end_ms().saturating_add(buffer_ms)
            && other.start_ms < self.end_ms().saturating_add(buffer_ms)
    }

    /// Chronological ordering: start time, then in-day order, then id.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.start_ms
            .cmp(&other.start_ms)
            .then(self.order.cmp(&other.order))
            .then_with(|| self.id.cmp(&other.id))
    }
}
