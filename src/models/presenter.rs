//! Presenter model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A person presenting one or more papers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presenter {
    /// Unique presenter identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Slots during which the presenter cannot speak (blackout times).
    #[serde(default)]
    pub unavailable_slots: BTreeSet<String>,
}

impl Presenter {
    /// Creates a new presenter.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            unavailable_slots: BTreeSet::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks a slot as a blackout.
    pub fn unavailable_in(mut self, slot_id: impl Into<String>) -> Self {
        self.unavailable_slots.insert(slot_id.into());
        self
    }
}
