//! Room model.
//!
//! Rooms host talks. Each room has a seating capacity and a set of
//! equipment tags (projector, microphone, streaming rig, ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A room that can host one talk per slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Number of seats.
    pub capacity: u32,
    /// Equipment available in the room.
    #[serde(default)]
    pub equipment: BTreeSet<String>,
}

impl Room {
    /// Creates a new room with the given capacity.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            equipment: BTreeSet::new(),
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an equipment tag.
    pub fn with_equipment(mut self, tag: impl Into<String>) -> Self {
        self.equipment.insert(tag.into());
        self
    }

    /// Whether the room provides every tag in `required`.
    pub fn provides(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.equipment)
    }

    /// Whether the room seats at least `attendance` people.
    #[inline]
    pub fn fits(&self, attendance: u32) -> bool {
        self.capacity >= attendance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_builder() {
        let r = Room::new("R1", 120)
            .with_name("Main Hall")
            .with_equipment("projector")
            .with_equipment("microphone");

        assert_eq!(r.id, "R1");
        assert_eq!(r.name, "Main Hall");
        assert_eq!(r.capacity, 120);
        assert_eq!(r.equipment.len(), 2);
    }

    #[test]
    fn test_room_provides_superset() {
        let r = Room::new("R1", 10).with_equipment("projector").with_equipment("mic");

        let mut need = BTreeSet::new();
        assert!(r.provides(&need)); // nothing required

        need.insert("projector".to_string());
        assert!(r.provides(&need));

        need.insert("stream".to_string());
        assert!(!r.provides(&need));
    }

    #[test]
    fn test_room_fits() {
        let r = Room::new("R1", 30);
        assert!(r.fits(30));
        assert!(r.fits(0));
        assert!(!r.fits(31));
    }
}
