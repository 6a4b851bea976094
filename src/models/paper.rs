//! Paper (talk) model.
//!
//! A paper is the unit the scheduler places: one talk given by one or
//! more presenters, belonging to a track, with an estimated duration.
//!
//! # Time Representation
//! All times are in milliseconds relative to a conference epoch (t=0).
//! The consumer defines what t=0 means (e.g., midnight of the first day).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A paper or talk to be placed in the program.
///
/// Presenters, rooms and slots are referenced by id, never contained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Unique paper identifier.
    pub id: String,
    /// Paper title.
    pub title: String,
    /// Presenters giving the talk (ids into the presenter list).
    pub presenter_ids: Vec<String>,
    /// Estimated talk duration (ms).
    pub duration_ms: i64,
    /// Track / topic tag used for grouping.
    pub track: String,
    /// Equipment the room must provide (e.g., "projector").
    #[serde(default)]
    pub required_equipment: BTreeSet<String>,
    /// Slot the paper must occupy, if pinned by the program chair.
    #[serde(default)]
    pub fixed_slot: Option<String>,
    /// Room the paper must occupy, if pinned.
    #[serde(default)]
    pub fixed_room: Option<String>,
    /// Expected audience size, used to prefer rooms large enough.
    #[serde(default)]
    pub expected_attendance: u32,
}

impl Paper {
    /// Creates a new paper with the given ID and duration.
    pub fn new(id: impl Into<String>, duration_ms: i64) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            presenter_ids: Vec::new(),
            duration_ms,
            track: String::new(),
            required_equipment: BTreeSet::new(),
            fixed_slot: None,
            fixed_room: None,
            expected_attendance: 0,
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Adds a presenter reference.
    pub fn with_presenter(mut self, presenter_id: impl Into<String>) -> Self {
        self.presenter_ids.push(presenter_id.into());
        self
    }

    /// Sets the track tag.
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }

    /// Adds a required equipment tag.
    pub fn with_equipment(mut self, tag: impl Into<String>) -> Self {
        self.required_equipment.insert(tag.into());
        self
    }

    /// Pins the paper to a slot.
    pub fn with_fixed_slot(mut self, slot_id: impl Into<String>) -> Self {
        self.fixed_slot = Some(slot_id.into());
        self
    }

    /// Pins the paper to a room.
    pub fn with_fixed_room(mut self, room_id: impl Into<String>) -> Self {
        self.fixed_room = Some(room_id.into());
        self
    }

    /// Sets the expected audience size.
    pub fn with_attendance(mut self, attendance: u32) -> Self {
        self.expected_attendance = attendance;
        self
    }

    /// Whether the paper has a fixed-slot override.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed_slot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_builder() {
        let p = Paper::new("P1", 1_200_000)
            .with_title("Typed Records")
            .with_presenter("alice")
            .with_presenter("bob")
            .with_track("systems")
            .with_equipment("projector")
            .with_fixed_slot("S1")
            .with_attendance(40);

        assert_eq!(p.id, "P1");
        assert_eq!(p.title, "Typed Records");
        assert_eq!(p.presenter_ids, vec!["alice", "bob"]);
        assert_eq!(p.track, "systems");
        assert!(p.required_equipment.contains("projector"));
        assert!(p.is_fixed());
        assert_eq!(p.fixed_room, None);
        assert_eq!(p.expected_attendance, 40);
    }

    #[test]
    fn test_paper_defaults_from_json() {
        let json = r#"{"id":"P9","title":"t","presenter_ids":["a"],"duration_ms":10,"track":"x"}"#;
        let p: Paper = serde_json::from_str(json).unwrap();
        assert!(p.required_equipment.is_empty());
        assert!(!p.is_fixed());
        assert_eq!(p.expected_attendance, 0);
    }
}
