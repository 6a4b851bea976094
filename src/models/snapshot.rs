//! Input snapshot.
//!
//! The complete, immutable-for-the-run set of records fed to the
//! scheduler. Stores load one, the constraint model consumes it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Paper, Presenter, Room, Slot};

/// Papers, presenters, rooms and slots for one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Papers to place.
    #[serde(default)]
    pub papers: Vec<Paper>,
    /// Presenters referenced by papers.
    #[serde(default)]
    pub presenters: Vec<Presenter>,
    /// Available rooms.
    #[serde(default)]
    pub rooms: Vec<Room>,
    /// Available slots.
    #[serde(default)]
    pub slots: Vec<Slot>,
    /// Papers the caller accepts leaving out of the program.
    #[serde(default)]
    pub unscheduled: BTreeSet<String>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a paper.
    pub fn with_paper(mut self, paper: Paper) -> Self {
        self.papers.push(paper);
        self
    }

    /// Adds a presenter.
    pub fn with_presenter(mut self, presenter: Presenter) -> Self {
        self.presenters.push(presenter);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Adds a slot.
    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.slots.push(slot);
        self
    }

    /// Marks a paper as an accepted unscheduled exception.
    pub fn with_unscheduled(mut self, paper_id: impl Into<String>) -> Self {
        self.unscheduled.insert(paper_id.into());
        self
    }
}
