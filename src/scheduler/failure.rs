//! Scheduling failure report.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Violation;

/// Constraint class that prevented a paper from being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintClass {
    /// No room can host the paper: missing equipment, a room pin, or
    /// every compatible room is booked in every compatible slot.
    NoRoom,
    /// No slot can host the paper: too long, slot pin, or blackouts.
    NoSlot,
    /// A room is free but a co-presented paper occupies a conflicting slot.
    PresenterConflict,
}

impl fmt::Display for ConstraintClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintClass::NoRoom => "no room",
            ConstraintClass::NoSlot => "no slot",
            ConstraintClass::PresenterConflict => "presenter conflict",
        };
        f.write_str(name)
    }
}

/// A paper the engine could not place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplacedPaper {
    /// Paper ID.
    pub paper_id: String,
    /// Failing constraint class.
    pub class: ConstraintClass,
    /// What to change to make the paper placeable.
    pub detail: String,
}

/// No feasible program was found within the backtracking bound.
///
/// Returned as a value: the caller fixes the data (add a room, move a
/// blackout) and re-runs. Never accompanied by a partial schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingFailure {
    /// Papers left without an assignment.
    pub unplaced: Vec<UnplacedPaper>,
    /// Violations found by the post-run self-check (normally empty).
    pub violations: Vec<Violation>,
}

impl SchedulingFailure {
    /// IDs of the unplaced papers.
    pub fn paper_ids(&self) -> Vec<&str> {
        self.unplaced.iter().map(|u| u.paper_id.as_str()).collect()
    }

    /// Unplaced entry for a paper.
    pub fn for_paper(&self, paper_id: &str) -> Option<&UnplacedPaper> {
        self.unplaced.iter().find(|u| u.paper_id == paper_id)
    }
}

impl fmt::Display for SchedulingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.violations.is_empty() {
            return write!(
                f,
                "engine output failed validation with {} violation(s)",
                self.violations.len()
            );
        }
        write!(f, "could not place {} paper(s)", self.unplaced.len())?;
        for u in &self.unplaced {
            write!(f, "; {} ({}): {}", u.paper_id, u.class, u.detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchedulingFailure {}
