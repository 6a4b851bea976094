//! Schedule (solution) model.
//!
//! A schedule is a set of paper-room-slot assignments. Violations are
//! kept separate from the schedule: they are produced by the validator
//! and returned as data.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A complete conference program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Paper placements.
    pub assignments: Vec<Assignment>,
}

/// A (paper, room, slot) triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned paper ID.
    pub paper_id: String,
    /// Hosting room ID.
    pub room_id: String,
    /// Slot ID.
    pub slot_id: String,
}

/// Changes between a previously persisted schedule and a new one.
///
/// Papers are compared by id; each list is sorted by paper id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDiff {
    /// Placements of papers absent from the previous schedule.
    pub added: Vec<Assignment>,
    /// Previous placements of papers absent from the new schedule.
    pub removed: Vec<Assignment>,
    /// Papers whose room or slot changed.
    pub moved: Vec<PaperMove>,
    /// Number of papers placed identically in both schedules.
    pub unchanged: usize,
}

/// A paper that changed room or slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMove {
    pub previous: Assignment,
    pub current: Assignment,
}

/// A hard-constraint violation found in a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (paper, room, or presenter).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// An assignment names a paper, room, or slot that does not exist.
    UnknownReference,
    /// A paper has no assignment and is not an accepted exception.
    PaperUnscheduled,
    /// A paper appears in more than one assignment.
    PaperDuplicated,
    /// A room hosts two papers in the same or overlapping slots.
    RoomDoubleBooked,
    /// Two papers sharing a presenter are in conflicting slots.
    PresenterConflict,
    /// A presenter is placed in one of their blackout slots.
    PresenterUnavailable,
    /// A fixed-slot or fixed-room override is not honored.
    FixedPlacementMismatch,
    /// The room lacks equipment the paper requires.
    EquipmentMismatch,
    /// The paper is longer than its slot.
    DurationOverflow,
}

impl ViolationType {
    /// Default severity for this violation class.
    pub fn severity(self) -> i32 {
        match self {
            ViolationType::UnknownReference => 100,
            ViolationType::RoomDoubleBooked | ViolationType::PresenterConflict => 95,
            ViolationType::PaperDuplicated | ViolationType::FixedPlacementMismatch => 90,
            ViolationType::EquipmentMismatch | ViolationType::DurationOverflow => 85,
            ViolationType::PresenterUnavailable => 80,
            ViolationType::PaperUnscheduled => 70,
        }
    }
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(
        paper_id: impl Into<String>,
        room_id: impl Into<String>,
        slot_id: impl Into<String>,
    ) -> Self {
        Self {
            paper_id: paper_id.into(),
            room_id: room_id.into(),
            slot_id: slot_id.into(),
        }
    }
}

impl Violation {
    /// Creates a violation with the class's default severity.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity: violation_type.severity(),
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schedule from assignments.
    pub fn from_assignments(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Finds the assignment for a given paper.
    pub fn assignment_for_paper(&self, paper_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.paper_id == paper_id)
    }

    /// Returns all assignments in a given room.
    pub fn assignments_for_room(&self, room_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.room_id == room_id)
            .collect()
    }

    /// Returns all assignments in a given slot.
    pub fn assignments_for_slot(&self, slot_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.slot_id == slot_id)
            .collect()
    }

    /// Distinct rooms used by the schedule.
    pub fn rooms_used(&self) -> BTreeSet<&str> {
        self.assignments.iter().map(|a| a.room_id.as_str()).collect()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the schedule has no assignments.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Compares this schedule with `previous`.
    ///
    /// A paper listed more than once is compared by its first assignment.
    pub fn diff_from(&self, previous: &Schedule) -> ScheduleDiff {
        let before = by_paper(previous);
        let after = by_paper(self);
        let mut diff = ScheduleDiff::default();

        for (paper_id, current) in &after {
            match before.get(paper_id) {
                None => diff.added.push((*current).clone()),
                Some(prev) if prev.room_id == current.room_id && prev.slot_id == current.slot_id => {
                    diff.unchanged += 1;
                }
                Some(prev) => diff.moved.push(PaperMove {
                    previous: (*prev).clone(),
                    current: (*current).clone(),
                }),
            }
        }
        diff.removed = before
            .iter()
            .filter(|(paper_id, _)| !after.contains_key(*paper_id))
            .map(|(_, prev)| (*prev).clone())
            .collect();
        diff
    }
}

fn by_paper(schedule: &Schedule) -> BTreeMap<&str, &Assignment> {
    let mut map = BTreeMap::new();
    for a in &schedule.assignments {
        map.entry(a.paper_id.as_str()).or_insert(a);
    }
    map
}

impl ScheduleDiff {
    /// Whether nothing was added, removed, or moved.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }

    /// Number of papers added, removed, or moved.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.moved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> Schedule {
        Schedule::from_assignments(vec![
            Assignment::new("P1", "R1", "S1"),
            Assignment::new("P2", "R2", "S1"),
            Assignment::new("P3", "R1", "S2"),
        ])
    }

    #[test]
    fn test_assignment_for_paper() {
        let s = sample_schedule();
        let a = s.assignment_for_paper("P2").unwrap();
        assert_eq!(a.room_id, "R2");
        assert_eq!(a.slot_id, "S1");
        assert!(s.assignment_for_paper("P99").is_none());
    }

    #[test]
    fn test_assignments_for_room_and_slot() {
        let s = sample_schedule();
        assert_eq!(s.assignments_for_room("R1").len(), 2);
        assert_eq!(s.assignments_for_slot("S1").len(), 2);
        assert_eq!(s.assignments_for_slot("S3").len(), 0);
    }

    #[test]
    fn test_rooms_used() {
        let s = sample_schedule();
        let rooms: Vec<&str> = s.rooms_used().into_iter().collect();
        assert_eq!(rooms, vec!["R1", "R2"]);
    }

    #[test]
    fn test_diff_from_previous() {
        let previous = sample_schedule();
        let current = Schedule::from_assignments(vec![
            Assignment::new("P1", "R1", "S1"),
            Assignment::new("P3", "R2", "S2"),
            Assignment::new("P4", "R1", "S2"),
        ]);
        let diff = current.diff_from(&previous);

        assert_eq!(diff.added, vec![Assignment::new("P4", "R1", "S2")]);
        assert_eq!(diff.removed, vec![Assignment::new("P2", "R2", "S1")]);
        assert_eq!(
            diff.moved,
            vec![PaperMove {
                previous: Assignment::new("P3", "R1", "S2"),
                current: Assignment::new("P3", "R2", "S2"),
            }]
        );
        assert_eq!(diff.unchanged, 1);
        assert_eq!(diff.change_count(), 3);
    }

    #[test]
    fn test_diff_identical_and_from_empty() {
        let s = sample_schedule();
        let same = s.diff_from(&s.clone());
        assert!(same.is_empty());
        assert_eq!(same.unchanged, 3);

        let fresh = s.diff_from(&Schedule::new());
        assert_eq!(fresh.added.len(), 3);
        assert_eq!(fresh.unchanged, 0);
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::new();
        assert!(s.is_empty());
        assert_eq!(s.assignment_count(), 0);
    }

    #[test]
    fn test_violation_uses_class_severity() {
        let v = Violation::new(ViolationType::RoomDoubleBooked, "R1", "double");
        assert_eq!(v.severity, 95);
        assert_eq!(v.entity_id, "R1");

        let v = Violation::new(ViolationType::PaperUnscheduled, "P1", "missing");
        assert!(v.severity < ViolationType::UnknownReference.severity());
    }

    #[test]
    fn test_schedule_json_shape() {
        let s = Schedule::from_assignments(vec![Assignment::new("P1", "R1", "S1")]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["assignments"][0]["paper_id"], "P1");
        assert_eq!(json["assignments"][0]["room_id"], "R1");
        assert_eq!(json["assignments"][0]["slot_id"], "S1");
    }
}
