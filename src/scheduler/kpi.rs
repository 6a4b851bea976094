//! Program quality metrics (KPIs).
//!
//! Computes soft-objective indicators from a schedule and its model.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Scheduled Papers | Number of assignments that name a known paper |
//! | Rooms per Track | Distinct rooms hosting each track |
//! | Track Spread | Sum over tracks of (rooms - 1) |
//! | Room Utilization | Used slots / total slots, per room |
//! | Undersized Assignments | Papers whose room seats fewer than expected |

use std::collections::{BTreeMap, BTreeSet};

use crate::constraints::ConstraintModel;
use crate::models::Schedule;

/// Program performance indicators.
#[derive(Debug, Clone)]
pub struct ProgramKpi {
    /// Number of scheduled papers.
    pub scheduled_papers: usize,
    /// Distinct rooms used per track (papers without a track are skipped).
    pub rooms_per_track: BTreeMap<String, usize>,
    /// Sum over tracks of (rooms used - 1). Zero = every track in one room.
    pub track_spread: usize,
    /// Fraction of slots in which each room hosts a paper (0.0..1.0).
    pub utilization_by_room: BTreeMap<String, f64>,
    /// Mean room utilization.
    pub avg_utilization: f64,
    /// Assignments whose room capacity is below the expected attendance.
    pub undersized_assignments: usize,
}

impl ProgramKpi {
    /// Computes KPIs for a schedule.
    ///
    /// Assignments naming unknown papers, rooms or slots are ignored.
    pub fn calculate(schedule: &Schedule, model: &ConstraintModel) -> Self {
        let mut scheduled_papers = 0;
        let mut track_rooms: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
        let mut room_slots: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        let mut undersized = 0;

        for a in &schedule.assignments {
            let (Some(p), Some(r), Some(s)) = (
                model.paper_idx(&a.paper_id),
                model.room_idx(&a.room_id),
                model.slot_idx(&a.slot_id),
            ) else {
                continue;
            };
            scheduled_papers += 1;

            let paper = model.paper(p);
            if !paper.track.is_empty() {
                track_rooms.entry(paper.track.as_str()).or_default().insert(r);
            }
            room_slots.entry(r).or_default().insert(s);
            if !model.room(r).fits(paper.expected_attendance) {
                undersized += 1;
            }
        }

        let rooms_per_track: BTreeMap<String, usize> = track_rooms
            .into_iter()
            .map(|(track, rooms)| (track.to_string(), rooms.len()))
            .collect();
        let track_spread = rooms_per_track.values().map(|n| n.saturating_sub(1)).sum();

        let total_slots = model.slots().len();
        let utilization_by_room: BTreeMap<String, f64> = if total_slots == 0 {
            BTreeMap::new()
        } else {
            model
                .rooms()
                .iter()
                .enumerate()
                .map(|(r, room)| {
                    let used = room_slots.get(&r).map_or(0, |s| s.len());
                    (room.id.clone(), used as f64 / total_slots as f64)
                })
                .collect()
        };
        let avg_utilization = if utilization_by_room.is_empty() {
            0.0
        } else {
            utilization_by_room.values().sum::<f64>() / utilization_by_room.len() as f64
        };

        Self {
            scheduled_papers,
            rooms_per_track,
            track_spread,
            utilization_by_room,
            avg_utilization,
            undersized_assignments: undersized,
        }
    }

    /// Whether the program meets the given soft-objective thresholds.
    pub fn meets_thresholds(&self, max_track_spread: usize, max_undersized: usize) -> bool {
        self.track_spread <= max_track_spread && self.undersized_assignments <= max_undersized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Paper, Room, Slot, Snapshot};

    fn model() -> ConstraintModel {
        let snap = Snapshot::new()
            .with_room(Room::new("R1", 100))
            .with_room(Room::new("R2", 10))
            .with_slot(Slot::new("S1", 0, 60))
            .with_slot(Slot::new("S2", 60, 60))
            .with_paper(Paper::new("P1", 30).with_track("ml"))
            .with_paper(Paper::new("P2", 30).with_track("ml").with_attendance(50))
            .with_paper(Paper::new("P3", 30).with_track("db"))
            .with_paper(Paper::new("P4", 30));
        ConstraintModel::build(&snap, 0).unwrap()
    }

    #[test]
    fn test_kpi_basic() {
        let schedule = Schedule::from_assignments(vec![
            Assignment::new("P1", "R1", "S1"),
            Assignment::new("P2", "R2", "S1"),
            Assignment::new("P3", "R1", "S2"),
            Assignment::new("P4", "R2", "S2"),
        ]);
        let kpi = ProgramKpi::calculate(&schedule, &model());

        assert_eq!(kpi.scheduled_papers, 4);
        assert_eq!(kpi.rooms_per_track["ml"], 2);
        assert_eq!(kpi.rooms_per_track["db"], 1);
        assert_eq!(kpi.track_spread, 1);
        assert_eq!(kpi.undersized_assignments, 1); // P2 (50) in R2 (10)
        assert!((kpi.utilization_by_room["R1"] - 1.0).abs() < 1e-10);
        assert!((kpi.avg_utilization - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_partial_utilization() {
        let schedule = Schedule::from_assignments(vec![Assignment::new("P1", "R1", "S1")]);
        let kpi = ProgramKpi::calculate(&schedule, &model());
        assert!((kpi.utilization_by_room["R1"] - 0.5).abs() < 1e-10);
        assert!((kpi.utilization_by_room["R2"] - 0.0).abs() < 1e-10);
        assert!((kpi.avg_utilization - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_ignores_unknown_references() {
        let schedule = Schedule::from_assignments(vec![
            Assignment::new("P1", "R1", "S1"),
            Assignment::new("ghost", "R1", "S2"),
        ]);
        let kpi = ProgramKpi::calculate(&schedule, &model());
        assert_eq!(kpi.scheduled_papers, 1);
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = ProgramKpi::calculate(&Schedule::new(), &model());
        assert_eq!(kpi.scheduled_papers, 0);
        assert_eq!(kpi.track_spread, 0);
        assert!(kpi.rooms_per_track.is_empty());
        assert!((kpi.avg_utilization - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_meets_thresholds() {
        let schedule = Schedule::from_assignments(vec![
            Assignment::new("P1", "R1", "S1"),
            Assignment::new("P2", "R2", "S2"),
        ]);
        let kpi = ProgramKpi::calculate(&schedule, &model());
        assert!(kpi.meets_thresholds(1, 1));
        assert!(!kpi.meets_thresholds(0, 1));
        assert!(!kpi.meets_thresholds(1, 0));
    }
}
