//! Paper and candidate ordering.
//!
//! # Paper order (fail-first)
//! 1. Fixed-slot papers first.
//! 2. Fewest statically compatible (room, slot) cells.
//! 3. Longest duration.
//! 4. Paper ID.
//!
//! # Candidate order
//! Feasible cells are ranked by soft-objective penalty, then slot
//! chronology, then the room's rank in the paper's compatible-room list
//! (rooms large enough by ascending capacity, then undersized rooms).
//! All keys are integers, so the order is fully deterministic.
//!
//! # Reference
//! Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//! Constraint Satisfaction Problems" (fail-first principle)

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::config::ObjectiveWeights;
use crate::constraints::ConstraintModel;

/// Returns schedulable paper indices, most constrained first.
///
/// Papers the caller excused from the program are left out.
pub fn paper_order(model: &ConstraintModel) -> Vec<usize> {
    let mut order: Vec<usize> = (0..model.papers().len())
        .filter(|&p| !model.is_excused(p))
        .collect();
    order.sort_by_key(|&p| {
        let paper = model.paper(p);
        (
            !paper.is_fixed(),
            model.compatible_cell_count(p),
            Reverse(paper.duration_ms),
            paper.id.as_str(),
        )
    });
    order
}

/// Sort key of a candidate cell. Lower is tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CandidateKey {
    /// Weighted soft-objective penalty.
    pub penalty: u64,
    /// Slot index (chronological).
    pub slot: usize,
    /// Position of the room in the paper's compatible-room list.
    pub room_rank: usize,
}

/// Computes the soft-objective penalty of placing `paper` in `room`.
///
/// `track_rooms` holds, for the paper's track, how many papers each
/// room already hosts.
pub fn penalty(
    model: &ConstraintModel,
    weights: &ObjectiveWeights,
    paper: usize,
    room: usize,
    track_rooms: Option<&BTreeMap<usize, usize>>,
) -> u64 {
    let p = model.paper(paper);
    let mut total = 0u64;

    if !p.track.is_empty() {
        let used = track_rooms.is_some_and(|rooms| rooms.contains_key(&room));
        if !used {
            total += u64::from(weights.track_cohesion);
        }
    }
    if !model.room(room).fits(p.expected_attendance) {
        total += u64::from(weights.room_fit);
    }
    total
}
