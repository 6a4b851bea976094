//! Schedule validation.
//!
//! Checks a schedule against every hard constraint, no matter how the
//! schedule was produced (engine output or a manual edit):
//! - Assignments reference known papers, rooms and slots
//! - Every paper is scheduled exactly once (excused papers at most once)
//! - No room hosts two papers in the same or overlapping slots
//! - Papers sharing a presenter sit in non-conflicting slots
//! - Presenters are not placed in their blackout slots
//! - Fixed-slot and fixed-room overrides are honored
//! - Rooms provide the required equipment
//! - Papers fit in their slot
//!
//! All violations are collected and returned; nothing is thrown.

use std::collections::BTreeMap;

use crate::constraints::ConstraintModel;
use crate::models::{Schedule, Violation, ViolationType};

/// An assignment resolved to model indices.
#[derive(Debug, Clone, Copy)]
struct Resolved {
    paper: usize,
    room: usize,
    slot: usize,
}

/// Validates a schedule against the constraint model.
///
/// # Returns
/// Every violation found, in a deterministic order. Empty iff valid.
pub fn validate(schedule: &Schedule, model: &ConstraintModel) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut resolved = Vec::with_capacity(schedule.assignments.len());

    for a in &schedule.assignments {
        let paper = model.paper_idx(&a.paper_id);
        let room = model.room_idx(&a.room_id);
        let slot = model.slot_idx(&a.slot_id);
        match (paper, room, slot) {
            (Some(paper), Some(room), Some(slot)) => resolved.push(Resolved { paper, room, slot }),
            _ => {
                let mut missing = Vec::new();
                if paper.is_none() {
                    missing.push(format!("paper '{}'", a.paper_id));
                }
                if room.is_none() {
                    missing.push(format!("room '{}'", a.room_id));
                }
                if slot.is_none() {
                    missing.push(format!("slot '{}'", a.slot_id));
                }
                violations.push(Violation::new(
                    ViolationType::UnknownReference,
                    &a.paper_id,
                    format!("Assignment references unknown {}", missing.join(", ")),
                ));
            }
        }
    }

    check_coverage(model, &resolved, &mut violations);
    for r in &resolved {
        check_placement(model, *r, &mut violations);
    }
    check_rooms(model, &resolved, &mut violations);
    check_presenters(model, &resolved, &mut violations);

    violations
}

/// Invariant 1: each paper exactly once, excused papers at most once.
fn check_coverage(model: &ConstraintModel, resolved: &[Resolved], out: &mut Vec<Violation>) {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for r in resolved {
        *counts.entry(r.paper).or_insert(0) += 1;
    }

    for (p, paper) in model.papers().iter().enumerate() {
        match counts.get(&p).copied().unwrap_or(0) {
            0 if !model.is_excused(p) => out.push(Violation::new(
                ViolationType::PaperUnscheduled,
                &paper.id,
                format!("Paper '{}' has no assignment", paper.id),
            )),
            0 | 1 => {}
            n => out.push(Violation::new(
                ViolationType::PaperDuplicated,
                &paper.id,
                format!("Paper '{}' is assigned {n} times", paper.id),
            )),
        }
    }
}

/// Per-assignment checks: pins, equipment, duration, blackouts.
fn check_placement(model: &ConstraintModel, r: Resolved, out: &mut Vec<Violation>) {
    let paper = model.paper(r.paper);
    let room = model.room(r.room);
    let slot = model.slot(r.slot);

    if let Some(fixed) = &paper.fixed_slot {
        if *fixed != slot.id {
            out.push(Violation::new(
                ViolationType::FixedPlacementMismatch,
                &paper.id,
                format!(
                    "Paper '{}' is fixed to slot '{}' but assigned '{}'",
                    paper.id, fixed, slot.id
                ),
            ));
        }
    }
    if let Some(fixed) = &paper.fixed_room {
        if *fixed != room.id {
            out.push(Violation::new(
                ViolationType::FixedPlacementMismatch,
                &paper.id,
                format!(
                    "Paper '{}' is fixed to room '{}' but assigned '{}'",
                    paper.id, fixed, room.id
                ),
            ));
        }
    }
    if !room.provides(&paper.required_equipment) {
        let missing: Vec<&str> = paper
            .required_equipment
            .difference(&room.equipment)
            .map(String::as_str)
            .collect();
        out.push(Violation::new(
            ViolationType::EquipmentMismatch,
            &paper.id,
            format!("Room '{}' lacks {:?} for paper '{}'", room.id, missing, paper.id),
        ));
    }
    if paper.duration_ms > slot.duration_ms {
        out.push(Violation::new(
            ViolationType::DurationOverflow,
            &paper.id,
            format!(
                "Paper '{}' runs {}ms but slot '{}' is {}ms",
                paper.id, paper.duration_ms, slot.id, slot.duration_ms
            ),
        ));
    }
    if model.is_blocked(r.paper, r.slot) {
        out.push(Violation::new(
            ViolationType::PresenterUnavailable,
            &paper.id,
            format!(
                "A presenter of paper '{}' is unavailable during slot '{}'",
                paper.id, slot.id
            ),
        ));
    }
}

/// Invariant 2: no room hosts two papers in the same or overlapping slots.
fn check_rooms(model: &ConstraintModel, resolved: &[Resolved], out: &mut Vec<Violation>) {
    for (i, a) in resolved.iter().enumerate() {
        for b in &resolved[i + 1..] {
            if a.room == b.room && a.paper != b.paper && model.slots_overlap(a.slot, b.slot) {
                let room = &model.room(a.room).id;
                out.push(Violation::new(
                    ViolationType::RoomDoubleBooked,
                    room,
                    format!(
                        "Room '{}' hosts '{}' ({}) and '{}' ({}) at the same time",
                        room,
                        model.paper(a.paper).id,
                        model.slot(a.slot).id,
                        model.paper(b.paper).id,
                        model.slot(b.slot).id
                    ),
                ));
            }
        }
    }
}

/// Invariant 3: a presenter's papers never sit in conflicting slots.
fn check_presenters(model: &ConstraintModel, resolved: &[Resolved], out: &mut Vec<Violation>) {
    for (presenter, papers) in model.presenter_papers() {
        let theirs: Vec<&Resolved> = resolved
            .iter()
            .filter(|r| papers.contains(&r.paper))
            .collect();
        for (i, a) in theirs.iter().enumerate() {
            for b in &theirs[i + 1..] {
                if a.paper != b.paper && model.presenter_slots_conflict(a.slot, b.slot) {
                    out.push(Violation::new(
                        ViolationType::PresenterConflict,
                        presenter,
                        format!(
                            "Presenter '{}' gives '{}' ({}) and '{}' ({}) in conflicting slots",
                            presenter,
                            model.paper(a.paper).id,
                            model.slot(a.slot).id,
                            model.paper(b.paper).id,
                            model.slot(b.slot).id
                        ),
                    ));
                }
            }
        }
    }
}
