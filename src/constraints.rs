//! Constraint model.
//!
//! Converts a [`Snapshot`] into index-based lookup tables for the
//! scheduler and validator:
//!
//! - presenter → papers they co-author (and, per paper, co-presented papers)
//! - slot → slots overlapping in time (room double-booking)
//! - slot → slots conflicting for a shared presenter (overlap plus buffer)
//! - room → equipment tags
//! - paper → statically compatible rooms and slots
//!
//! The model is built fresh for every run and never mutated afterwards.
//! Construction checks every reference and fails with
//! [`DataIntegrityError`] on the first missing or malformed one.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{DataIntegrityError, EntityKind};
use crate::models::{Paper, Presenter, Room, Slot, Snapshot};

/// Precomputed scheduling problem.
///
/// Papers, rooms and presenters keep their snapshot order. Slots are
/// sorted chronologically, so slot indices are time-ordered.
#[derive(Debug, Clone)]
pub struct ConstraintModel {
    papers: Vec<Paper>,
    presenters: Vec<Presenter>,
    rooms: Vec<Room>,
    slots: Vec<Slot>,
    paper_index: HashMap<String, usize>,
    room_index: HashMap<String, usize>,
    slot_index: HashMap<String, usize>,
    presenter_papers: BTreeMap<String, BTreeSet<usize>>,
    co_presented: Vec<BTreeSet<usize>>,
    slot_overlaps: Vec<BTreeSet<usize>>,
    presenter_conflicts: Vec<BTreeSet<usize>>,
    blocked_slots: Vec<BTreeSet<usize>>,
    compatible_rooms: Vec<Vec<usize>>,
    compatible_slots: Vec<Vec<usize>>,
    unscheduled: BTreeSet<usize>,
    slot_buffer_ms: i64,
}

impl ConstraintModel {
    /// Builds the model from a snapshot.
    ///
    /// `slot_buffer_ms` widens the presenter conflict window: two slots
    /// closer than the buffer cannot share a presenter.
    pub fn build(snapshot: &Snapshot, slot_buffer_ms: i64) -> Result<Self, DataIntegrityError> {
        let mut slots = snapshot.slots.clone();
        slots.sort_by(|a, b| a.chronological_cmp(b));

        let paper_index = index_ids(snapshot.papers.iter().map(|p| &p.id), EntityKind::Paper)?;
        let presenter_index = index_ids(
            snapshot.presenters.iter().map(|p| &p.id),
            EntityKind::Presenter,
        )?;
        let room_index = index_ids(snapshot.rooms.iter().map(|r| &r.id), EntityKind::Room)?;
        let slot_index = index_ids(slots.iter().map(|s| &s.id), EntityKind::Slot)?;

        for slot in &slots {
            if slot.duration_ms <= 0 {
                return Err(DataIntegrityError::InvalidDuration {
                    kind: EntityKind::Slot,
                    id: slot.id.clone(),
                    duration_ms: slot.duration_ms,
                });
            }
            if slot.start_ms.checked_add(slot.duration_ms).is_none() {
                return Err(DataIntegrityError::SlotOutOfRange {
                    id: slot.id.clone(),
                    start_ms: slot.start_ms,
                    duration_ms: slot.duration_ms,
                });
            }
        }

        for presenter in &snapshot.presenters {
            for slot_id in &presenter.unavailable_slots {
                if !slot_index.contains_key(slot_id) {
                    return Err(DataIntegrityError::UnknownBlackoutSlot {
                        presenter_id: presenter.id.clone(),
                        slot_id: slot_id.clone(),
                    });
                }
            }
        }

        let mut presenter_papers: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
        for (p_idx, paper) in snapshot.papers.iter().enumerate() {
            if paper.duration_ms <= 0 {
                return Err(DataIntegrityError::InvalidDuration {
                    kind: EntityKind::Paper,
                    id: paper.id.clone(),
                    duration_ms: paper.duration_ms,
                });
            }
            for presenter_id in &paper.presenter_ids {
                if !presenter_index.contains_key(presenter_id) {
                    return Err(DataIntegrityError::UnknownPresenter {
                        paper_id: paper.id.clone(),
                        presenter_id: presenter_id.clone(),
                    });
                }
                presenter_papers
                    .entry(presenter_id.clone())
                    .or_default()
                    .insert(p_idx);
            }
            if let Some(slot_id) = &paper.fixed_slot {
                if !slot_index.contains_key(slot_id) {
                    return Err(DataIntegrityError::UnknownFixedSlot {
                        paper_id: paper.id.clone(),
                        slot_id: slot_id.clone(),
                    });
                }
            }
            if let Some(room_id) = &paper.fixed_room {
                if !room_index.contains_key(room_id) {
                    return Err(DataIntegrityError::UnknownFixedRoom {
                        paper_id: paper.id.clone(),
                        room_id: room_id.clone(),
                    });
                }
            }
        }

        let mut unscheduled = BTreeSet::new();
        for paper_id in &snapshot.unscheduled {
            match paper_index.get(paper_id) {
                Some(&idx) => {
                    unscheduled.insert(idx);
                }
                None => return Err(DataIntegrityError::UnknownUnscheduledPaper(paper_id.clone())),
            }
        }

        let mut co_presented = vec![BTreeSet::new(); snapshot.papers.len()];
        for papers in presenter_papers.values() {
            for &a in papers {
                for &b in papers {
                    if a != b {
                        co_presented[a].insert(b);
                    }
                }
            }
        }

        let (slot_overlaps, presenter_conflicts) = slot_conflict_tables(&slots, slot_buffer_ms);

        // A blackout blocks every slot overlapping it in time.
        let mut presenter_blocked: HashMap<&str, BTreeSet<usize>> = HashMap::new();
        for presenter in &snapshot.presenters {
            let blocked = presenter_blocked.entry(presenter.id.as_str()).or_default();
            for slot_id in &presenter.unavailable_slots {
                if let Some(&s) = slot_index.get(slot_id) {
                    blocked.extend(slot_overlaps[s].iter().copied());
                }
            }
        }

        let mut blocked_slots = Vec::with_capacity(snapshot.papers.len());
        let mut compatible_rooms = Vec::with_capacity(snapshot.papers.len());
        let mut compatible_slots = Vec::with_capacity(snapshot.papers.len());
        for paper in &snapshot.papers {
            let blocked: BTreeSet<usize> = paper
                .presenter_ids
                .iter()
                .filter_map(|id| presenter_blocked.get(id.as_str()))
                .flatten()
                .copied()
                .collect();

            let rooms = ranked_rooms(&snapshot.rooms, paper.expected_attendance)
                .into_iter()
                .filter(|&r| room_accepts(paper, &snapshot.rooms[r]))
                .collect();
            let slots_ok = (0..slots.len())
                .filter(|s| !blocked.contains(s) && slot_accepts(paper, &slots[*s]))
                .collect();

            blocked_slots.push(blocked);
            compatible_rooms.push(rooms);
            compatible_slots.push(slots_ok);
        }

        Ok(Self {
            papers: snapshot.papers.clone(),
            presenters: snapshot.presenters.clone(),
            rooms: snapshot.rooms.clone(),
            slots,
            paper_index,
            room_index,
            slot_index,
            presenter_papers,
            co_presented,
            slot_overlaps,
            presenter_conflicts,
            blocked_slots,
            compatible_rooms,
            compatible_slots,
            unscheduled,
            slot_buffer_ms,
        })
    }

    /// All papers, in snapshot order.
    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    /// All presenters, in snapshot order.
    pub fn presenters(&self) -> &[Presenter] {
        &self.presenters
    }

    /// All rooms, in snapshot order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// All slots, chronologically.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Paper at an index.
    pub fn paper(&self, idx: usize) -> &Paper {
        &self.papers[idx]
    }

    /// Room at an index.
    pub fn room(&self, idx: usize) -> &Room {
        &self.rooms[idx]
    }

    /// Slot at an index.
    pub fn slot(&self, idx: usize) -> &Slot {
        &self.slots[idx]
    }

    pub fn paper_idx(&self, id: &str) -> Option<usize> {
        self.paper_index.get(id).copied()
    }

    pub fn room_idx(&self, id: &str) -> Option<usize> {
        self.room_index.get(id).copied()
    }

    pub fn slot_idx(&self, id: &str) -> Option<usize> {
        self.slot_index.get(id).copied()
    }

    /// Papers a presenter co-authors.
    pub fn papers_of_presenter(&self, presenter_id: &str) -> Option<&BTreeSet<usize>> {
        self.presenter_papers.get(presenter_id)
    }

    /// Presenter → co-authored papers, for every presenter with papers.
    pub fn presenter_papers(&self) -> &BTreeMap<String, BTreeSet<usize>> {
        &self.presenter_papers
    }

    /// Papers sharing at least one presenter with `paper`.
    pub fn co_presented(&self, paper: usize) -> &BTreeSet<usize> {
        &self.co_presented[paper]
    }

    /// Slots overlapping `slot` in time (including itself).
    pub fn overlapping_slots(&self, slot: usize) -> &BTreeSet<usize> {
        &self.slot_overlaps[slot]
    }

    /// Whether two slots overlap in time.
    pub fn slots_overlap(&self, a: usize, b: usize) -> bool {
        self.slot_overlaps[a].contains(&b)
    }

    /// Whether two slots cannot share a presenter.
    pub fn presenter_slots_conflict(&self, a: usize, b: usize) -> bool {
        self.presenter_conflicts[a].contains(&b)
    }

    /// Whether a presenter blackout blocks `slot` for `paper`.
    pub fn is_blocked(&self, paper: usize, slot: usize) -> bool {
        self.blocked_slots[paper].contains(&slot)
    }

    /// Rooms that may host `paper`, in candidate order: rooms large
    /// enough by ascending capacity, then undersized rooms by
    /// descending capacity.
    pub fn compatible_rooms(&self, paper: usize) -> &[usize] {
        &self.compatible_rooms[paper]
    }

    /// Slots that may host `paper`, chronologically.
    pub fn compatible_slots(&self, paper: usize) -> &[usize] {
        &self.compatible_slots[paper]
    }

    /// Number of statically compatible (room, slot) cells for `paper`.
    pub fn compatible_cell_count(&self, paper: usize) -> usize {
        self.compatible_rooms[paper].len() * self.compatible_slots[paper].len()
    }

    /// Whether `room` satisfies equipment and room pin for `paper`.
    pub fn room_accepts(&self, paper: usize, room: usize) -> bool {
        room_accepts(&self.papers[paper], &self.rooms[room])
    }

    /// Whether `slot` satisfies duration and slot pin for `paper`
    /// (blackouts not included).
    pub fn slot_accepts(&self, paper: usize, slot: usize) -> bool {
        slot_accepts(&self.papers[paper], &self.slots[slot])
    }

    /// Whether the caller accepts `paper` staying out of the program.
    pub fn is_excused(&self, paper: usize) -> bool {
        self.unscheduled.contains(&paper)
    }

    /// Presenter buffer the model was built with (ms).
    pub fn slot_buffer_ms(&self) -> i64 {
        self.slot_buffer_ms
    }
}

fn index_ids<'a>(
    ids: impl Iterator<Item = &'a String>,
    kind: EntityKind,
) -> Result<HashMap<String, usize>, DataIntegrityError> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(DataIntegrityError::DuplicateId {
                kind,
                id: id.clone(),
            });
        }
    }
    Ok(index)
}

/// Pairwise slot tables: strict overlap and presenter conflict.
fn slot_conflict_tables(
    slots: &[Slot],
    buffer_ms: i64,
) -> (Vec<BTreeSet<usize>>, Vec<BTreeSet<usize>>) {
    let mut overlaps = vec![BTreeSet::new(); slots.len()];
    let mut conflicts = vec![BTreeSet::new(); slots.len()];
    for (i, a) in slots.iter().enumerate() {
        for (j, b) in slots.iter().enumerate() {
            if a.overlaps(b) {
                overlaps[i].insert(j);
            }
            if a.overlaps_with_buffer(b, buffer_ms) {
                conflicts[i].insert(j);
            }
        }
    }
    (overlaps, conflicts)
}

fn ranked_rooms(rooms: &[Room], attendance: u32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rooms.len()).collect();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (&rooms[a], &rooms[b]);
        match (ra.fits(attendance), rb.fits(attendance)) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (true, true) => ra.capacity.cmp(&rb.capacity).then_with(|| ra.id.cmp(&rb.id)),
            (false, false) => rb.capacity.cmp(&ra.capacity).then_with(|| ra.id.cmp(&rb.id)),
        }
    });
    order
}

fn room_accepts(paper: &Paper, room: &Room) -> bool {
    room.provides(&paper.required_equipment)
        && paper.fixed_room.as_deref().is_none_or(|id| id == room.id)
}

fn slot_accepts(paper: &Paper, slot: &Slot) -> bool {
    paper.duration_ms <= slot.duration_ms
        && paper.fixed_slot.as_deref().is_none_or(|id| id == slot.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Paper, Presenter, Room, Slot, Snapshot};

    const MIN: i64 = 60_000;

    fn sample_snapshot() -> Snapshot {
        Snapshot::new()
            .with_presenter(Presenter::new("alice").unavailable_in("S1"))
            .with_presenter(Presenter::new("bob"))
            .with_room(Room::new("big", 200).with_equipment("projector"))
            .with_room(Room::new("small", 20))
            .with_room(Room::new("mid", 60))
            .with_slot(Slot::new("S2", 30 * MIN, 30 * MIN))
            .with_slot(Slot::new("S1", 0, 30 * MIN))
            .with_slot(Slot::new("S3", 60 * MIN, 20 * MIN))
            .with_paper(
                Paper::new("P1", 25 * MIN)
                    .with_presenter("alice")
                    .with_presenter("bob"),
            )
            .with_paper(Paper::new("P2", 10 * MIN).with_presenter("bob").with_attendance(50))
            .with_paper(
                Paper::new("P3", 10 * MIN)
                    .with_presenter("alice")
                    .with_equipment("projector"),
            )
    }

    #[test]
    fn test_slots_sorted_chronologically() {
        let m = ConstraintModel::build(&sample_snapshot(), 0).unwrap();
        let ids: Vec<&str> = m.slots().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S2", "S3"]);
        assert_eq!(m.slot_idx("S3"), Some(2));
    }

    #[test]
    fn test_presenter_papers_and_co_presented() {
        let m = ConstraintModel::build(&sample_snapshot(), 0).unwrap();
        let alice = m.papers_of_presenter("alice").unwrap();
        assert_eq!(alice.iter().copied().collect::<Vec<_>>(), vec![0, 2]);

        // P1 shares alice with P3 and bob with P2
        assert_eq!(m.co_presented(0).len(), 2);
        assert!(m.co_presented(1).contains(&0));
        assert!(!m.co_presented(1).contains(&2));
    }

    #[test]
    fn test_blackout_blocks_slot() {
        let m = ConstraintModel::build(&sample_snapshot(), 0).unwrap();
        let s1 = m.slot_idx("S1").unwrap();
        assert!(m.is_blocked(0, s1)); // alice
        assert!(!m.is_blocked(1, s1)); // bob only
        assert!(!m.compatible_slots(2).contains(&s1));
    }

    #[test]
    fn test_blackout_blocks_overlapping_slot() {
        let snap = Snapshot::new()
            .with_presenter(Presenter::new("a").unavailable_in("morning"))
            .with_room(Room::new("R", 10))
            .with_slot(Slot::new("morning", 0, 60 * MIN))
            .with_slot(Slot::new("inner", 15 * MIN, 15 * MIN))
            .with_slot(Slot::new("later", 60 * MIN, 15 * MIN))
            .with_paper(Paper::new("P", 10 * MIN).with_presenter("a"));
        let m = ConstraintModel::build(&snap, 0).unwrap();
        assert_eq!(m.compatible_slots(0), &[m.slot_idx("later").unwrap()]);
    }

    #[test]
    fn test_compatible_rooms_ranked() {
        let m = ConstraintModel::build(&sample_snapshot(), 0).unwrap();
        let ids = |p: usize| -> Vec<&str> {
            m.compatible_rooms(p)
                .iter()
                .map(|&r| m.room(r).id.as_str())
                .collect()
        };
        // No attendance: ascending capacity
        assert_eq!(ids(0), vec!["small", "mid", "big"]);
        // Attendance 50: sufficient rooms first
        assert_eq!(ids(1), vec!["mid", "big", "small"]);
        // Projector only in big
        assert_eq!(ids(2), vec!["big"]);
    }

    #[test]
    fn test_duration_filters_slots() {
        let m = ConstraintModel::build(&sample_snapshot(), 0).unwrap();
        // P1 is 25 min; S3 is only 20 min; S1 blocked by alice
        let ids: Vec<&str> = m
            .compatible_slots(0)
            .iter()
            .map(|&s| m.slot(s).id.as_str())
            .collect();
        assert_eq!(ids, vec!["S2"]);
        assert_eq!(m.compatible_cell_count(0), 3);
    }

    #[test]
    fn test_slot_buffer_conflicts() {
        let m = ConstraintModel::build(&sample_snapshot(), 5 * MIN).unwrap();
        let (s1, s2, s3) = (0, 1, 2);
        assert!(!m.slots_overlap(s1, s2));
        assert!(m.presenter_slots_conflict(s1, s2));
        assert!(m.presenter_slots_conflict(s2, s3));
        assert!(!m.presenter_slots_conflict(s1, s3));
        assert_eq!(m.slot_buffer_ms(), 5 * MIN);
    }

    #[test]
    fn test_fixed_overrides_filter() {
        let snap = sample_snapshot().with_paper(
            Paper::new("P4", 5 * MIN)
                .with_fixed_slot("S3")
                .with_fixed_room("mid"),
        );
        let m = ConstraintModel::build(&snap, 0).unwrap();
        let p4 = m.paper_idx("P4").unwrap();
        assert_eq!(m.compatible_slots(p4), &[m.slot_idx("S3").unwrap()]);
        assert_eq!(m.compatible_rooms(p4), &[m.room_idx("mid").unwrap()]);
    }

    #[test]
    fn test_unknown_presenter() {
        let snap = sample_snapshot().with_paper(Paper::new("P9", MIN).with_presenter("ghost"));
        let err = ConstraintModel::build(&snap, 0).unwrap_err();
        assert_eq!(
            err,
            DataIntegrityError::UnknownPresenter {
                paper_id: "P9".into(),
                presenter_id: "ghost".into()
            }
        );
    }

    #[test]
    fn test_unknown_fixed_slot_and_room() {
        let snap = sample_snapshot().with_paper(Paper::new("P9", MIN).with_fixed_slot("S99"));
        assert!(matches!(
            ConstraintModel::build(&snap, 0),
            Err(DataIntegrityError::UnknownFixedSlot { .. })
        ));

        let snap = sample_snapshot().with_paper(Paper::new("P9", MIN).with_fixed_room("attic"));
        assert!(matches!(
            ConstraintModel::build(&snap, 0),
            Err(DataIntegrityError::UnknownFixedRoom { .. })
        ));
    }

    #[test]
    fn test_unknown_blackout_slot() {
        let snap = sample_snapshot().with_presenter(Presenter::new("carol").unavailable_in("S0"));
        assert!(matches!(
            ConstraintModel::build(&snap, 0),
            Err(DataIntegrityError::UnknownBlackoutSlot { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids() {
        let snap = sample_snapshot().with_room(Room::new("big", 1));
        let err = ConstraintModel::build(&snap, 0).unwrap_err();
        assert_eq!(
            err,
            DataIntegrityError::DuplicateId {
                kind: EntityKind::Room,
                id: "big".into()
            }
        );
    }

    #[test]
    fn test_invalid_durations() {
        let snap = sample_snapshot().with_slot(Slot::new("S0", 0, 0));
        assert!(matches!(
            ConstraintModel::build(&snap, 0),
            Err(DataIntegrityError::InvalidDuration {
                kind: EntityKind::Slot,
                ..
            })
        ));

        let snap = sample_snapshot().with_paper(Paper::new("P0", -5));
        assert!(matches!(
            ConstraintModel::build(&snap, 0),
            Err(DataIntegrityError::InvalidDuration {
                kind: EntityKind::Paper,
                ..
            })
        ));
    }

    #[test]
    fn test_slot_end_out_of_range() {
        let snap = sample_snapshot().with_slot(Slot::new("late", i64::MAX - 10, 100));
        assert_eq!(
            ConstraintModel::build(&snap, 0).unwrap_err(),
            DataIntegrityError::SlotOutOfRange {
                id: "late".into(),
                start_ms: i64::MAX - 10,
                duration_ms: 100,
            }
        );
    }

    #[test]
    fn test_max_buffer_conflicts_every_slot_pair() {
        let m = ConstraintModel::build(&sample_snapshot(), i64::MAX).unwrap();
        for a in 0..m.slots().len() {
            for b in 0..m.slots().len() {
                assert!(m.presenter_slots_conflict(a, b));
            }
        }
    }

    #[test]
    fn test_unscheduled_exceptions() {
        let snap = sample_snapshot().with_unscheduled("P2");
        let m = ConstraintModel::build(&snap, 0).unwrap();
        assert!(m.is_excused(1));
        assert!(!m.is_excused(0));

        let snap = sample_snapshot().with_unscheduled("P404");
        assert_eq!(
            ConstraintModel::build(&snap, 0).unwrap_err(),
            DataIntegrityError::UnknownUnscheduledPaper("P404".into())
        );
    }

    #[test]
    fn test_empty_snapshot() {
        let m = ConstraintModel::build(&Snapshot::new(), 0).unwrap();
        assert!(m.papers().is_empty());
        assert!(m.slots().is_empty());
    }
}
