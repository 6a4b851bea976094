//! Greedy program scheduler with bounded backtracking.
//!
//! # Algorithm
//!
//! 1. Order papers fail-first (see [`ordering`](super::ordering)).
//! 2. Place each paper in its lowest-keyed feasible (room, slot) cell.
//!    A cell is feasible when the room is free in every overlapping slot
//!    and no co-presented paper sits in a conflicting slot. Equipment,
//!    duration, pins and blackouts are already folded into the model's
//!    compatible rooms and slots.
//! 3. When a paper is stuck, undo the most recently placed paper that
//!    blocks one of its cells, exclude that paper from its previous slot,
//!    place the stuck paper, then re-queue the undone one. Each undo
//!    spends one unit of `max_backtracks`.
//! 4. With no backtrack available, a stuck paper first drops its own
//!    exclusions and retries; if still stuck it is recorded unplaceable
//!    and the run continues so every unplaceable paper is reported.
//! 5. The finished schedule is re-checked by the validator.
//!
//! Backtracking is plain iteration over an explicit placement stack.
//!
//! # Complexity
//! O(b · n · r · s · k) where b = backtracking bound + 1, n = papers,
//! r = rooms, s = slots, k = co-presented papers per paper.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use tracing::{debug, error, info, warn};

use super::failure::{ConstraintClass, SchedulingFailure, UnplacedPaper};
use super::kpi::ProgramKpi;
use super::ordering::{paper_order, penalty, CandidateKey};
use crate::config::SchedulerConfig;
use crate::constraints::ConstraintModel;
use crate::error::ScheduleError;
use crate::models::{Assignment, Schedule, Snapshot};
use crate::validation::validate;

/// Conference program scheduler.
///
/// Holds only configuration; every call to [`schedule`](Self::schedule)
/// works on fresh state, so one instance can serve many threads.
///
/// # Example
///
/// ```
/// use conf_program::constraints::ConstraintModel;
/// use conf_program::models::{Paper, Presenter, Room, Slot, Snapshot};
/// use conf_program::scheduler::ProgramScheduler;
///
/// let snapshot = Snapshot::new()
///     .with_presenter(Presenter::new("ada"))
///     .with_room(Room::new("R1", 50))
///     .with_slot(Slot::new("S1", 0, 1_800_000))
///     .with_paper(Paper::new("P1", 1_200_000).with_presenter("ada"));
/// let model = ConstraintModel::build(&snapshot, 0).unwrap();
///
/// let schedule = ProgramScheduler::new().schedule(&model).unwrap();
/// assert_eq!(schedule.assignment_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProgramScheduler {
    config: SchedulerConfig,
}

impl ProgramScheduler {
    /// Creates a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Assigns every schedulable paper to a (room, slot) pair.
    ///
    /// Returns the full schedule, or a [`SchedulingFailure`] naming each
    /// paper that could not be placed within the backtracking bound.
    pub fn schedule(&self, model: &ConstraintModel) -> Result<Schedule, SchedulingFailure> {
        info!(
            "Scheduling {} papers into {} rooms x {} slots (max_backtracks={})",
            model.papers().len(),
            model.rooms().len(),
            model.slots().len(),
            self.config.max_backtracks
        );

        let mut state = ProgramState::new(model);
        let mut exclusions = Exclusions::default();
        let mut pending: VecDeque<usize> = paper_order(model).into();
        let mut unplaced = Vec::new();
        let mut backtracks = 0usize;

        while let Some(p) = pending.pop_front() {
            if let Some(key) = self.best_cell(&state, &exclusions, p) {
                let room = model.compatible_rooms(p)[key.room_rank];
                state.place(p, room, key.slot);
                continue;
            }

            if backtracks < self.config.max_backtracks {
                let undone = state
                    .latest_blocker(p, &exclusions)
                    .and_then(|victim| state.undo(victim).map(|(r, s)| (victim, r, s)));
                if let Some((victim, room, slot)) = undone {
                    backtracks += 1;
                    warn!(
                        "Backtrack {}/{}: paper {} stuck, undoing {} from room {} slot {}",
                        backtracks,
                        self.config.max_backtracks,
                        model.paper(p).id,
                        model.paper(victim).id,
                        model.room(room).id,
                        model.slot(slot).id
                    );
                    exclusions.exclude(model, victim, room, slot);
                    pending.push_front(victim);
                    pending.push_front(p);
                    continue;
                }
            }

            if exclusions.release(p) {
                debug!("Paper {} retries without exclusions", model.paper(p).id);
                pending.push_front(p);
                continue;
            }

            let entry = diagnose(&state, p);
            warn!(
                "Paper {} unplaceable ({}): {}",
                entry.paper_id, entry.class, entry.detail
            );
            unplaced.push(entry);
        }

        if !unplaced.is_empty() {
            return Err(SchedulingFailure {
                unplaced,
                violations: Vec::new(),
            });
        }

        let schedule = state.into_schedule();
        let violations = validate(&schedule, model);
        if !violations.is_empty() {
            error!(
                "Engine output failed self-check with {} violation(s)",
                violations.len()
            );
            return Err(SchedulingFailure {
                unplaced: Vec::new(),
                violations,
            });
        }

        let kpi = ProgramKpi::calculate(&schedule, model);
        info!(
            "Scheduled {} papers with {} backtrack(s); track spread {}, {} undersized",
            kpi.scheduled_papers, backtracks, kpi.track_spread, kpi.undersized_assignments
        );
        Ok(schedule)
    }

    /// Lowest-keyed feasible cell for `paper`, if any.
    fn best_cell(
        &self,
        state: &ProgramState<'_>,
        exclusions: &Exclusions,
        paper: usize,
    ) -> Option<CandidateKey> {
        let model = state.model;
        let track_rooms = state.track_rooms.get(model.paper(paper).track.as_str());
        let mut best: Option<CandidateKey> = None;

        for &slot in model.compatible_slots(paper) {
            for (room_rank, &room) in model.compatible_rooms(paper).iter().enumerate() {
                if exclusions.is_excluded(paper, room, slot)
                    || state.blocker(paper, room, slot).is_some()
                {
                    continue;
                }
                let key = CandidateKey {
                    penalty: penalty(model, &self.config.objective, paper, room, track_rooms),
                    slot,
                    room_rank,
                };
                if best.is_none_or(|b| key < b) {
                    best = Some(key);
                }
            }
        }
        best
    }
}

/// Builds the model and schedules in one call.
pub fn schedule(snapshot: &Snapshot, config: &SchedulerConfig) -> Result<Schedule, ScheduleError> {
    config.validate()?;
    let model = ConstraintModel::build(snapshot, config.slot_buffer_ms)?;
    let schedule = ProgramScheduler::new()
        .with_config(config.clone())
        .schedule(&model)?;
    Ok(schedule)
}

/// Mutable placement state of one run.
struct ProgramState<'m> {
    model: &'m ConstraintModel,
    /// room → slot → paper
    room_slots: Vec<BTreeMap<usize, usize>>,
    /// paper → (room, slot)
    placed: Vec<Option<(usize, usize)>>,
    /// track → room → papers hosted
    track_rooms: HashMap<&'m str, BTreeMap<usize, usize>>,
    /// Placement order, most recent last.
    stack: Vec<usize>,
}

impl<'m> ProgramState<'m> {
    fn new(model: &'m ConstraintModel) -> Self {
        Self {
            model,
            room_slots: vec![BTreeMap::new(); model.rooms().len()],
            placed: vec![None; model.papers().len()],
            track_rooms: HashMap::new(),
            stack: Vec::new(),
        }
    }

    fn place(&mut self, paper: usize, room: usize, slot: usize) {
        let model = self.model;
        debug!(
            "Placed paper {} in room {} at slot {}",
            model.paper(paper).id,
            model.room(room).id,
            model.slot(slot).id
        );
        self.room_slots[room].insert(slot, paper);
        self.placed[paper] = Some((room, slot));
        *self
            .track_rooms
            .entry(model.paper(paper).track.as_str())
            .or_default()
            .entry(room)
            .or_insert(0) += 1;
        self.stack.push(paper);
    }

    /// Removes a placement and returns the cell it occupied.
    fn undo(&mut self, paper: usize) -> Option<(usize, usize)> {
        let model = self.model;
        let (room, slot) = self.placed[paper].take()?;
        self.room_slots[room].remove(&slot);
        self.stack.retain(|&p| p != paper);

        let track = model.paper(paper).track.as_str();
        if let Some(rooms) = self.track_rooms.get_mut(track) {
            if let Some(count) = rooms.get_mut(&room) {
                *count -= 1;
                if *count == 0 {
                    rooms.remove(&room);
                }
            }
        }
        Some((room, slot))
    }

    /// A placed paper preventing `paper` from taking (room, slot).
    ///
    /// Checks room double-booking across overlapping slots, then
    /// presenter conflicts with co-presented papers.
    fn blocker(&self, paper: usize, room: usize, slot: usize) -> Option<usize> {
        let model = self.model;
        for other in model.overlapping_slots(slot) {
            if let Some(&occupant) = self.room_slots[room].get(other) {
                return Some(occupant);
            }
        }
        self.presenter_blocker(paper, slot)
    }

    fn presenter_blocker(&self, paper: usize, slot: usize) -> Option<usize> {
        self.model.co_presented(paper).iter().copied().find(|&q| {
            self.placed[q].is_some_and(|(_, s)| self.model.presenter_slots_conflict(slot, s))
        })
    }

    /// The most recently placed paper blocking any non-excluded
    /// compatible cell of `paper`.
    fn latest_blocker(&self, paper: usize, exclusions: &Exclusions) -> Option<usize> {
        let model = self.model;
        let mut blockers = BTreeSet::new();
        for &slot in model.compatible_slots(paper) {
            for &room in model.compatible_rooms(paper) {
                if exclusions.is_excluded(paper, room, slot) {
                    continue;
                }
                for other in model.overlapping_slots(slot) {
                    if let Some(&occupant) = self.room_slots[room].get(other) {
                        blockers.insert(occupant);
                    }
                }
                for &q in model.co_presented(paper) {
                    if self.placed[q].is_some_and(|(_, s)| model.presenter_slots_conflict(slot, s)) {
                        blockers.insert(q);
                    }
                }
            }
        }
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|p| blockers.contains(p))
    }

    fn into_schedule(self) -> Schedule {
        let model = self.model;
        let mut cells: Vec<(usize, &str, usize)> = self
            .placed
            .iter()
            .enumerate()
            .filter_map(|(p, cell)| cell.map(|(r, s)| (s, model.room(r).id.as_str(), p)))
            .collect();
        cells.sort_unstable();

        Schedule::from_assignments(
            cells
                .into_iter()
                .map(|(s, room_id, p)| Assignment::new(&model.paper(p).id, room_id, &model.slot(s).id))
                .collect(),
        )
    }
}

/// Cells papers may not retake after being undone.
#[derive(Debug, Default)]
struct Exclusions {
    slots: HashMap<usize, BTreeSet<usize>>,
    cells: HashMap<usize, BTreeSet<(usize, usize)>>,
}

impl Exclusions {
    /// Excludes `paper` from its previous slot, or from its previous
    /// cell when the slot is pinned.
    fn exclude(&mut self, model: &ConstraintModel, paper: usize, room: usize, slot: usize) {
        if model.paper(paper).is_fixed() {
            self.cells.entry(paper).or_default().insert((room, slot));
        } else {
            self.slots.entry(paper).or_default().insert(slot);
        }
    }

    fn is_excluded(&self, paper: usize, room: usize, slot: usize) -> bool {
        self.slots.get(&paper).is_some_and(|s| s.contains(&slot))
            || self.cells.get(&paper).is_some_and(|c| c.contains(&(room, slot)))
    }

    /// Drops all exclusions of `paper`. Returns whether any existed.
    fn release(&mut self, paper: usize) -> bool {
        let had_slots = self.slots.remove(&paper).is_some();
        let had_cells = self.cells.remove(&paper).is_some();
        had_slots || had_cells
    }
}

/// Explains why `paper` cannot be placed in the current state.
fn diagnose(state: &ProgramState<'_>, paper: usize) -> UnplacedPaper {
    let model = state.model;
    let p = model.paper(paper);
    let entry = |class, detail: String| UnplacedPaper {
        paper_id: p.id.clone(),
        class,
        detail,
    };

    if model.compatible_rooms(paper).is_empty() {
        let detail = match &p.fixed_room {
            Some(room) if model.room_idx(room).is_some_and(|r| !model.room_accepts(paper, r)) => {
                format!("pinned room '{room}' lacks required equipment {:?}", p.required_equipment)
            }
            _ => format!("no room provides equipment {:?}", p.required_equipment),
        };
        return entry(ConstraintClass::NoRoom, detail);
    }

    if model.compatible_slots(paper).is_empty() {
        let fits = (0..model.slots().len()).filter(|&s| model.slot_accepts(paper, s)).count();
        let detail = if fits == 0 {
            match &p.fixed_slot {
                Some(slot) => format!("pinned slot '{slot}' is shorter than {}ms", p.duration_ms),
                None => format!("no slot is long enough for {}ms", p.duration_ms),
            }
        } else {
            format!("presenter blackouts cover all {fits} slot(s) long enough")
        };
        return entry(ConstraintClass::NoSlot, detail);
    }

    // Statically possible: find what blocks it now.
    for &slot in model.compatible_slots(paper) {
        let room_free = model.compatible_rooms(paper).iter().any(|&room| {
            model
                .overlapping_slots(slot)
                .iter()
                .all(|other| !state.room_slots[room].contains_key(other))
        });
        if room_free {
            if let Some(q) = state.presenter_blocker(paper, slot) {
                return entry(
                    ConstraintClass::PresenterConflict,
                    format!(
                        "shares a presenter with '{}'; a room is free in slot '{}' but the slots conflict",
                        model.paper(q).id,
                        model.slot(slot).id
                    ),
                );
            }
        }
    }

    entry(
        ConstraintClass::NoRoom,
        format!(
            "all {} compatible room(s) are booked in all {} compatible slot(s)",
            model.compatible_rooms(paper).len(),
            model.compatible_slots(paper).len()
        ),
    )
}
