//! Store adapter boundary.
//!
//! The scheduler never touches storage. A [`ProgramStore`] loads the
//! snapshot, serializes runs with a run token, and persists schedules.
//! [`run_program`] and [`submit_edit`] drive a store through one run:
//!
//! ```text
//! begin_run → load_snapshot → ConstraintModel → engine / validator → persist_schedule → end_run
//! ```
//!
//! A successful run also reports how the new schedule differs from the
//! one persisted before it.
//!
//! Only one run may hold the token at a time; a second `begin_run`
//! fails with [`StoreError::RunInProgress`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::constraints::ConstraintModel;
use crate::error::{RunError, StoreError};
use crate::models::{Schedule, ScheduleDiff, Snapshot, Violation};
use crate::scheduler::{ProgramScheduler, SchedulingFailure};
use crate::validation::validate;

/// Token of the run currently allowed to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunToken(pub u64);

/// Persistence boundary for the program.
pub trait ProgramStore {
    /// Loads the current snapshot.
    fn load_snapshot(&self) -> Result<Snapshot, StoreError>;

    /// Loads the last persisted schedule, if any.
    fn load_schedule(&self) -> Result<Option<Schedule>, StoreError>;

    /// Claims the single writer slot.
    fn begin_run(&self) -> Result<RunToken, StoreError>;

    /// Persists a schedule on behalf of the active run.
    fn persist_schedule(&self, run: RunToken, schedule: &Schedule) -> Result<(), StoreError>;

    /// Releases the writer slot. Releasing a stale token is a no-op.
    fn end_run(&self, run: RunToken);
}

/// Result of a scheduling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A full schedule was computed and persisted.
    Scheduled {
        schedule: Schedule,
        /// Changes against the previously persisted schedule.
        changes: ScheduleDiff,
    },
    /// No feasible schedule; nothing was persisted.
    Infeasible(SchedulingFailure),
}

/// Result of submitting an edited schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The schedule was valid and persisted.
    Persisted,
    /// The schedule violates hard constraints; nothing was persisted.
    Rejected(Vec<Violation>),
}

/// Computes a schedule from the store's snapshot and persists it.
///
/// Integrity and store errors abort the run. Infeasibility is returned
/// as [`RunOutcome::Infeasible`].
pub fn run_program<S: ProgramStore + ?Sized>(
    store: &S,
    config: &SchedulerConfig,
) -> Result<RunOutcome, RunError> {
    config.validate()?;
    let run = store.begin_run()?;
    info!("Run {} started", run.0);
    let result = scheduling_run(store, run, config);
    store.end_run(run);
    match &result {
        Ok(RunOutcome::Scheduled { changes, .. }) => info!(
            "Run {} finished: {} added, {} removed, {} moved",
            run.0,
            changes.added.len(),
            changes.removed.len(),
            changes.moved.len()
        ),
        Ok(RunOutcome::Infeasible(_)) => info!("Run {} finished without a schedule", run.0),
        Err(e) => warn!("Run {} aborted: {}", run.0, e),
    }
    result
}

fn scheduling_run<S: ProgramStore + ?Sized>(
    store: &S,
    run: RunToken,
    config: &SchedulerConfig,
) -> Result<RunOutcome, RunError> {
    let snapshot = store.load_snapshot()?;
    let model = ConstraintModel::build(&snapshot, config.slot_buffer_ms)?;

    match ProgramScheduler::new()
        .with_config(config.clone())
        .schedule(&model)
    {
        Ok(schedule) => {
            let previous = store.load_schedule()?.unwrap_or_default();
            let changes = schedule.diff_from(&previous);
            store.persist_schedule(run, &schedule)?;
            Ok(RunOutcome::Scheduled { schedule, changes })
        }
        Err(failure) => {
            warn!("Run {} infeasible: {}", run.0, failure);
            Ok(RunOutcome::Infeasible(failure))
        }
    }
}

/// Validates a manually edited schedule and persists it only if valid.
pub fn submit_edit<S: ProgramStore + ?Sized>(
    store: &S,
    schedule: &Schedule,
    config: &SchedulerConfig,
) -> Result<EditOutcome, RunError> {
    config.validate()?;
    let run = store.begin_run()?;
    let result = edit_run(store, run, schedule, config);
    store.end_run(run);
    if let Err(e) = &result {
        warn!("Edit run {} aborted: {}", run.0, e);
    }
    result
}

fn edit_run<S: ProgramStore + ?Sized>(
    store: &S,
    run: RunToken,
    schedule: &Schedule,
    config: &SchedulerConfig,
) -> Result<EditOutcome, RunError> {
    let snapshot = store.load_snapshot()?;
    let model = ConstraintModel::build(&snapshot, config.slot_buffer_ms)?;
    let violations = validate(schedule, &model);
    if !violations.is_empty() {
        warn!(
            "Edit rejected in run {} with {} violation(s)",
            run.0,
            violations.len()
        );
        return Ok(EditOutcome::Rejected(violations));
    }
    store.persist_schedule(run, schedule)?;
    info!("Edit persisted in run {}", run.0);
    Ok(EditOutcome::Persisted)
}

/// Single-writer token shared by the bundled stores.
#[derive(Debug, Default)]
pub struct RunLock {
    active: Mutex<Option<u64>>,
    next: AtomicU64,
}

impl RunLock {
    /// Creates an idle lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the token state, recovering it from a poisoned mutex.
    fn state(&self) -> MutexGuard<'_, Option<u64>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the lock, failing if another run holds it.
    pub fn begin(&self) -> Result<RunToken, StoreError> {
        let mut active = self.state();
        if let Some(current) = *active {
            return Err(StoreError::RunInProgress { active: current });
        }
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        *active = Some(id);
        debug!("Run token {} issued", id);
        Ok(RunToken(id))
    }

    /// Fails unless `run` is the active token.
    pub fn check(&self, run: RunToken) -> Result<(), StoreError> {
        if *self.state() == Some(run.0) {
            Ok(())
        } else {
            Err(StoreError::StaleRun { run: run.0 })
        }
    }

    /// Releases the lock if `run` holds it.
    pub fn end(&self, run: RunToken) {
        let mut active = self.state();
        if *active == Some(run.0) {
            *active = None;
        }
    }

    /// Token currently holding the lock.
    pub fn active(&self) -> Option<RunToken> {
        (*self.state()).map(RunToken)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Backend("store mutex poisoned".to_string())
}

/// In-process store holding one snapshot and the last persisted schedule.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Snapshot>,
    schedule: Mutex<Option<Schedule>>,
    lock: RunLock,
}

impl MemoryStore {
    /// Creates a store over a snapshot.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            schedule: Mutex::new(None),
            lock: RunLock::new(),
        }
    }

    /// Replaces the snapshot (e.g., after an administrative edit).
    pub fn replace_snapshot(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        *self.snapshot.lock().map_err(poisoned)? = snapshot;
        Ok(())
    }

    /// The store's run lock.
    pub fn run_lock(&self) -> &RunLock {
        &self.lock
    }
}

impl ProgramStore for MemoryStore {
    fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.snapshot.lock().map_err(poisoned)?.clone())
    }

    fn load_schedule(&self) -> Result<Option<Schedule>, StoreError> {
        Ok(self.schedule.lock().map_err(poisoned)?.clone())
    }

    fn begin_run(&self) -> Result<RunToken, StoreError> {
        self.lock.begin()
    }

    fn persist_schedule(&self, run: RunToken, schedule: &Schedule) -> Result<(), StoreError> {
        self.lock.check(run)?;
        *self.schedule.lock().map_err(poisoned)? = Some(schedule.clone());
        debug!(
            "Run {} persisted {} assignment(s) in memory",
            run.0,
            schedule.assignment_count()
        );
        Ok(())
    }

    fn end_run(&self, run: RunToken) {
        self.lock.end(run);
    }
}

/// Store backed by JSON files: a snapshot file and a schedule file.
#[derive(Debug)]
pub struct JsonFileStore {
    snapshot_path: PathBuf,
    schedule_path: PathBuf,
    lock: RunLock,
}

impl JsonFileStore {
    /// Creates a store reading `snapshot_path` and writing `schedule_path`.
    pub fn new(snapshot_path: impl Into<PathBuf>, schedule_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            schedule_path: schedule_path.into(),
            lock: RunLock::new(),
        }
    }

    /// Path of the snapshot file.
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Path of the schedule file.
    pub fn schedule_path(&self) -> &Path {
        &self.schedule_path
    }

    /// Writes a snapshot file.
    pub fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        write_json(&self.snapshot_path, snapshot)
    }
}

impl ProgramStore for JsonFileStore {
    fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        let content = fs::read_to_string(&self.snapshot_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn load_schedule(&self) -> Result<Option<Schedule>, StoreError> {
        if !self.schedule_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.schedule_path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn begin_run(&self) -> Result<RunToken, StoreError> {
        self.lock.begin()
    }

    fn persist_schedule(&self, run: RunToken, schedule: &Schedule) -> Result<(), StoreError> {
        self.lock.check(run)?;
        write_json(&self.schedule_path, schedule)?;
        debug!("Run {} wrote {}", run.0, self.schedule_path.display());
        Ok(())
    }

    fn end_run(&self, run: RunToken) {
        self.lock.end(run);
    }
}

/// Writes JSON through a sibling temp file so readers never see a
/// half-written document.
fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
