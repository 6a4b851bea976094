//! Error types.
//!
//! Integrity errors abort a run. Scheduling failures and validation
//! violations are data; `SchedulingFailure` lives in the scheduler module.

use thiserror::Error;

use crate::scheduler::SchedulingFailure;

/// Kind of entity an integrity error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Paper,
    Presenter,
    Room,
    Slot,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Paper => "paper",
            EntityKind::Presenter => "presenter",
            EntityKind::Room => "room",
            EntityKind::Slot => "slot",
        };
        f.write_str(name)
    }
}

/// A snapshot references something missing or malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("paper '{paper_id}' references unknown presenter '{presenter_id}'")]
    UnknownPresenter {
        paper_id: String,
        presenter_id: String,
    },

    #[error("paper '{paper_id}' is fixed to unknown slot '{slot_id}'")]
    UnknownFixedSlot { paper_id: String, slot_id: String },

    #[error("paper '{paper_id}' is fixed to unknown room '{room_id}'")]
    UnknownFixedRoom { paper_id: String, room_id: String },

    #[error("presenter '{presenter_id}' blacks out unknown slot '{slot_id}'")]
    UnknownBlackoutSlot {
        presenter_id: String,
        slot_id: String,
    },

    #[error("unscheduled exception names unknown paper '{0}'")]
    UnknownUnscheduledPaper(String),

    #[error("slot '{id}' ends past the representable time range (start {start_ms}ms, duration {duration_ms}ms)")]
    SlotOutOfRange {
        id: String,
        start_ms: i64,
        duration_ms: i64,
    },

    #[error("{kind} '{id}' has non-positive duration {duration_ms}ms")]
    InvalidDuration {
        kind: EntityKind,
        id: String,
        duration_ms: i64,
    },
}

/// Error from the one-call scheduling API.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("data integrity: {0}")]
    Integrity(#[from] DataIntegrityError),

    #[error(transparent)]
    Infeasible(#[from] SchedulingFailure),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration loading or validation error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Store adapter error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("scheduling run {active} is already in progress")]
    RunInProgress { active: u64 },

    #[error("run {run} is not the active run")]
    StaleRun { run: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Error from a store-driven scheduling run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("data integrity: {0}")]
    Integrity(#[from] DataIntegrityError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
