//! Conference program scheduling.
//!
//! Assigns accepted papers to (room, time slot) cells so that no room is
//! double-booked, no presenter is in two places at once, and every paper
//! lands in a room with the equipment it needs and a slot long enough
//! to hold it.
//!
//! # Modules
//!
//! - **`models`**: Input and output types: `Paper`, `Presenter`, `Room`,
//!   `Slot`, `Snapshot`, `Schedule`, `Assignment`, `Violation`
//! - **`constraints`**: `ConstraintModel`, the resolved, indexed view of a snapshot
//! - **`scheduler`**: Greedy placer with bounded backtracking, failure reports, KPIs
//! - **`validation`**: Full hard-constraint check of any schedule
//! - **`store`**: Store boundary, run tokens, `run_program` and `submit_edit`
//! - **`config`**: Scheduler tuning loaded from TOML
//! - **`error`**: Error types
//!
//! # Example
//!
//! ```
//! use conf_program::config::SchedulerConfig;
//! use conf_program::models::{Paper, Presenter, Room, Slot, Snapshot};
//! use conf_program::scheduler::schedule;
//!
//! let snapshot = Snapshot::new()
//!     .with_presenter(Presenter::new("ada"))
//!     .with_room(Room::new("R1", 80))
//!     .with_slot(Slot::new("S1", 0, 1_800_000))
//!     .with_paper(Paper::new("P1", 1_200_000).with_presenter("ada"));
//!
//! let program = schedule(&snapshot, &SchedulerConfig::default()).unwrap();
//! assert_eq!(program.assignment_count(), 1);
//! ```
//!
//! # Logging
//!
//! The crate emits `tracing` events and never installs a subscriber.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

pub mod config;
pub mod constraints;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod validation;

pub use config::{ObjectiveWeights, SchedulerConfig};
pub use constraints::ConstraintModel;
pub use error::{ConfigError, DataIntegrityError, RunError, ScheduleError, StoreError};
pub use scheduler::{ProgramScheduler, SchedulingFailure};
pub use store::{
    run_program, submit_edit, EditOutcome, JsonFileStore, MemoryStore, ProgramStore, RunOutcome,
};
pub use validation::validate;
