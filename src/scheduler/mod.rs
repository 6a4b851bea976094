//! Program scheduler and KPI evaluation.
//!
//! # Algorithm
//!
//! `ProgramScheduler` is a fail-first greedy placer with bounded
//! backtracking. Exact assignment is NP-hard in general; the engine
//! trades optimality for a fast, reproducible and explainable program.
//! Soft objectives only reorder candidates that already satisfy every
//! hard constraint.
//!
//! # KPI
//!
//! `ProgramKpi` reports track spread, room utilization, and undersized
//! room assignments.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for CSPs"

mod engine;
mod failure;
mod kpi;
pub mod ordering;

pub use engine::{schedule, ProgramScheduler};
pub use failure::{ConstraintClass, SchedulingFailure, UnplacedPaper};
pub use kpi::ProgramKpi;
