//! Exam seat allocation.
//!
//! Seats candidates on two-seat desks across classrooms so that no desk ever
//! holds two students of the same conflict class (paper plus semester), then
//! audits the result and lays each room out as a printable grid.
//!
//! Every entry point is a pure function of its inputs:
//! [`allocate`], [`validate`] and [`layout_for_print`].

pub mod config;
pub mod data;
pub mod error;
pub mod layout;
pub mod plan;
pub mod report;
pub mod roll;
pub mod server;
pub mod solver;
pub mod strategy;
pub mod validate;

pub use data::{Allocation, AllocationWarning, Assignment, Classroom, ConflictClass, Side, Student};
pub use error::SeatingError;
pub use layout::DeskLayout;
pub use plan::{SeatingPlan, Snapshot, plan};
pub use report::{PrintLayout, SummaryRow, layout_for_print};
pub use solver::{AllocatorOptions, InvalidRoomPolicy, allocate, allocate_with};
pub use strategy::Strategy;
pub use validate::{ValidationReport, validate};
