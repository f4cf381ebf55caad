//! Attendance domain module.
//!
//! Deterministic rules for daily attendance marks and the per-student roster
//! view (no IO, no HTTP, no storage).

pub mod record;
pub mod roster;

pub use record::{AttendanceRecord, AttendanceStatus, MarkBatch, MarkEntry};
pub use roster::{RosterEntry, RosterStatus, NOT_MARKED};
