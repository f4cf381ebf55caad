//! `classroll-core`: shared building blocks.
//!
//! Identifiers, the domain error model, and the clock/day-boundary helpers used by
//! both attendance marking and the roster. No IO lives here.

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;

pub use clock::{calendar_day, start_of_day, Clock, DayBoundary, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AttendanceId, MessageId, UserId};
