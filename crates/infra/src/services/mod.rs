//! Application services.
//!
//! Each service holds a shared store handle plus the injected clock, and turns
//! validated domain input into store calls. No HTTP types appear here.

mod accounts;
mod attendance;
mod broadcast;
mod error;
mod roster;

pub use accounts::{AccountService, LoginOutcome};
pub use attendance::AttendanceService;
pub use broadcast::{ActiveMessages, BroadcastService};
pub use error::ServiceError;
pub use roster::RosterService;
