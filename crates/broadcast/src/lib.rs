//! Broadcast message domain module.
//!
//! A message is visible for a fixed window that opens at its start time. Its
//! lifecycle state is derived from the clock, never stored.

pub mod message;

pub use message::{Message, MessageState, NewMessage, MAX_DURATION_MINUTES};
