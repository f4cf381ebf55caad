//! Record store abstractions.
//!
//! Users, attendance marks and messages are independent collections linked by
//! identifier. Services only see these traits, so the in-memory store can stand
//! in for Postgres in tests and local runs.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use classroll_attendance::AttendanceRecord;
use classroll_auth::User;
use classroll_broadcast::Message;
use classroll_core::UserId;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness rule rejected the write. Carries the offending key
    /// (email, roll number).
    #[error("uniqueness conflict on '{0}'")]
    Conflict(String),

    /// A stored row could not be mapped back into a domain value.
    #[error("corrupt record: {0}")]
    Decode(String),

    /// The store could not execute the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// An attendance record together with the calendar day it occupies.
///
/// `(record.student_id, day)` is unique across the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyMark {
    pub day: NaiveDate,
    pub record: AttendanceRecord,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Conflict` if the email, or a student's roll
    /// number, is already taken.
    async fn insert_user(&self, user: User) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_student_by_roll_number(&self, roll_number: &str) -> StoreResult<Option<User>>;

    /// All students, in natural enumeration order.
    async fn list_students(&self) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Any record for `student_id` created at or after `since`.
    async fn find_attendance_since(
        &self,
        student_id: UserId,
        since: DateTime<Utc>,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Insert every mark or none. Fails with `Conflict(roll_number)` if any
    /// `(student, day)` slot is already taken, including by another mark in the
    /// same batch.
    async fn insert_attendance_batch(&self, marks: Vec<DailyMark>) -> StoreResult<Vec<AttendanceRecord>>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(&self, message: Message) -> StoreResult<Message>;

    /// Messages with `start_time <= now < start_time + duration`, newest first.
    async fn list_active_messages(&self, now: DateTime<Utc>) -> StoreResult<Vec<Message>>;
}

/// Everything the API needs from a single backing store.
pub trait RecordStore: UserStore + AttendanceStore + MessageStore {}

impl<T> RecordStore for T where T: UserStore + AttendanceStore + MessageStore {}
