use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use classroll_attendance::AttendanceRecord;
use classroll_auth::User;
use classroll_broadcast::Message;
use classroll_core::{Entity, UserId};

use super::{AttendanceStore, DailyMark, MessageStore, StoreError, StoreResult, UserStore};

/// Append-only collection kept in insertion order.
#[derive(Debug)]
struct Collection<E> {
    rows: RwLock<Vec<E>>,
}

impl<E> Default for Collection<E> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<E: Entity + Clone> Collection<E> {
    fn read<T>(&self, f: impl FnOnce(&[E]) -> T) -> StoreResult<T> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(f(&rows))
    }

    fn find(&self, pred: impl Fn(&E) -> bool) -> StoreResult<Option<E>> {
        self.read(|rows| rows.iter().find(|r| pred(r)).cloned())
    }

    fn filter(&self, pred: impl Fn(&E) -> bool) -> StoreResult<Vec<E>> {
        self.read(|rows| rows.iter().filter(|r| pred(r)).cloned().collect())
    }
}

/// In-memory record store for tests/dev.
///
/// Each collection sits behind its own `RwLock`. Attendance keeps a
/// `(student, day)` index so the one-mark-per-day rule holds under concurrent
/// requests, like the unique constraint in Postgres.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    users: Collection<User>,
    attendance: Collection<AttendanceRecord>,
    attendance_days: RwLock<HashSet<(UserId, NaiveDate)>>,
    messages: Collection<Message>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attendance records held (all days).
    pub fn attendance_count(&self) -> usize {
        self.attendance.read(|rows| rows.len()).unwrap_or_default()
    }
}

#[async_trait]
impl UserStore for InMemoryRecordStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let mut rows = self
            .users
            .rows
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        if rows.iter().any(|u| u.id() == user.id()) {
            return Err(StoreError::Conflict(user.id.to_string()));
        }
        if rows.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(user.email));
        }
        if user.is_student() {
            if let Some(roll) = &user.roll_number {
                if rows
                    .iter()
                    .any(|u| u.is_student() && u.roll_number.as_ref() == Some(roll))
                {
                    return Err(StoreError::Conflict(roll.clone()));
                }
            }
        }

        rows.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.users.find(|u| u.email == email)
    }

    async fn find_student_by_roll_number(&self, roll_number: &str) -> StoreResult<Option<User>> {
        self.users
            .find(|u| u.is_student() && u.roll_number.as_deref() == Some(roll_number))
    }

    async fn list_students(&self) -> StoreResult<Vec<User>> {
        self.users.filter(User::is_student)
    }
}

#[async_trait]
impl AttendanceStore for InMemoryRecordStore {
    async fn find_attendance_since(
        &self,
        student_id: UserId,
        since: DateTime<Utc>,
    ) -> StoreResult<Option<AttendanceRecord>> {
        self.attendance
            .find(|r| r.student_id == student_id && r.created_at >= since)
    }

    async fn insert_attendance_batch(&self, marks: Vec<DailyMark>) -> StoreResult<Vec<AttendanceRecord>> {
        // Lock order: index, then rows.
        let mut days = self
            .attendance_days
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        let mut rows = self
            .attendance
            .rows
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let mut claimed = HashSet::with_capacity(marks.len());
        for m in &marks {
            let key = (m.record.student_id, m.day);
            if days.contains(&key) || !claimed.insert(key) {
                return Err(StoreError::Conflict(m.record.roll_number.clone()));
            }
        }

        days.extend(claimed);
        let records: Vec<AttendanceRecord> = marks.into_iter().map(|m| m.record).collect();
        rows.extend(records.iter().cloned());
        Ok(records)
    }
}

#[async_trait]
impl MessageStore for InMemoryRecordStore {
    async fn insert_message(&self, message: Message) -> StoreResult<Message> {
        let mut rows = self
            .messages
            .rows
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        if rows.iter().any(|m| m.id() == message.id()) {
            return Err(StoreError::Conflict(message.id.to_string()));
        }
        rows.push(message.clone());
        Ok(message)
    }

    async fn list_active_messages(&self, now: DateTime<Utc>) -> StoreResult<Vec<Message>> {
        let mut active = self.messages.filter(|m| m.is_active(now))?;
        active.sort_by(|a, b| b.start_time.cmp(&a.start_time).then_with(|| b.id.cmp(&a.id)));
        Ok(active)
    }
}
