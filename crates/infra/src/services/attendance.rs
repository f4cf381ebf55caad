//! Daily attendance marking.
//!
//! ```text
//! MarkBatch
//!   ↓
//! 1. Resolve every roll number to a student          (NotFound stops here)
//!   ↓
//! 2. Check each student for a record since midnight  (AlreadyMarked stops here)
//!   ↓
//! 3. Insert the whole batch atomically               (store Conflict ⇒ AlreadyMarked)
//! ```
//!
//! Nothing is written unless every entry passes steps 1 and 2.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use classroll_attendance::{AttendanceRecord, MarkBatch};
use classroll_core::{Clock, DayBoundary};

use super::ServiceError;
use crate::store::{AttendanceStore, DailyMark, StoreError, UserStore};

pub struct AttendanceService<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    day: DayBoundary,
}

impl<S: ?Sized> Clone for AttendanceService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            day: self.day,
        }
    }
}

impl<S> AttendanceService<S>
where
    S: UserStore + AttendanceStore + ?Sized,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, day: DayBoundary) -> Self {
        Self { store, clock, day }
    }

    /// Record one mark per entry for the current calendar day.
    ///
    /// Returns the new records in submission order. A roll number submitted twice
    /// in one batch is reported as already marked.
    #[instrument(skip(self, batch), fields(entries = batch.len()), err)]
    pub async fn mark_attendance(&self, batch: MarkBatch) -> Result<Vec<AttendanceRecord>, ServiceError> {
        let now = self.clock.now();
        let since = self.day.start_of_day(now);
        let today = self.day.day_of(now);

        let mut seen = HashSet::with_capacity(batch.len());
        let mut already_marked: Vec<String> = Vec::new();
        let mut pending = Vec::with_capacity(batch.len());

        for entry in batch.entries() {
            let student = self
                .store
                .find_student_by_roll_number(&entry.roll_number)
                .await?
                .ok_or_else(|| ServiceError::NotFound(entry.roll_number.clone()))?;

            if !seen.insert(student.id) {
                if !already_marked.contains(&entry.roll_number) {
                    already_marked.push(entry.roll_number.clone());
                }
                continue;
            }

            if self.store.find_attendance_since(student.id, since).await?.is_some() {
                already_marked.push(entry.roll_number.clone());
                continue;
            }

            pending.push(DailyMark {
                day: today,
                record: AttendanceRecord::new(student.id, entry.roll_number.clone(), entry.status, now),
            });
        }

        if !already_marked.is_empty() {
            warn!(roll_numbers = ?already_marked, "attendance already marked today");
            return Err(ServiceError::AlreadyMarked(already_marked));
        }

        match self.store.insert_attendance_batch(pending).await {
            Ok(records) => {
                info!(count = records.len(), day = %today, "attendance marked");
                Ok(records)
            }
            Err(StoreError::Conflict(roll_number)) => {
                warn!(roll_number = %roll_number, "attendance marked concurrently");
                Err(ServiceError::AlreadyMarked(vec![roll_number]))
            }
            Err(e) => Err(e.into()),
        }
    }
}
