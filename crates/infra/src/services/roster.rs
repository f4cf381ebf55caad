use std::sync::Arc;

use tracing::instrument;

use classroll_attendance::RosterEntry;
use classroll_core::{Clock, DayBoundary};

use super::ServiceError;
use crate::store::{AttendanceStore, UserStore};

/// Students joined with their attendance for the current day.
pub struct RosterService<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    day: DayBoundary,
}

impl<S: ?Sized> Clone for RosterService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            day: self.day,
        }
    }
}

impl<S> RosterService<S>
where
    S: UserStore + AttendanceStore + ?Sized,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, day: DayBoundary) -> Self {
        Self { store, clock, day }
    }

    #[instrument(skip(self), err)]
    pub async fn list_students_with_today_status(&self) -> Result<Vec<RosterEntry>, ServiceError> {
        let since = self.day.start_of_day(self.clock.now());
        let students = self.store.list_students().await?;

        let mut roster = Vec::with_capacity(students.len());
        for student in &students {
            let today = self.store.find_attendance_since(student.id, since).await?;
            roster.push(RosterEntry::for_student(student, today.as_ref()));
        }
        Ok(roster)
    }
}
