//! Roster: students joined with today's attendance.

use serde::{Serialize, Serializer};

use classroll_auth::User;
use classroll_core::UserId;

use crate::{AttendanceRecord, AttendanceStatus};

/// Sentinel shown for students without a mark today.
pub const NOT_MARKED: &str = "Not Marked";

/// Today's status of one student.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RosterStatus {
    Marked(AttendanceStatus),
    NotMarked,
}

impl RosterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RosterStatus::Marked(status) => status.as_str(),
            RosterStatus::NotMarked => NOT_MARKED,
        }
    }
}

impl From<Option<&AttendanceRecord>> for RosterStatus {
    fn from(record: Option<&AttendanceRecord>) -> Self {
        record.map_or(RosterStatus::NotMarked, |r| RosterStatus::Marked(r.status))
    }
}

impl Serialize for RosterStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One row of the roster listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: UserId,
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub attendance_status: RosterStatus,
}

impl RosterEntry {
    pub fn for_student(student: &User, today: Option<&AttendanceRecord>) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            roll_number: student.roll_number.clone().unwrap_or_default(),
            email: student.email.clone(),
            attendance_status: today.into(),
        }
    }
}
