use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use classroll_core::{AttendanceId, DomainError, DomainResult, Entity, UserId};

/// Outcome of a single attendance mark.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl core::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = DomainError;

    /// Exact match only: `"Present"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            other => Err(DomainError::validation(format!(
                "status must be one of: present, absent (got '{other}')"
            ))),
        }
    }
}

/// One persisted attendance mark.
///
/// Records are immutable; a student has at most one per calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub student_id: UserId,
    /// Denormalized from the student at marking time.
    pub roll_number: String,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(
        student_id: UserId,
        roll_number: impl Into<String>,
        status: AttendanceStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AttendanceId::new(),
            student_id,
            roll_number: roll_number.into(),
            status,
            created_at,
        }
    }
}

impl Entity for AttendanceRecord {
    type Id = AttendanceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A single `{rollNumber, status}` line of a marking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkEntry {
    pub roll_number: String,
    pub status: AttendanceStatus,
}

impl MarkEntry {
    /// Build an entry from loosely-typed request fields.
    pub fn parse(roll_number: Option<&str>, status: Option<&str>) -> DomainResult<Self> {
        let roll_number = roll_number
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| DomainError::validation("rollNumber is required"))?;
        let status = status
            .ok_or_else(|| DomainError::validation("status is required"))?
            .parse()?;

        Ok(Self {
            roll_number: roll_number.to_string(),
            status,
        })
    }
}

/// A validated, non-empty, ordered marking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkBatch {
    entries: Vec<MarkEntry>,
}

impl MarkBatch {
    pub fn new(entries: Vec<MarkEntry>) -> DomainResult<Self> {
        if entries.is_empty() {
            return Err(DomainError::validation("attendanceData must be a non-empty array"));
        }
        if let Some(idx) = entries.iter().position(|e| e.roll_number.trim().is_empty()) {
            return Err(DomainError::validation(format!("entry {idx}: rollNumber is required")));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[MarkEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
