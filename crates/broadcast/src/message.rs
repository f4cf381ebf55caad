use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use classroll_core::{DomainError, DomainResult, Entity, MessageId, UserId};

/// Longest broadcast window accepted (one year).
pub const MAX_DURATION_MINUTES: u32 = 525_600;

/// Lifecycle of a message relative to a point in time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageState {
    /// `now < start`
    Pending,
    /// `start <= now < start + duration`
    Active,
    /// `now >= start + duration`
    Expired,
}

/// A broadcast announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub teacher_id: UserId,
    #[serde(rename = "message")]
    pub body: String,
    pub start_time: DateTime<Utc>,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
}

impl Message {
    /// First instant at which the message is no longer active.
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> MessageState {
        if now < self.start_time {
            MessageState::Pending
        } else if now < self.ends_at() {
            MessageState::Active
        } else {
            MessageState::Expired
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == MessageState::Active
    }
}

impl Entity for Message {
    type Id = MessageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Validated input for creating a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub teacher_id: UserId,
    pub body: String,
    pub duration_minutes: u32,
}

impl NewMessage {
    /// Build from loosely-typed request fields. All three are required.
    pub fn parse(teacher_id: Option<&str>, body: Option<&str>, duration_minutes: Option<i64>) -> DomainResult<Self> {
        let (Some(teacher_id), Some(body), Some(duration)) = (
            teacher_id.map(str::trim).filter(|t| !t.is_empty()),
            body.filter(|b| !b.trim().is_empty()),
            duration_minutes.filter(|d| *d != 0),
        ) else {
            return Err(DomainError::validation("Message, teacher ID, and duration are required"));
        };

        let teacher_id: UserId = teacher_id.parse()?;
        let duration_minutes = u32::try_from(duration)
            .ok()
            .filter(|d| *d <= MAX_DURATION_MINUTES)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "duration must be between 1 and {MAX_DURATION_MINUTES} minutes"
                ))
            })?;

        Ok(Self {
            teacher_id,
            body: body.to_string(),
            duration_minutes,
        })
    }

    /// Stamp the message with its start time.
    pub fn start_at(self, start_time: DateTime<Utc>) -> Message {
        Message {
            id: MessageId::new(),
            teacher_id: self.teacher_id,
            body: self.body,
            start_time,
            duration_minutes: self.duration_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    fn fire_drill() -> Message {
        NewMessage {
            teacher_id: UserId::new(),
            body: "Fire drill".to_string(),
            duration_minutes: 5,
        }
        .start_at(t0())
    }

    #[test]
    fn state_machine_is_time_driven() {
        let m = fire_drill();
        assert_eq!(m.state_at(t0() - Duration::seconds(1)), MessageState::Pending);
        assert_eq!(m.state_at(t0()), MessageState::Active);
        assert_eq!(m.state_at(t0() + Duration::minutes(4)), MessageState::Active);
        assert_eq!(m.state_at(t0() + Duration::minutes(5)), MessageState::Expired);
        assert_eq!(m.state_at(t0() + Duration::minutes(6)), MessageState::Expired);
    }

    #[test]
    fn parse_requires_every_field() {
        let teacher = UserId::new().to_string();
        assert!(NewMessage::parse(Some(&teacher), Some("hi"), Some(5)).is_ok());
        assert!(NewMessage::parse(None, Some("hi"), Some(5)).is_err());
        assert!(NewMessage::parse(Some(&teacher), Some("   "), Some(5)).is_err());
        assert!(NewMessage::parse(Some(&teacher), Some("hi"), None).is_err());
        assert!(NewMessage::parse(Some(&teacher), Some("hi"), Some(0)).is_err());
    }

    #[test]
    fn parse_rejects_bad_duration_and_teacher() {
        let teacher = UserId::new().to_string();
        assert!(NewMessage::parse(Some(&teacher), Some("hi"), Some(-5)).is_err());
        assert!(
            NewMessage::parse(Some(&teacher), Some("hi"), Some(i64::from(MAX_DURATION_MINUTES) + 1)).is_err()
        );
        assert!(matches!(
            NewMessage::parse(Some("T1"), Some("hi"), Some(5)),
            Err(DomainError::InvalidId(_))
        ));
    }

    #[test]
    fn serializes_with_original_field_names() {
        let json = serde_json::to_value(fire_drill()).unwrap();
        assert_eq!(json["message"], "Fire drill");
        assert_eq!(json["duration"], 5);
        assert!(json.get("teacherId").is_some());
        assert!(json.get("startTime").is_some());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: active exactly on [start, start + duration·60s).
        #[test]
        fn active_iff_inside_window(
            duration in 1u32..=10_000u32,
            offset_secs in -1_000_000i64..1_000_000i64,
        ) {
            let m = NewMessage {
                teacher_id: UserId::new(),
                body: "x".to_string(),
                duration_minutes: duration,
            }
            .start_at(t0());

            let now = t0() + Duration::seconds(offset_secs);
            let inside = offset_secs >= 0 && offset_secs < i64::from(duration) * 60;
            prop_assert_eq!(m.is_active(now), inside);
        }
    }
}
