//! User accounts.
//!
//! A user is created once at signup and never changes afterwards. Students carry
//! a roll number that uniquely identifies them; teachers do not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use classroll_core::{DomainError, DomainResult, Entity, UserId};

use crate::Role;

const MIN_PASSWORD_LEN: usize = 6;

/// Stored user record, including credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub roll_number: Option<String>,
    pub role: Role,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            roll_number: self.roll_number.clone(),
            role: self.role,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Public view of a user (never exposes credentials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    pub role: Role,
}

/// Signup input, before hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub roll_number: Option<String>,
}

impl NewUser {
    /// Validate and normalize signup input.
    ///
    /// Names and roll numbers are trimmed, emails are trimmed and lowercased.
    /// Students must have a roll number; a roll number given for a teacher is
    /// dropped.
    pub fn normalized(self) -> DomainResult<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }

        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(DomainError::validation("email is malformed")),
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let roll_number = match self.role {
            Role::Student => {
                let roll = self
                    .roll_number
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| DomainError::validation("rollNumber is required for students"))?;
                Some(roll.to_string())
            }
            Role::Teacher => None,
        };

        Ok(Self {
            name,
            email,
            password: self.password,
            role: self.role,
            roll_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> NewUser {
        NewUser {
            name: "  Asha Rao ".to_string(),
            email: " Asha@Example.COM ".to_string(),
            password: "hunter22".to_string(),
            role: Role::Student,
            roll_number: Some(" R1 ".to_string()),
        }
    }

    #[test]
    fn normalizes_student_signup() {
        let u = student().normalized().unwrap();
        assert_eq!(u.name, "Asha Rao");
        assert_eq!(u.email, "asha@example.com");
        assert_eq!(u.roll_number.as_deref(), Some("R1"));
    }

    #[test]
    fn student_requires_roll_number() {
        let mut u = student();
        u.roll_number = Some("   ".to_string());
        assert!(matches!(u.normalized(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn teacher_roll_number_is_dropped() {
        let mut u = student();
        u.role = Role::Teacher;
        assert_eq!(u.normalized().unwrap().roll_number, None);
    }

    #[test]
    fn rejects_short_password_and_bad_email() {
        let mut u = student();
        u.password = "abc".to_string();
        assert!(u.normalized().is_err());

        let mut u = student();
        u.email = "nobody".to_string();
        assert!(u.normalized().is_err());
    }

    #[test]
    fn profile_omits_credentials() {
        let user = User {
            id: UserId::new(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            roll_number: Some("R1".to_string()),
            role: Role::Student,
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json["rollNumber"], "R1");
        assert_eq!(json["role"], "student");
        assert!(json.get("passwordHash").is_none());
    }
}
