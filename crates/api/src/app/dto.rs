use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use classroll_attendance::{MarkBatch, MarkEntry};
use classroll_auth::{NewUser, Role};
use classroll_broadcast::NewMessage;
use classroll_core::{DomainError, DomainResult};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------
//
// Every field is optional at the wire level so that a missing field becomes a
// 400 with our error body instead of a framework rejection.

/// A JSON string or number. Clients send roll numbers and durations as either.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }

    fn as_whole_number(&self) -> Option<i64> {
        match self {
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Number(n) => n.as_i64(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub roll_number: Option<String>,
}

impl SignupRequest {
    pub fn into_new_user(self) -> DomainResult<NewUser> {
        let role: Role = self
            .role
            .as_deref()
            .ok_or_else(|| DomainError::validation("role is required"))?
            .parse()?;
        Ok(NewUser {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            role,
            roll_number: self.roll_number,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn credentials(&self) -> DomainResult<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(DomainError::validation("email and password are required")),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntryRequest {
    pub roll_number: Option<Scalar>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub attendance_data: Option<Vec<AttendanceEntryRequest>>,
}

impl MarkAttendanceRequest {
    pub fn into_batch(self) -> DomainResult<MarkBatch> {
        let data = self
            .attendance_data
            .filter(|d| !d.is_empty())
            .ok_or_else(|| DomainError::validation("Invalid input data"))?;

        let entries = data
            .into_iter()
            .map(|e| {
                let roll_number = e.roll_number.map(Scalar::into_text);
                MarkEntry::parse(roll_number.as_deref(), e.status.as_deref())
                    .map_err(|_| DomainError::validation("Invalid input for roll number or status"))
            })
            .collect::<DomainResult<Vec<_>>>()?;

        MarkBatch::new(entries)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    /// Id of a user returned by `/signup`; arbitrary labels are rejected.
    pub teacher_id: Option<String>,
    pub message: Option<String>,
    /// Minutes, as a number or a numeric string.
    pub duration: Option<Scalar>,
}

impl CreateMessageRequest {
    pub fn into_new_message(self) -> DomainResult<NewMessage> {
        let duration = match &self.duration {
            None => None,
            Some(raw) => Some(
                raw.as_whole_number()
                    .ok_or_else(|| DomainError::validation("duration must be a whole number of minutes"))?,
            ),
        };
        NewMessage::parse(self.teacher_id.as_deref(), self.message.as_deref(), duration)
    }
}

// -------------------------
// Extraction helpers
// -------------------------

/// Unwrap a JSON body, turning framework rejections into our error shape.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    payload.map(|Json(v)| v).map_err(|rejection| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
    })
}
