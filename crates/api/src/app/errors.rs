use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use classroll_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ServiceError::NotFound(roll_number) => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({
                "error": "not_found",
                "message": format!("Student with roll number {roll_number} not found"),
                "rollNumber": roll_number,
            })),
        )
            .into_response(),
        ServiceError::AlreadyMarked(roll_numbers) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "already_marked",
                "message": "Attendance already marked for some students",
                "alreadyMarkedRollNumbers": roll_numbers,
            })),
        )
            .into_response(),
        ServiceError::Conflict(key) => {
            json_error(StatusCode::CONFLICT, "conflict", format!("{key} is already registered"))
        }
        ServiceError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "Invalid email or password")
        }
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "Server error")
        }
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "internal failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Server error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
