use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

pub async fn mark_attendance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    payload: Result<Json<dto::MarkAttendanceRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let batch = match body.into_batch() {
        Ok(b) => b,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    tracing::debug!(marked_by = %session.user_id(), entries = batch.len(), "marking attendance");
    match services.attendance.mark_attendance(batch).await {
        Ok(records) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Attendance marked successfully",
                "attendanceRecords": records,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
