use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::{errors, services::AppServices};

/// All students with today's attendance status.
pub async fn list_students(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.roster.list_students_with_today_status().await {
        Ok(roster) => (StatusCode::OK, Json(roster)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
