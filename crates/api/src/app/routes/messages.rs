use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use classroll_infra::ActiveMessages;

use crate::app::{dto, errors, services::AppServices};

pub async fn create_message(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreateMessageRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let new_message = match body.into_new_message() {
        Ok(m) => m,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.broadcast.create_message(new_message).await {
        Ok(message) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Message created successfully",
                "newMessage": message,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_active_messages(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.broadcast.list_active_messages().await {
        Ok(ActiveMessages::Messages(messages)) => (StatusCode::OK, Json(messages)).into_response(),
        Ok(ActiveMessages::Empty) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "No active messages" })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
