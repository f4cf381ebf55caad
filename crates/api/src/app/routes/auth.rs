use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::app::{dto, errors, services::AppServices};

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::SignupRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let new_user = match body.into_new_user() {
        Ok(u) => u,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.accounts.signup(new_user).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "User registered successfully",
                "user": user,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let (email, password) = match body.credentials() {
        Ok(c) => c,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.accounts.login(email, password).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Login successful",
                "token": outcome.token,
                "user": outcome.user,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
