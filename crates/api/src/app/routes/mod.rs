use axum::{
    routing::{get, post},
    Router,
};

pub mod attendance;
pub mod auth;
pub mod messages;
pub mod students;
pub mod system;

/// Routes reachable without a session.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
}

/// Routes that require a bearer token.
pub fn protected_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/students", get(students::list_students))
        .route("/attendance", post(attendance::mark_attendance))
        .route("/messages", post(messages::create_message).get(messages::list_active_messages))
}
