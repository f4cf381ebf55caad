use std::sync::Arc;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use classroll_api::app::{router, AppServices};
use classroll_api::config::Config;
use classroll_auth::{Role, SessionClaims};
use classroll_core::{Clock, FixedClock, UserId};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    clock: Arc<FixedClock>,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over the in-memory store, with a controllable clock.
        let config = Config::for_tests(JWT_SECRET);
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()));
        let services = AppServices::in_memory(&config, clock.clone());
        let app = router(Arc::new(services), &config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            clock,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn signup(&self, body: Value) -> reqwest::Response {
        self.client.post(self.url("/signup")).json(&body).send().await.unwrap()
    }

    async fn signup_student(&self, roll: &str) {
        let res = self
            .signup(json!({
                "name": format!("Student {roll}"),
                "email": format!("{}@example.com", roll.to_lowercase()),
                "password": "hunter22",
                "role": "student",
                "rollNumber": roll,
            }))
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    /// Sign up a teacher and log in; returns (token, teacher id).
    async fn teacher_session(&self) -> (String, String) {
        let res = self
            .signup(json!({
                "name": "Ms. Rao",
                "email": "rao@example.com",
                "password": "hunter22",
                "role": "teacher",
            }))
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "email": "rao@example.com", "password": "hunter22" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn mark(&self, token: &str, entries: Value) -> reqwest::Response {
        self.client
            .post(self.url("/attendance"))
            .bearer_auth(token)
            .json(&json!({ "attendanceData": entries }))
            .send()
            .await
            .unwrap()
    }

    async fn get_json(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, issued_at: chrono::DateTime<Utc>, ttl: ChronoDuration) -> String {
    let claims = SessionClaims {
        sub: UserId::new(),
        role: Role::Teacher,
        issued_at,
        expires_at: issued_at + ttl,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn liveness_and_health_are_public() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Server is running");

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    for path in ["/students", "/messages", "/whoami"] {
        let res = srv.client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn tokens_signed_with_another_secret_or_expired_are_rejected() {
    let srv = TestServer::spawn().await;
    let now = srv.clock.now();

    let forged = mint_jwt("other-secret", now, ChronoDuration::minutes(10));
    let (status, _) = srv.get_json(&forged, "/students").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = mint_jwt(JWT_SECRET, now - ChronoDuration::hours(2), ChronoDuration::hours(1));
    let (status, _) = srv.get_json(&expired, "/students").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let valid = mint_jwt(JWT_SECRET, now, ChronoDuration::minutes(10));
    let (status, _) = srv.get_json(&valid, "/students").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn signup_login_whoami() {
    let srv = TestServer::spawn().await;
    let (token, teacher_id) = srv.teacher_session().await;

    let (status, body) = srv.get_json(&token, "/whoami").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], teacher_id);
    assert_eq!(body["role"], "teacher");
}

#[tokio::test]
async fn signup_conflicts_and_bad_login() {
    let srv = TestServer::spawn().await;
    srv.signup_student("R1").await;

    let res = srv
        .signup(json!({
            "name": "Other", "email": "other@example.com", "password": "hunter22",
            "role": "student", "rollNumber": "R1"
        }))
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = srv
        .signup(json!({ "name": "NoRoll", "email": "x@example.com", "password": "hunter22", "role": "student" }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .post(srv.url("/login"))
        .json(&json!({ "email": "r1@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_credentials");
}

#[tokio::test]
async fn attendance_roster_lifecycle() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.teacher_session().await;
    srv.signup_student("R1").await;
    srv.signup_student("R2").await;

    // Empty roster status before marking.
    let (status, roster) = srv.get_json(&token, "/students").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roster.as_array().unwrap().len(), 2);
    assert!(roster.as_array().unwrap().iter().all(|s| s["attendanceStatus"] == "Not Marked"));

    let res = srv.mark(&token, json!([{ "rollNumber": "R1", "status": "present" }])).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Attendance marked successfully");
    assert_eq!(body["attendanceRecords"][0]["rollNumber"], "R1");
    assert_eq!(body["attendanceRecords"][0]["status"], "present");

    // Resubmission is rejected and nothing changes.
    srv.clock.advance(ChronoDuration::hours(1));
    let res = srv
        .mark(
            &token,
            json!([
                { "rollNumber": "R2", "status": "present" },
                { "rollNumber": "R1", "status": "absent" }
            ]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["alreadyMarkedRollNumbers"], json!(["R1"]));

    let (_, roster) = srv.get_json(&token, "/students").await;
    let status_of = |roll: &str| {
        roster
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["rollNumber"] == roll)
            .map(|s| s["attendanceStatus"].clone())
            .unwrap()
    };
    assert_eq!(status_of("R1"), "present");
    assert_eq!(status_of("R2"), "Not Marked");
}

#[tokio::test]
async fn attendance_input_errors() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.teacher_session().await;
    srv.signup_student("R1").await;

    let res = srv.mark(&token, json!([])).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv.mark(&token, json!([{ "rollNumber": "R1", "status": "Present" }])).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .mark(
            &token,
            json!([
                { "rollNumber": "R1", "status": "present" },
                { "rollNumber": "ZZZ", "status": "present" }
            ]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["rollNumber"], "ZZZ");

    // Nothing from the rejected batch was persisted.
    let res = srv.mark(&token, json!([{ "rollNumber": "R1", "status": "absent" }])).await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn messages_follow_their_broadcast_window() {
    let srv = TestServer::spawn().await;
    let (token, teacher_id) = srv.teacher_session().await;

    let (status, body) = srv.get_json(&token, "/messages").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "No active messages" }));

    let res = srv
        .client
        .post(srv.url("/messages"))
        .bearer_auth(&token)
        .json(&json!({ "teacherId": teacher_id, "message": "Fire drill", "duration": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Message created successfully");
    assert_eq!(body["newMessage"]["message"], "Fire drill");
    assert_eq!(body["newMessage"]["duration"], 5);

    srv.clock.advance(ChronoDuration::minutes(4));
    let (_, active) = srv.get_json(&token, "/messages").await;
    assert_eq!(active.as_array().unwrap().len(), 1);
    assert_eq!(active[0]["message"], "Fire drill");

    srv.clock.advance(ChronoDuration::minutes(2));
    let (_, body) = srv.get_json(&token, "/messages").await;
    assert_eq!(body, json!({ "message": "No active messages" }));
}

#[tokio::test]
async fn message_requires_every_field() {
    let srv = TestServer::spawn().await;
    let (token, teacher_id) = srv.teacher_session().await;

    for body in [
        json!({ "message": "hi", "duration": 5 }),
        json!({ "teacherId": teacher_id, "duration": 5 }),
        json!({ "teacherId": teacher_id, "message": "hi" }),
        json!({ "teacherId": teacher_id, "message": "hi", "duration": 0 }),
    ] {
        let res = srv
            .client
            .post(srv.url("/messages"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn numeric_roll_numbers_and_string_durations_are_accepted() {
    let srv = TestServer::spawn().await;
    let (token, teacher_id) = srv.teacher_session().await;
    srv.signup_student("101").await;

    let res = srv.mark(&token, json!([{ "rollNumber": 101, "status": "present" }])).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["attendanceRecords"][0]["rollNumber"], "101");

    let res = srv
        .client
        .post(srv.url("/messages"))
        .bearer_auth(&token)
        .json(&json!({ "teacherId": teacher_id, "message": "Quiz", "duration": "5" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["newMessage"]["duration"], 5);
}
