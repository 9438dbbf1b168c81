use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use uuid::Uuid;

use mentormatch_api::config::AppConfig;
use mentormatch_api::models::{MentorResponse, SessionResponse, SessionStatsResponse};
use mentormatch_api::routes::create_routes;
use mentormatch_api::services::AppState;
use mentormatch_api::store::MemoryStore;
use mentormatch_common::{
    ApiResponse, DatabaseConfig, MentorshipRequest, RequestStatus, ServerConfig, Session,
    SessionStatus, User,
};

fn test_server() -> TestServer {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        users: store.clone(),
        availability: store.clone(),
        requests: store.clone(),
        sessions: store,
        config: AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: Vec::new(),
            },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                username: "test".to_string(),
                password: "test".to_string(),
                database: "test".to_string(),
                max_connections: 1,
            },
            system_admin_email: "admin@mentormatch.dev".to_string(),
        },
    };

    TestServer::new(create_routes().with_state(state)).unwrap()
}

async fn create_user(server: &TestServer, email: &str, role: &str) -> User {
    let response = server
        .post("/users")
        .json(&json!({ "email": email, "role": role }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: ApiResponse<User> = response.json();
    body.data.unwrap()
}

fn default_slots() -> serde_json::Value {
    json!([
        { "day_of_week": "Monday", "start_time": "09:00", "end_time": "10:00" },
        { "day_of_week": "Tuesday", "start_time": "09:00", "end_time": "10:00" },
        { "day_of_week": "Wednesday", "start_time": "09:00", "end_time": "10:00" }
    ])
}

#[tokio::test]
async fn health_check_responds() {
    let server = test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: ApiResponse<String> = response.json();
    assert!(body.success);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let server = test_server();

    create_user(&server, "taken@example.com", "MENTEE").await;
    let response = server
        .post("/users")
        .json(&json!({ "email": "taken@example.com", "role": "MENTEE" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_email_is_a_bad_request() {
    let server = test_server();

    let response = server
        .post("/users")
        .json(&json!({ "email": "not-an-email" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn availability_with_fewer_than_three_slots_is_a_bad_request() {
    let server = test_server();
    let mentor = create_user(&server, "mentor@example.com", "MENTOR").await;

    let response = server
        .put(&format!("/availability/{}", mentor.user_id))
        .json(&json!({
            "slots": [
                { "day_of_week": "Monday", "start_time": "09:00", "end_time": "10:00" },
                { "day_of_week": "Tuesday", "start_time": "09:00", "end_time": "10:00" }
            ]
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Nothing was written.
    let response = server
        .get(&format!("/availability/mentor/{}", mentor.user_id))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mentor_directory_exposes_mentors_only() {
    let server = test_server();
    let mentor = create_user(&server, "mentor@example.com", "MENTOR").await;
    let mentee = create_user(&server, "mentee@example.com", "MENTEE").await;

    let response = server.get("/mentors").await;
    response.assert_status_ok();
    let body: ApiResponse<Vec<MentorResponse>> = response.json();
    let mentors = body.data.unwrap();
    assert_eq!(mentors.len(), 1);
    assert_eq!(mentors[0].user_id, mentor.user_id);

    let response = server.get(&format!("/mentors/{}", mentee.user_id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn requesting_a_non_mentor_is_a_bad_request() {
    let server = test_server();
    let mentee = create_user(&server, "mentee@example.com", "MENTEE").await;
    let other = create_user(&server, "other@example.com", "MENTEE").await;

    let response = server
        .post("/requests")
        .json(&json!({ "mentee_id": mentee.user_id, "mentor_id": other.user_id }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_mentorship_flow_over_http() {
    let server = test_server();
    let mentor = create_user(&server, "mentor@example.com", "MENTOR").await;
    let mentee = create_user(&server, "mentee@example.com", "MENTEE").await;

    // Mentee requests mentorship.
    let response = server
        .post("/requests")
        .json(&json!({ "mentee_id": mentee.user_id, "mentor_id": mentor.user_id }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<MentorshipRequest> = response.json();
    let request = body.data.unwrap();
    assert_eq!(request.status, RequestStatus::Pending);

    // A second pending request for the same pair conflicts.
    let response = server
        .post("/requests")
        .json(&json!({ "mentee_id": mentee.user_id, "mentor_id": mentor.user_id }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Mentor accepts.
    let response = server
        .put(&format!("/requests/{}", request.request_id))
        .json(&json!({ "mentor_id": mentor.user_id, "decision": "ACCEPTED" }))
        .await;
    response.assert_status_ok();
    let body: ApiResponse<MentorshipRequest> = response.json();
    assert_eq!(body.data.unwrap().status, RequestStatus::Accepted);

    // Mentor declares availability.
    let response = server
        .put(&format!("/availability/{}", mentor.user_id))
        .json(&json!({ "slots": default_slots() }))
        .await;
    response.assert_status(StatusCode::CREATED);

    // Mentee books a contained window.
    let response = server
        .post("/sessions/schedule")
        .json(&json!({
            "mentee_id": mentee.user_id,
            "mentor_id": mentor.user_id,
            "slots": [
                { "day_of_week": "Monday", "start_time": "09:00", "end_time": "09:30" }
            ]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Vec<Session>> = response.json();
    let sessions = body.data.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].status, SessionStatus::Scheduled);
    let session_id = sessions[0].session_id;

    // Feedback before completion is rejected.
    let response = server
        .post(&format!("/sessions/{}/feedback", session_id))
        .json(&json!({ "mentee_id": mentee.user_id, "rating": 5, "comment": "Great" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Only the mentor may complete.
    let response = server
        .post(&format!("/sessions/{}/complete", session_id))
        .json(&json!({ "mentor_id": mentee.user_id }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = server
        .post(&format!("/sessions/{}/complete", session_id))
        .json(&json!({ "mentor_id": mentor.user_id, "comment": "Covered the roadmap" }))
        .await;
    response.assert_status_ok();
    let body: ApiResponse<Session> = response.json();
    assert_eq!(body.data.unwrap().status, SessionStatus::Completed);

    // Completing twice conflicts.
    let response = server
        .post(&format!("/sessions/{}/complete", session_id))
        .json(&json!({ "mentor_id": mentor.user_id }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Mentee feedback, exactly once.
    let response = server
        .post(&format!("/sessions/{}/feedback", session_id))
        .json(&json!({ "mentee_id": mentee.user_id, "rating": 5, "comment": "Great session" }))
        .await;
    response.assert_status_ok();

    let response = server
        .post(&format!("/sessions/{}/feedback", session_id))
        .json(&json!({ "mentee_id": mentee.user_id, "rating": 1, "comment": "Changed my mind" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Both parties see the session, enriched with the counterpart.
    let response = server.get(&format!("/sessions/user/{}", mentee.user_id)).await;
    response.assert_status_ok();
    let body: ApiResponse<Vec<SessionResponse>> = response.json();
    let listed = body.data.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].mentor.email, "mentor@example.com");
    assert_eq!(listed[0].mentee_feedback.as_ref().unwrap().rating, 5);

    // Admin stats project the completed session.
    let response = server.get("/admin/stats/sessions").await;
    response.assert_status_ok();
    let body: ApiResponse<SessionStatsResponse> = response.json();
    let stats = body.data.unwrap();
    assert_eq!(stats.total_sessions, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.feedback[0].mentee_rating, Some(5));
}

#[tokio::test]
async fn scheduling_outside_availability_reports_the_window() {
    let server = test_server();
    let mentor = create_user(&server, "mentor@example.com", "MENTOR").await;
    let mentee = create_user(&server, "mentee@example.com", "MENTEE").await;

    server
        .post("/admin/matches")
        .json(&json!({ "mentor_id": mentor.user_id, "mentee_id": mentee.user_id }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .put(&format!("/availability/{}", mentor.user_id))
        .json(&json!({ "slots": default_slots() }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/sessions/schedule")
        .json(&json!({
            "mentee_id": mentee.user_id,
            "mentor_id": mentor.user_id,
            "slots": [
                { "day_of_week": "Monday", "start_time": "08:00", "end_time": "09:00" }
            ]
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: ApiResponse<Vec<Session>> = response.json();
    let message = body.error.unwrap();
    assert!(message.contains("Monday"), "got: {message}");
    assert!(message.contains("08:00 - 09:00"), "got: {message}");

    // Zero sessions were created.
    let response = server.get(&format!("/sessions/user/{}", mentee.user_id)).await;
    let body: ApiResponse<Vec<SessionResponse>> = response.json();
    assert!(body.data.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let server = test_server();
    let mentor = create_user(&server, "mentor@example.com", "MENTOR").await;

    let response = server
        .post(&format!("/sessions/{}/complete", Uuid::new_v4()))
        .json(&json!({ "mentor_id": mentor.user_id }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}
