use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers;
use crate::services::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Users
        .route("/users", post(handlers::create_user))
        .route("/users/:user_id", get(handlers::get_user))
        .route("/users/:user_id/profile", put(handlers::update_profile))
        .route("/users/:user_id/role", put(handlers::update_role))
        // Mentor directory
        .route("/mentors", get(handlers::list_mentors))
        .route("/mentors/:mentor_id", get(handlers::get_mentor))
        // Availability
        .route("/availability/:mentor_id", put(handlers::set_availability))
        .route("/availability/:mentor_id", get(handlers::get_availability))
        .route("/availability/:mentor_id", delete(handlers::delete_availability))
        .route(
            "/availability/mentor/:mentor_id",
            get(handlers::get_mentor_availability),
        )
        // Mentorship requests
        .route("/requests", post(handlers::create_request))
        .route("/requests/sent/:mentee_id", get(handlers::sent_requests))
        .route("/requests/received/:mentor_id", get(handlers::received_requests))
        .route("/requests/:request_id", put(handlers::respond_to_request))
        // Sessions
        .route("/sessions/schedule", post(handlers::schedule_sessions))
        .route("/sessions/user/:user_id", get(handlers::list_sessions))
        .route("/sessions/:session_id/complete", post(handlers::complete_session))
        .route("/sessions/:session_id/feedback", post(handlers::submit_feedback))
        // Admin projections
        .route("/admin/users", get(handlers::admin_list_users))
        .route("/admin/matches", get(handlers::admin_matches))
        .route("/admin/matches", post(handlers::admin_assign_mentor))
        .route("/admin/stats/sessions", get(handlers::admin_session_stats))
}
