use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use mentormatch_common::{
    ApiResponse, AppError, Availability, AvailabilitySlot, MentorshipRequest, Session, User,
    UserProfile,
};

use crate::models::*;
use crate::scheduling::SchedulingService;
use crate::services::{AdminService, AppState, UserService};

// Health check
pub async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::success("Mentorship service is healthy".to_string()))
}

// Users

pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = UserService::new(&state)
        .create_user(request.email, request.role)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = UserService::new(&state).get_user(user_id).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = UserProfile {
        name: request.name,
        bio: request.bio,
        skills: request.skills,
        goals: request.goals,
        industry: request.industry,
    };

    let user = UserService::new(&state).update_profile(user_id, profile).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn update_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = UserService::new(&state)
        .update_role(request.acting_admin_id, user_id, request.role)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

// Mentor directory

pub async fn list_mentors(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MentorResponse>>>, AppError> {
    let mentors = UserService::new(&state).list_mentors().await?;
    Ok(Json(ApiResponse::success(mentors)))
}

pub async fn get_mentor(
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MentorResponse>>, AppError> {
    let mentor = UserService::new(&state).get_mentor_profile(mentor_id).await?;
    Ok(Json(ApiResponse::success(mentor)))
}

// Availability

pub async fn set_availability(
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Availability>>), AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let saved = SchedulingService::new(&state)
        .set_availability(mentor_id, request.slots)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(saved))))
}

pub async fn get_availability(
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AvailabilitySlot>>>, AppError> {
    let slots = SchedulingService::new(&state).get_availability(mentor_id).await?;
    Ok(Json(ApiResponse::success(slots)))
}

pub async fn get_mentor_availability(
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Availability>>, AppError> {
    let availability = SchedulingService::new(&state)
        .get_mentor_availability(mentor_id)
        .await?;
    Ok(Json(ApiResponse::success(availability)))
}

pub async fn delete_availability(
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    SchedulingService::new(&state).clear_availability(mentor_id).await?;
    Ok(Json(ApiResponse::success("Availability cleared".to_string())))
}

// Mentorship requests

pub async fn create_request(
    State(state): State<AppState>,
    Json(request): Json<CreateMentorshipRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MentorshipRequest>>), AppError> {
    let created = SchedulingService::new(&state)
        .create_request(request.mentee_id, request.mentor_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn sent_requests(
    State(state): State<AppState>,
    Path(mentee_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<RequestResponse>>>, AppError> {
    let requests = SchedulingService::new(&state).list_sent_requests(mentee_id).await?;
    Ok(Json(ApiResponse::success(requests)))
}

pub async fn received_requests(
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<RequestResponse>>>, AppError> {
    let requests = SchedulingService::new(&state)
        .list_received_requests(mentor_id)
        .await?;
    Ok(Json(ApiResponse::success(requests)))
}

pub async fn respond_to_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(request): Json<RespondToRequestRequest>,
) -> Result<Json<ApiResponse<MentorshipRequest>>, AppError> {
    let updated = SchedulingService::new(&state)
        .respond_to_request(request.mentor_id, request_id, request.decision)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

// Sessions

pub async fn schedule_sessions(
    State(state): State<AppState>,
    Json(request): Json<ScheduleSessionsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Session>>>), AppError> {
    let sessions = SchedulingService::new(&state)
        .schedule_sessions(request.mentee_id, request.mentor_id, &request.slots, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(sessions))))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<SessionResponse>>>, AppError> {
    let sessions = SchedulingService::new(&state).list_sessions_for(user_id).await?;
    Ok(Json(ApiResponse::success(sessions)))
}

pub async fn complete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CompleteSessionRequest>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let session = SchedulingService::new(&state)
        .complete_session(request.mentor_id, session_id, request.comment)
        .await?;
    Ok(Json(ApiResponse::success(session)))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let session = SchedulingService::new(&state)
        .submit_feedback(request.mentee_id, session_id, request.rating, request.comment)
        .await?;
    Ok(Json(ApiResponse::success(session)))
}

// Admin projections

pub async fn admin_list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<User>>>, AppError> {
    let users = AdminService::new(&state).list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}

pub async fn admin_matches(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MatchResponse>>>, AppError> {
    let matches = AdminService::new(&state).get_all_matches().await?;
    Ok(Json(ApiResponse::success(matches)))
}

pub async fn admin_session_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SessionStatsResponse>>, AppError> {
    let stats = AdminService::new(&state).get_session_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

pub async fn admin_assign_mentor(
    State(state): State<AppState>,
    Json(request): Json<AssignMentorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MentorshipRequest>>), AppError> {
    let created = AdminService::new(&state)
        .assign_mentor(request.mentor_id, request.mentee_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
