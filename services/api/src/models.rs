use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use mentormatch_common::{
    AvailabilitySlot, MenteeFeedback, MentorshipRequest, RequestStatus, SessionStatus, UserProfile,
    UserRole,
};

// Request DTOs. Callers identify themselves with explicit opaque ids; there
// is no session or token layer in front of this service.

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,

    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Bio is required"))]
    pub bio: String,

    pub skills: Vec<String>,

    #[validate(length(min = 1, message = "Goals are required"))]
    pub goals: String,

    pub industry: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub acting_admin_id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SetAvailabilityRequest {
    #[validate(length(min = 3, message = "At least 3 availability slots are required"))]
    pub slots: Vec<AvailabilitySlot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMentorshipRequest {
    pub mentee_id: Uuid,
    pub mentor_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RespondToRequestRequest {
    pub mentor_id: Uuid,
    pub decision: RequestStatus,
}

// Slot emptiness is deliberately not a DTO validation: the scheduler checks
// its preconditions in a fixed order and the batch check comes last.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleSessionsRequest {
    pub mentee_id: Uuid,
    pub mentor_id: Uuid,
    pub slots: Vec<AvailabilitySlot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteSessionRequest {
    pub mentor_id: Uuid,
    pub comment: Option<String>,
}

// Rating bounds are checked by the service after the authorization and
// state checks, matching the gating order of the feedback state machine.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub mentee_id: Uuid,
    pub rating: i16,
    pub comment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignMentorRequest {
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
}

// Response DTOs

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RequestResponse {
    pub request_id: Uuid,
    pub status: RequestStatus,
    pub mentor: UserSummary,
    pub mentee: UserSummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub date: DateTime<Utc>,
    pub status: SessionStatus,
    pub mentor_comment: Option<String>,
    pub mentee_feedback: Option<MenteeFeedback>,
    pub mentor: UserSummary,
    pub mentee: UserSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MentorResponse {
    pub user_id: Uuid,
    pub email: String,
    pub profile: Option<UserProfile>,
    pub availability: Vec<AvailabilitySlot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchResponse {
    pub request_id: Uuid,
    pub status: RequestStatus,
    pub mentor_email: String,
    pub mentee_email: String,
    pub created_at: DateTime<Utc>,
}

impl MatchResponse {
    pub fn new(request: &MentorshipRequest, mentor_email: String, mentee_email: String) -> Self {
        Self {
            request_id: request.request_id,
            status: request.status,
            mentor_email,
            mentee_email,
            created_at: request.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub session_id: Uuid,
    pub date: DateTime<Utc>,
    pub mentor: String,
    pub mentee: String,
    pub mentor_comment: Option<String>,
    pub mentee_rating: Option<i16>,
    pub mentee_comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStatsResponse {
    pub total_sessions: i64,
    pub completed: i64,
    pub feedback: Vec<FeedbackEntry>,
}
