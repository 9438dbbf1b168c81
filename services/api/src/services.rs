use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use mentormatch_common::{
    AppError, MentorshipRequest, RequestStatus, User, UserProfile, UserRole,
};

use crate::config::AppConfig;
use crate::models::{FeedbackEntry, MatchResponse, MentorResponse, SessionStatsResponse};
use crate::store::{AvailabilityStore, RequestStore, SessionStore, UserStore};

/// Shared application state. The stores are injected as trait objects so
/// the same services run against Postgres in production and the in-memory
/// store in tests.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub availability: Arc<dyn AvailabilityStore>,
    pub requests: Arc<dyn RequestStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: AppConfig,
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    availability: Arc<dyn AvailabilityStore>,
    config: AppConfig,
}

impl UserService {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            availability: state.availability.clone(),
            config: state.config.clone(),
        }
    }

    pub async fn create_user(&self, email: String, role: Option<UserRole>) -> Result<User, AppError> {
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        // The configured system administrator is pinned to ADMIN no matter
        // what role was asked for.
        let role = if self.config.is_system_admin_email(&email) {
            UserRole::Admin
        } else {
            role.unwrap_or(UserRole::Mentee)
        };

        let now = Utc::now();
        let user = User {
            user_id: Uuid::new_v4(),
            email,
            role,
            profile: None,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(&user).await?;

        tracing::info!("User registered: {} ({})", user.email, user.role.as_str());
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.users
            .find(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        profile: UserProfile,
    ) -> Result<User, AppError> {
        self.users
            .update_profile(user_id, &profile)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_role(
        &self,
        acting_admin_id: Uuid,
        target_id: Uuid,
        role: UserRole,
    ) -> Result<User, AppError> {
        let acting = self.users.find(acting_admin_id).await?;
        if !matches!(acting, Some(ref user) if user.role == UserRole::Admin) {
            return Err(AppError::Forbidden("Insufficient permissions".to_string()));
        }

        if acting_admin_id == target_id && role != UserRole::Admin {
            return Err(AppError::Validation(
                "You can't remove your own admin access".to_string(),
            ));
        }

        let target = self
            .users
            .find(target_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if self.config.is_system_admin_email(&target.email) && role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "The system administrator role cannot be changed".to_string(),
            ));
        }

        let updated = self
            .users
            .update_role(target_id, role)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        tracing::info!("Role of user {} set to {}", target_id, role.as_str());
        Ok(updated)
    }

    // Mentor directory

    pub async fn list_mentors(&self) -> Result<Vec<MentorResponse>, AppError> {
        let mentors = self.users.list_by_role(UserRole::Mentor).await?;

        let mut responses = Vec::with_capacity(mentors.len());
        for mentor in mentors {
            let availability = self
                .availability
                .find(mentor.user_id)
                .await?
                .map(|a| a.slots)
                .unwrap_or_default();
            responses.push(MentorResponse {
                user_id: mentor.user_id,
                email: mentor.email,
                profile: mentor.profile,
                availability,
            });
        }
        Ok(responses)
    }

    pub async fn get_mentor_profile(&self, mentor_id: Uuid) -> Result<MentorResponse, AppError> {
        let mentor = match self.users.find(mentor_id).await? {
            Some(user) if user.role == UserRole::Mentor => user,
            _ => return Err(AppError::NotFound("Mentor not found".to_string())),
        };

        let availability = self
            .availability
            .find(mentor_id)
            .await?
            .map(|a| a.slots)
            .unwrap_or_default();

        Ok(MentorResponse {
            user_id: mentor.user_id,
            email: mentor.email,
            profile: mentor.profile,
            availability,
        })
    }
}

/// Read-only projections over requests and sessions for administrators,
/// plus the manual match assignment. Nothing here mutates the scheduling
/// state machine.
pub struct AdminService {
    users: Arc<dyn UserStore>,
    requests: Arc<dyn RequestStore>,
    sessions: Arc<dyn SessionStore>,
}

impl AdminService {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            requests: state.requests.clone(),
            sessions: state.sessions.clone(),
        }
    }

    async fn email_of(&self, user_id: Uuid) -> Result<String, AppError> {
        self.users
            .find(user_id)
            .await?
            .map(|u| u.email)
            .ok_or_else(|| AppError::Internal(format!("Referenced user {} is missing", user_id)))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.users.list().await
    }

    pub async fn get_all_matches(&self) -> Result<Vec<MatchResponse>, AppError> {
        let requests = self.requests.list_all().await?;

        let mut matches = Vec::with_capacity(requests.len());
        for request in requests {
            let mentor_email = self.email_of(request.mentor_id).await?;
            let mentee_email = self.email_of(request.mentee_id).await?;
            matches.push(MatchResponse::new(&request, mentor_email, mentee_email));
        }
        Ok(matches)
    }

    pub async fn get_session_stats(&self) -> Result<SessionStatsResponse, AppError> {
        let total_sessions = self.sessions.count().await?;
        let completed_sessions = self.sessions.list_completed().await?;

        let mut feedback = Vec::with_capacity(completed_sessions.len());
        for session in &completed_sessions {
            feedback.push(FeedbackEntry {
                session_id: session.session_id,
                date: session.date,
                mentor: self.email_of(session.mentor_id).await?,
                mentee: self.email_of(session.mentee_id).await?,
                mentor_comment: session.mentor_comment.clone(),
                mentee_rating: session.mentee_feedback.as_ref().map(|f| f.rating),
                mentee_comment: session.mentee_feedback.as_ref().map(|f| f.comment.clone()),
            });
        }

        Ok(SessionStatsResponse {
            total_sessions,
            completed: completed_sessions.len() as i64,
            feedback,
        })
    }

    /// Manual pairing: creates a request already in ACCEPTED state so the
    /// mentee can schedule immediately.
    pub async fn assign_mentor(
        &self,
        mentor_id: Uuid,
        mentee_id: Uuid,
    ) -> Result<MentorshipRequest, AppError> {
        match self.users.find(mentor_id).await? {
            Some(user) if user.role == UserRole::Mentor => {}
            _ => return Err(AppError::InvalidTarget("Invalid mentor".to_string())),
        }
        match self.users.find(mentee_id).await? {
            Some(user) if user.role == UserRole::Mentee => {}
            _ => return Err(AppError::InvalidTarget("Invalid mentee".to_string())),
        }

        if self
            .requests
            .find_by_pair(mentor_id, mentee_id, RequestStatus::Accepted)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Already matched".to_string()));
        }

        let now = Utc::now();
        let request = MentorshipRequest {
            request_id: Uuid::new_v4(),
            mentor_id,
            mentee_id,
            status: RequestStatus::Accepted,
            created_at: now,
            updated_at: now,
        };
        self.requests.insert(&request).await?;

        tracing::info!("Mentor {} manually assigned to mentee {}", mentor_id, mentee_id);
        Ok(request)
    }
}
