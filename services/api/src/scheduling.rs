use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use mentormatch_common::{
    AppError, Availability, AvailabilitySlot, MenteeFeedback, MentorshipRequest, RequestStatus,
    Session, SessionStatus, User, UserRole,
};

use crate::calendar::{find_matching_slot, slot_start_datetime, validate_slot};
use crate::models::{RequestResponse, SessionResponse, UserSummary};
use crate::services::AppState;
use crate::store::{AvailabilityStore, RequestStore, SessionStore, UserStore};

/// The scheduling core: availability, the request lifecycle, slot-batch
/// scheduling and the completion/feedback state machine. All storage goes
/// through the injected store traits.
pub struct SchedulingService {
    users: Arc<dyn UserStore>,
    availability: Arc<dyn AvailabilityStore>,
    requests: Arc<dyn RequestStore>,
    sessions: Arc<dyn SessionStore>,
}

impl SchedulingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            availability: state.availability.clone(),
            requests: state.requests.clone(),
            sessions: state.sessions.clone(),
        }
    }

    async fn require_mentor(&self, mentor_id: Uuid) -> Result<User, AppError> {
        match self.users.find(mentor_id).await? {
            Some(user) if user.role == UserRole::Mentor => Ok(user),
            _ => Err(AppError::InvalidTarget("Invalid mentor selected".to_string())),
        }
    }

    async fn user_summary(&self, user_id: Uuid) -> Result<UserSummary, AppError> {
        let user = self
            .users
            .find(user_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Referenced user {} is missing", user_id)))?;

        Ok(UserSummary {
            user_id: user.user_id,
            email: user.email,
            name: user.profile.map(|p| p.name),
        })
    }

    // Availability

    pub async fn set_availability(
        &self,
        mentor_id: Uuid,
        slots: Vec<AvailabilitySlot>,
    ) -> Result<Availability, AppError> {
        self.require_mentor(mentor_id).await?;

        if slots.len() < 3 {
            return Err(AppError::Validation(
                "At least 3 availability slots are required".to_string(),
            ));
        }
        for slot in &slots {
            validate_slot(slot)?;
        }

        let saved = self.availability.upsert(mentor_id, &slots).await?;
        tracing::info!("Availability saved for mentor {} ({} slots)", mentor_id, saved.slots.len());
        Ok(saved)
    }

    /// The mentor's own view: an unset record reads as an empty slot list.
    pub async fn get_availability(&self, mentor_id: Uuid) -> Result<Vec<AvailabilitySlot>, AppError> {
        Ok(self
            .availability
            .find(mentor_id)
            .await?
            .map(|a| a.slots)
            .unwrap_or_default())
    }

    /// The directory view: mentees looking at a mentor get a hard NotFound
    /// when the mentor has not declared availability.
    pub async fn get_mentor_availability(&self, mentor_id: Uuid) -> Result<Availability, AppError> {
        self.availability
            .find(mentor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No availability found for this mentor".to_string()))
    }

    pub async fn clear_availability(&self, mentor_id: Uuid) -> Result<(), AppError> {
        self.availability.delete(mentor_id).await?;
        tracing::info!("Availability cleared for mentor {}", mentor_id);
        Ok(())
    }

    // Request lifecycle

    pub async fn create_request(
        &self,
        mentee_id: Uuid,
        mentor_id: Uuid,
    ) -> Result<MentorshipRequest, AppError> {
        self.users
            .find(mentee_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mentee not found".to_string()))?;
        self.require_mentor(mentor_id).await?;

        if self
            .requests
            .find_by_pair(mentor_id, mentee_id, RequestStatus::Pending)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Request already pending".to_string()));
        }

        let now = Utc::now();
        let request = MentorshipRequest {
            request_id: Uuid::new_v4(),
            mentor_id,
            mentee_id,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.requests.insert(&request).await?;

        tracing::info!(
            "Mentorship request {} created: mentee {} -> mentor {}",
            request.request_id,
            mentee_id,
            mentor_id
        );
        Ok(request)
    }

    pub async fn respond_to_request(
        &self,
        mentor_id: Uuid,
        request_id: Uuid,
        decision: RequestStatus,
    ) -> Result<MentorshipRequest, AppError> {
        if !matches!(decision, RequestStatus::Accepted | RequestStatus::Rejected) {
            return Err(AppError::Validation(
                "Decision must be ACCEPTED or REJECTED".to_string(),
            ));
        }

        let request = self
            .requests
            .find(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

        if request.mentor_id != mentor_id {
            return Err(AppError::Forbidden(
                "Not authorized to respond to this request".to_string(),
            ));
        }

        if !request.status.can_transition_to(decision) {
            return Err(AppError::Conflict("Request already processed".to_string()));
        }

        let updated = self
            .requests
            .update_status(request_id, decision)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

        tracing::info!("Request {} {} by mentor {}", request_id, decision.as_str(), mentor_id);
        Ok(updated)
    }

    pub async fn list_sent_requests(&self, mentee_id: Uuid) -> Result<Vec<RequestResponse>, AppError> {
        let requests = self.requests.list_for_mentee(mentee_id).await?;
        self.enrich_requests(requests).await
    }

    pub async fn list_received_requests(
        &self,
        mentor_id: Uuid,
    ) -> Result<Vec<RequestResponse>, AppError> {
        let requests = self.requests.list_for_mentor(mentor_id).await?;
        self.enrich_requests(requests).await
    }

    async fn enrich_requests(
        &self,
        requests: Vec<MentorshipRequest>,
    ) -> Result<Vec<RequestResponse>, AppError> {
        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            responses.push(RequestResponse {
                request_id: request.request_id,
                status: request.status,
                mentor: self.user_summary(request.mentor_id).await?,
                mentee: self.user_summary(request.mentee_id).await?,
                created_at: request.created_at,
            });
        }
        Ok(responses)
    }

    // Scheduling

    /// Validates every requested slot against the mentor's declared
    /// availability, derives concrete dates and persists the whole batch
    /// atomically. The first failing slot aborts the entire call.
    ///
    /// `now` is passed in explicitly so the date derivation stays
    /// deterministic under test.
    pub async fn schedule_sessions(
        &self,
        mentee_id: Uuid,
        mentor_id: Uuid,
        slots: &[AvailabilitySlot],
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, AppError> {
        self.require_mentor(mentor_id).await?;

        let request = self
            .requests
            .find_by_pair(mentor_id, mentee_id, RequestStatus::Accepted)
            .await?
            .ok_or_else(|| AppError::Forbidden("No accepted mentorship request".to_string()))?;

        let availability = self
            .availability
            .find(mentor_id)
            .await?
            .ok_or_else(|| AppError::Validation("Mentor has no availability set".to_string()))?;

        if slots.is_empty() {
            return Err(AppError::Validation(
                "At least one session slot is required".to_string(),
            ));
        }

        let mut staged = Vec::with_capacity(slots.len());
        for slot in slots {
            validate_slot(slot)?;

            if find_matching_slot(&availability.slots, slot).is_none() {
                return Err(AppError::Validation(format!(
                    "Mentor not available on {} between {} - {}",
                    slot.day_of_week, slot.start_time, slot.end_time
                )));
            }

            let date = slot_start_datetime(now, slot.day_of_week, &slot.start_time)?;

            if self.sessions.exists_booking(mentor_id, mentee_id, date).await? {
                return Err(AppError::Conflict(format!(
                    "A session with this mentor is already booked on {}",
                    date.format("%Y-%m-%d %H:%M")
                )));
            }

            staged.push(Session {
                session_id: Uuid::new_v4(),
                mentor_id,
                mentee_id,
                date,
                status: SessionStatus::Scheduled,
                mentor_comment: None,
                mentee_feedback: None,
                created_at: now,
                updated_at: now,
            });
        }

        self.sessions
            .insert_scheduled_batch(request.request_id, &staged)
            .await?;

        tracing::info!(
            "Scheduled {} session(s) for mentee {} with mentor {}",
            staged.len(),
            mentee_id,
            mentor_id
        );
        Ok(staged)
    }

    pub async fn list_sessions_for(&self, user_id: Uuid) -> Result<Vec<SessionResponse>, AppError> {
        let sessions = self.sessions.list_for_user(user_id).await?;

        let mut responses = Vec::with_capacity(sessions.len());
        for session in sessions {
            responses.push(SessionResponse {
                session_id: session.session_id,
                date: session.date,
                status: session.status,
                mentor_comment: session.mentor_comment,
                mentee_feedback: session.mentee_feedback,
                mentor: self.user_summary(session.mentor_id).await?,
                mentee: self.user_summary(session.mentee_id).await?,
            });
        }
        Ok(responses)
    }

    // Completion and feedback. Authorization is checked before state,
    // state before field validation.

    pub async fn complete_session(
        &self,
        mentor_id: Uuid,
        session_id: Uuid,
        comment: Option<String>,
    ) -> Result<Session, AppError> {
        let session = self
            .sessions
            .find(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        if session.mentor_id != mentor_id {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        if session.status != SessionStatus::Scheduled {
            return Err(AppError::Conflict("Session already completed".to_string()));
        }

        // The conditional write is the backstop for a concurrent completion
        // between the check above and this update.
        let completed = self
            .sessions
            .complete(session_id, comment)
            .await?
            .ok_or_else(|| AppError::Conflict("Session already completed".to_string()))?;

        tracing::info!("Session {} completed by mentor {}", session_id, mentor_id);
        Ok(completed)
    }

    pub async fn submit_feedback(
        &self,
        mentee_id: Uuid,
        session_id: Uuid,
        rating: i16,
        comment: String,
    ) -> Result<Session, AppError> {
        let session = self
            .sessions
            .find(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        if session.mentee_id != mentee_id {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        if session.status != SessionStatus::Completed {
            return Err(AppError::Conflict(
                "Wait for mentor to complete the session before giving feedback".to_string(),
            ));
        }

        if session.mentee_feedback.is_some() {
            return Err(AppError::Conflict("Feedback already submitted".to_string()));
        }

        if comment.trim().is_empty() {
            return Err(AppError::Validation("Rating and comment are required".to_string()));
        }
        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation("Rating must be between 1 and 5".to_string()));
        }

        let feedback = MenteeFeedback { rating, comment };
        let updated = self
            .sessions
            .set_feedback(session_id, &feedback)
            .await?
            .ok_or_else(|| AppError::Conflict("Feedback already submitted".to_string()))?;

        tracing::info!("Feedback submitted for session {} by mentee {}", session_id, mentee_id);
        Ok(updated)
    }
}
