use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use mentormatch_common::{
    AppError, Availability, AvailabilitySlot, MenteeFeedback, MentorshipRequest, RequestStatus,
    Session, SessionStatus, User, UserProfile, UserRole,
};

use super::{AvailabilityStore, RequestStore, SessionStore, UserStore};

/// In-process store used by the test suite. Mirrors the uniqueness and
/// conditional-write semantics of the Postgres implementation so the
/// services behave identically against either.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    availability: HashMap<Uuid, Availability>,
    requests: HashMap<Uuid, MentorshipRequest>,
    sessions: HashMap<Uuid, Session>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
        inner.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.inner.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.inner.lock().unwrap().users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self
            .inner
            .lock()
            .unwrap()
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_role(&self, user_id: Uuid, role: UserRole) -> Result<Option<User>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.users.get_mut(&user_id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
    ) -> Result<Option<User>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.users.get_mut(&user_id).map(|user| {
            user.profile = Some(profile.clone());
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn upsert(
        &self,
        mentor_id: Uuid,
        slots: &[AvailabilitySlot],
    ) -> Result<Availability, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let record = inner
            .availability
            .entry(mentor_id)
            .and_modify(|a| {
                a.slots = slots.to_vec();
                a.updated_at = now;
            })
            .or_insert_with(|| Availability {
                mentor_id,
                slots: slots.to_vec(),
                created_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }

    async fn find(&self, mentor_id: Uuid) -> Result<Option<Availability>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .availability
            .get(&mentor_id)
            .cloned())
    }

    async fn delete(&self, mentor_id: Uuid) -> Result<(), AppError> {
        self.inner.lock().unwrap().availability.remove(&mentor_id);
        Ok(())
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert(&self, request: &MentorshipRequest) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if request.status == RequestStatus::Pending
            && inner.requests.values().any(|r| {
                r.mentor_id == request.mentor_id
                    && r.mentee_id == request.mentee_id
                    && r.status == RequestStatus::Pending
            })
        {
            return Err(AppError::Conflict("Request already pending".to_string()));
        }
        inner.requests.insert(request.request_id, request.clone());
        Ok(())
    }

    async fn find(&self, request_id: Uuid) -> Result<Option<MentorshipRequest>, AppError> {
        Ok(self.inner.lock().unwrap().requests.get(&request_id).cloned())
    }

    async fn find_by_pair(
        &self,
        mentor_id: Uuid,
        mentee_id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<MentorshipRequest>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .requests
            .values()
            .find(|r| r.mentor_id == mentor_id && r.mentee_id == mentee_id && r.status == status)
            .cloned())
    }

    async fn list_for_mentee(&self, mentee_id: Uuid) -> Result<Vec<MentorshipRequest>, AppError> {
        let mut requests: Vec<MentorshipRequest> = self
            .inner
            .lock()
            .unwrap()
            .requests
            .values()
            .filter(|r| r.mentee_id == mentee_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn list_for_mentor(&self, mentor_id: Uuid) -> Result<Vec<MentorshipRequest>, AppError> {
        let mut requests: Vec<MentorshipRequest> = self
            .inner
            .lock()
            .unwrap()
            .requests
            .values()
            .filter(|r| r.mentor_id == mentor_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn list_all(&self) -> Result<Vec<MentorshipRequest>, AppError> {
        let mut requests: Vec<MentorshipRequest> =
            self.inner.lock().unwrap().requests.values().cloned().collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn update_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<MentorshipRequest>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.requests.get_mut(&request_id).map(|request| {
            request.status = status;
            request.updated_at = Utc::now();
            request.clone()
        }))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn find(&self, session_id: Uuid) -> Result<Option<Session>, AppError> {
        Ok(self.inner.lock().unwrap().sessions.get(&session_id).cloned())
    }

    async fn exists_booking(
        &self,
        mentor_id: Uuid,
        mentee_id: Uuid,
        date: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        Ok(self.inner.lock().unwrap().sessions.values().any(|s| {
            s.mentor_id == mentor_id && s.mentee_id == mentee_id && s.date == date
        }))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Session>, AppError> {
        let mut sessions: Vec<Session> = self
            .inner
            .lock()
            .unwrap()
            .sessions
            .values()
            .filter(|s| s.mentor_id == user_id || s.mentee_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.date);
        Ok(sessions)
    }

    async fn list_completed(&self) -> Result<Vec<Session>, AppError> {
        let mut sessions: Vec<Session> = self
            .inner
            .lock()
            .unwrap()
            .sessions
            .values()
            .filter(|s| s.status == SessionStatus::Completed)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sessions)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.inner.lock().unwrap().sessions.len() as i64)
    }

    async fn insert_scheduled_batch(
        &self,
        request_id: Uuid,
        sessions: &[Session],
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();

        // Validate the whole batch before touching anything, so a late
        // duplicate cannot leave a partial write behind. The batch itself
        // counts too, like the unique index would.
        for (index, session) in sessions.iter().enumerate() {
            let clashes_stored = inner.sessions.values().any(|s| {
                s.mentor_id == session.mentor_id
                    && s.mentee_id == session.mentee_id
                    && s.date == session.date
            });
            let clashes_batch = sessions[..index].iter().any(|s| {
                s.mentor_id == session.mentor_id
                    && s.mentee_id == session.mentee_id
                    && s.date == session.date
            });
            if clashes_stored || clashes_batch {
                return Err(AppError::Conflict(format!(
                    "A session with this mentor is already booked on {}",
                    session.date.format("%Y-%m-%d %H:%M")
                )));
            }
        }

        for session in sessions {
            inner.sessions.insert(session.session_id, session.clone());
        }

        if let Some(request) = inner.requests.get_mut(&request_id) {
            request.status = RequestStatus::Scheduled;
            request.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn complete(
        &self,
        session_id: Uuid,
        mentor_comment: Option<String>,
    ) -> Result<Option<Session>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner
            .sessions
            .get_mut(&session_id)
            .filter(|s| s.status == SessionStatus::Scheduled)
            .map(|session| {
                session.status = SessionStatus::Completed;
                session.mentor_comment = mentor_comment;
                session.updated_at = Utc::now();
                session.clone()
            }))
    }

    async fn set_feedback(
        &self,
        session_id: Uuid,
        feedback: &MenteeFeedback,
    ) -> Result<Option<Session>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner
            .sessions
            .get_mut(&session_id)
            .filter(|s| s.status == SessionStatus::Completed && s.mentee_feedback.is_none())
            .map(|session| {
                session.mentee_feedback = Some(feedback.clone());
                session.updated_at = Utc::now();
                session.clone()
            }))
    }
}
