//! Storage traits injected into the services. The Postgres implementation
//! backs the running service; the in-memory implementation backs the test
//! suite. Uniqueness and conditional-write semantics are part of the trait
//! contract, not an implementation detail: concurrent writers must fail
//! deterministically at the store, never silently duplicate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use mentormatch_common::{
    AppError, Availability, AvailabilitySlot, MenteeFeedback, MentorshipRequest, RequestStatus,
    Session, User, UserProfile, UserRole,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with Conflict when the email is already registered.
    async fn insert(&self, user: &User) -> Result<(), AppError>;
    async fn find(&self, user_id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, AppError>;
    async fn update_role(&self, user_id: Uuid, role: UserRole) -> Result<Option<User>, AppError>;
    async fn update_profile(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
    ) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Full-collection upsert: the stored slot list is replaced wholesale.
    async fn upsert(&self, mentor_id: Uuid, slots: &[AvailabilitySlot])
        -> Result<Availability, AppError>;
    async fn find(&self, mentor_id: Uuid) -> Result<Option<Availability>, AppError>;
    async fn delete(&self, mentor_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Fails with Conflict when a PENDING request for the same pair exists.
    async fn insert(&self, request: &MentorshipRequest) -> Result<(), AppError>;
    async fn find(&self, request_id: Uuid) -> Result<Option<MentorshipRequest>, AppError>;
    async fn find_by_pair(
        &self,
        mentor_id: Uuid,
        mentee_id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<MentorshipRequest>, AppError>;
    async fn list_for_mentee(&self, mentee_id: Uuid) -> Result<Vec<MentorshipRequest>, AppError>;
    async fn list_for_mentor(&self, mentor_id: Uuid) -> Result<Vec<MentorshipRequest>, AppError>;
    async fn list_all(&self) -> Result<Vec<MentorshipRequest>, AppError>;
    async fn update_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<MentorshipRequest>, AppError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find(&self, session_id: Uuid) -> Result<Option<Session>, AppError>;
    async fn exists_booking(
        &self,
        mentor_id: Uuid,
        mentee_id: Uuid,
        date: DateTime<Utc>,
    ) -> Result<bool, AppError>;
    /// Sessions where the user is mentor or mentee, ordered by date ascending.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Session>, AppError>;
    /// Completed sessions, most recent first.
    async fn list_completed(&self) -> Result<Vec<Session>, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
    /// Persists the whole batch and flips the originating request
    /// ACCEPTED -> SCHEDULED in a single all-or-nothing write. A duplicate
    /// (mentor, mentee, date) anywhere in the batch fails the entire call
    /// with Conflict and leaves nothing behind.
    async fn insert_scheduled_batch(
        &self,
        request_id: Uuid,
        sessions: &[Session],
    ) -> Result<(), AppError>;
    /// Conditional write: succeeds only while the session is SCHEDULED.
    /// Returns None when the precondition no longer holds.
    async fn complete(
        &self,
        session_id: Uuid,
        mentor_comment: Option<String>,
    ) -> Result<Option<Session>, AppError>;
    /// Conditional write: succeeds only while the session is COMPLETED and
    /// feedback is unset. Returns None when the precondition no longer holds.
    async fn set_feedback(
        &self,
        session_id: Uuid,
        feedback: &MenteeFeedback,
    ) -> Result<Option<Session>, AppError>;
}
