use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use mentormatch_common::{
    AppError, Availability, AvailabilitySlot, MenteeFeedback, MentorshipRequest, RequestStatus,
    Session, SessionStatus, User, UserProfile, UserRole,
};
use mentormatch_database::{AvailabilityDb, MentorshipRequestDb, SessionDb, UserDb};

use super::{AvailabilityStore, RequestStore, SessionStore, UserStore};

/// Postgres-backed implementation of all four store traits. Uniqueness rests
/// on the indexes created by the migrations; the constraint names below must
/// stay in sync with them.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.constraint() == Some(constraint),
        _ => false,
    }
}

const USER_COLUMNS: &str = "user_id, email, role, profile, created_at, updated_at";
const REQUEST_COLUMNS: &str = "request_id, mentor_id, mentee_id, status, created_at, updated_at";
const SESSION_COLUMNS: &str = "session_id, mentor_id, mentee_id, date, status, mentor_comment, \
     feedback_rating, feedback_comment, created_at, updated_at";

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, email, role, profile, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.profile.as_ref().map(Json))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "uq_users_email") {
                AppError::Conflict("Email already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(User::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at"
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_role(&self, user_id: Uuid, role: UserRole) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "UPDATE users SET role = $2, updated_at = $3 WHERE user_id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(User::try_from).transpose()
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
    ) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "UPDATE users SET profile = $2, updated_at = $3 WHERE user_id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(Json(profile))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl AvailabilityStore for PgStore {
    async fn upsert(
        &self,
        mentor_id: Uuid,
        slots: &[AvailabilitySlot],
    ) -> Result<Availability, AppError> {
        let row = sqlx::query_as::<_, AvailabilityDb>(
            r#"
            INSERT INTO availability (mentor_id, slots, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (mentor_id)
            DO UPDATE SET slots = EXCLUDED.slots, updated_at = EXCLUDED.updated_at
            RETURNING mentor_id, slots, created_at, updated_at
            "#,
        )
        .bind(mentor_id)
        .bind(Json(slots))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.into())
    }

    async fn find(&self, mentor_id: Uuid) -> Result<Option<Availability>, AppError> {
        let row = sqlx::query_as::<_, AvailabilityDb>(
            "SELECT mentor_id, slots, created_at, updated_at FROM availability WHERE mentor_id = $1",
        )
        .bind(mentor_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.map(Availability::from))
    }

    async fn delete(&self, mentor_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM availability WHERE mentor_id = $1")
            .bind(mentor_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }
}

#[async_trait]
impl RequestStore for PgStore {
    async fn insert(&self, request: &MentorshipRequest) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO mentorship_requests (request_id, mentor_id, mentee_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(request.request_id)
        .bind(request.mentor_id)
        .bind(request.mentee_id)
        .bind(request.status.as_str())
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "uq_requests_pending") {
                AppError::Conflict("Request already pending".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn find(&self, request_id: Uuid) -> Result<Option<MentorshipRequest>, AppError> {
        let row = sqlx::query_as::<_, MentorshipRequestDb>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM mentorship_requests WHERE request_id = $1"
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(MentorshipRequest::try_from).transpose()
    }

    async fn find_by_pair(
        &self,
        mentor_id: Uuid,
        mentee_id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<MentorshipRequest>, AppError> {
        let row = sqlx::query_as::<_, MentorshipRequestDb>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM mentorship_requests \
             WHERE mentor_id = $1 AND mentee_id = $2 AND status = $3"
        ))
        .bind(mentor_id)
        .bind(mentee_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(MentorshipRequest::try_from).transpose()
    }

    async fn list_for_mentee(&self, mentee_id: Uuid) -> Result<Vec<MentorshipRequest>, AppError> {
        let rows = sqlx::query_as::<_, MentorshipRequestDb>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM mentorship_requests \
             WHERE mentee_id = $1 ORDER BY created_at DESC"
        ))
        .bind(mentee_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(MentorshipRequest::try_from).collect()
    }

    async fn list_for_mentor(&self, mentor_id: Uuid) -> Result<Vec<MentorshipRequest>, AppError> {
        let rows = sqlx::query_as::<_, MentorshipRequestDb>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM mentorship_requests \
             WHERE mentor_id = $1 ORDER BY created_at DESC"
        ))
        .bind(mentor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(MentorshipRequest::try_from).collect()
    }

    async fn list_all(&self) -> Result<Vec<MentorshipRequest>, AppError> {
        let rows = sqlx::query_as::<_, MentorshipRequestDb>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM mentorship_requests ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(MentorshipRequest::try_from).collect()
    }

    async fn update_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<MentorshipRequest>, AppError> {
        let row = sqlx::query_as::<_, MentorshipRequestDb>(&format!(
            "UPDATE mentorship_requests SET status = $2, updated_at = $3 \
             WHERE request_id = $1 RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(request_id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(MentorshipRequest::try_from).transpose()
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn find(&self, session_id: Uuid) -> Result<Option<Session>, AppError> {
        let row = sqlx::query_as::<_, SessionDb>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(Session::try_from).transpose()
    }

    async fn exists_booking(
        &self,
        mentor_id: Uuid,
        mentee_id: Uuid,
        date: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sessions WHERE mentor_id = $1 AND mentee_id = $2 AND date = $3)",
        )
        .bind(mentor_id)
        .bind(mentee_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(exists)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Session>, AppError> {
        let rows = sqlx::query_as::<_, SessionDb>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions \
             WHERE mentor_id = $1 OR mentee_id = $1 ORDER BY date ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(Session::try_from).collect()
    }

    async fn list_completed(&self) -> Result<Vec<Session>, AppError> {
        let rows = sqlx::query_as::<_, SessionDb>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE status = $1 ORDER BY date DESC"
        ))
        .bind(SessionStatus::Completed.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(Session::try_from).collect()
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sessions")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn insert_scheduled_batch(
        &self,
        request_id: Uuid,
        sessions: &[Session],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        for session in sessions {
            sqlx::query(
                r#"
                INSERT INTO sessions (session_id, mentor_id, mentee_id, date, status, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(session.session_id)
            .bind(session.mentor_id)
            .bind(session.mentee_id)
            .bind(session.date)
            .bind(session.status.as_str())
            .bind(session.created_at)
            .bind(session.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if violates(&e, "uq_sessions_booking") {
                    AppError::Conflict(format!(
                        "A session with this mentor is already booked on {}",
                        session.date.format("%Y-%m-%d %H:%M")
                    ))
                } else {
                    AppError::Database(e)
                }
            })?;
        }

        sqlx::query(
            "UPDATE mentorship_requests SET status = $2, updated_at = $3 WHERE request_id = $1",
        )
        .bind(request_id)
        .bind(RequestStatus::Scheduled.as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn complete(
        &self,
        session_id: Uuid,
        mentor_comment: Option<String>,
    ) -> Result<Option<Session>, AppError> {
        let row = sqlx::query_as::<_, SessionDb>(&format!(
            "UPDATE sessions SET status = $2, mentor_comment = $3, updated_at = $4 \
             WHERE session_id = $1 AND status = $5 RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .bind(SessionStatus::Completed.as_str())
        .bind(mentor_comment)
        .bind(Utc::now())
        .bind(SessionStatus::Scheduled.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(Session::try_from).transpose()
    }

    async fn set_feedback(
        &self,
        session_id: Uuid,
        feedback: &MenteeFeedback,
    ) -> Result<Option<Session>, AppError> {
        let row = sqlx::query_as::<_, SessionDb>(&format!(
            "UPDATE sessions SET feedback_rating = $2, feedback_comment = $3, updated_at = $4 \
             WHERE session_id = $1 AND status = $5 AND feedback_rating IS NULL \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .bind(Utc::now())
        .bind(SessionStatus::Completed.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(Session::try_from).transpose()
    }
}
