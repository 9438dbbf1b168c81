use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use mentormatch_common::{
    AppError, Availability, AvailabilitySlot, MenteeFeedback, MentorshipRequest, Session, User,
    UserProfile,
};

// Row types mirror the tables; statuses stay TEXT here and are parsed into
// the closed enums at the store boundary.

#[derive(Debug, Clone, FromRow)]
pub struct UserDb {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub profile: Option<Json<UserProfile>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserDb> for User {
    type Error = AppError;

    fn try_from(row: UserDb) -> Result<Self, Self::Error> {
        Ok(User {
            user_id: row.user_id,
            email: row.email,
            role: row.role.parse()?,
            profile: row.profile.map(|p| p.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AvailabilityDb {
    pub mentor_id: Uuid,
    pub slots: Json<Vec<AvailabilitySlot>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AvailabilityDb> for Availability {
    fn from(row: AvailabilityDb) -> Self {
        Availability {
            mentor_id: row.mentor_id,
            slots: row.slots.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MentorshipRequestDb {
    pub request_id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MentorshipRequestDb> for MentorshipRequest {
    type Error = AppError;

    fn try_from(row: MentorshipRequestDb) -> Result<Self, Self::Error> {
        Ok(MentorshipRequest {
            request_id: row.request_id,
            mentor_id: row.mentor_id,
            mentee_id: row.mentee_id,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SessionDb {
    pub session_id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub date: DateTime<Utc>,
    pub status: String,
    pub mentor_comment: Option<String>,
    pub feedback_rating: Option<i16>,
    pub feedback_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SessionDb> for Session {
    type Error = AppError;

    fn try_from(row: SessionDb) -> Result<Self, Self::Error> {
        let mentee_feedback = match (row.feedback_rating, row.feedback_comment) {
            (Some(rating), Some(comment)) => Some(MenteeFeedback { rating, comment }),
            _ => None,
        };

        Ok(Session {
            session_id: row.session_id,
            mentor_id: row.mentor_id,
            mentee_id: row.mentee_id,
            date: row.date,
            status: row.status.parse()?,
            mentor_comment: row.mentor_comment,
            mentee_feedback,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
