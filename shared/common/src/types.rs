use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Mentor,
    Mentee,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Mentor => "MENTOR",
            UserRole::Mentee => "MENTEE",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ADMIN" => Ok(UserRole::Admin),
            "MENTOR" => Ok(UserRole::Mentor),
            "MENTEE" => Ok(UserRole::Mentee),
            other => Err(AppError::Internal(format!("Unknown user role: {}", other))),
        }
    }
}

/// Lifecycle of a mentorship request. The full status domain is a single
/// closed enum; which transitions are legal lives in [`RequestStatus::can_transition_to`],
/// not in field checks scattered across handlers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Scheduled,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Scheduled => "SCHEDULED",
            RequestStatus::Completed => "COMPLETED",
        }
    }

    /// Transition table. REJECTED and COMPLETED are terminal; anything not
    /// listed here is rejected with a Conflict by the services.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Rejected) | (Accepted, Scheduled) | (Scheduled, Completed)
        )
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PENDING" => Ok(RequestStatus::Pending),
            "ACCEPTED" => Ok(RequestStatus::Accepted),
            "REJECTED" => Ok(RequestStatus::Rejected),
            "SCHEDULED" => Ok(RequestStatus::Scheduled),
            "COMPLETED" => Ok(RequestStatus::Completed),
            other => Err(AppError::Internal(format!("Unknown request status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Scheduled,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "SCHEDULED",
            SessionStatus::Completed => "COMPLETED",
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "SCHEDULED" => Ok(SessionStatus::Scheduled),
            "COMPLETED" => Ok(SessionStatus::Completed),
            other => Err(AppError::Internal(format!("Unknown session status: {}", other))),
        }
    }
}

/// Day of the week as mentors declare it. Serialized as the English weekday
/// name on the wire and in the availability JSONB column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub fn num_days_from_sunday(&self) -> u32 {
        match self {
            DayOfWeek::Sunday => 0,
            DayOfWeek::Monday => 1,
            DayOfWeek::Tuesday => 2,
            DayOfWeek::Wednesday => 3,
            DayOfWeek::Thursday => 4,
            DayOfWeek::Friday => 5,
            DayOfWeek::Saturday => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Sunday",
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recurring weekly window during which a mentor accepts sessions.
/// Times are zero-padded 24-hour "HH:MM" strings interpreted as UTC;
/// such strings sort identically to their numeric time order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilitySlot {
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub mentor_id: Uuid,
    pub slots: Vec<AvailabilitySlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub goals: String,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub profile: Option<UserProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorshipRequest {
    pub request_id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mentee-authored rating and comment, attached once after completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenteeFeedback {
    pub rating: i16,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub date: DateTime<Utc>,
    pub status: SessionStatus,
    pub mentor_comment: Option<String>,
    pub mentee_feedback: Option<MenteeFeedback>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Common response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_status_allows_only_declared_transitions() {
        use RequestStatus::*;

        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Accepted.can_transition_to(Scheduled));
        assert!(Scheduled.can_transition_to(Completed));

        // Terminal states go nowhere.
        for next in [Pending, Accepted, Rejected, Scheduled, Completed] {
            assert!(!Rejected.can_transition_to(next));
            assert!(!Completed.can_transition_to(next));
        }

        // No skipping ahead or walking backwards.
        assert!(!Pending.can_transition_to(Scheduled));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Accepted.can_transition_to(Pending));
        assert!(!Accepted.can_transition_to(Completed));
        assert!(!Scheduled.can_transition_to(Accepted));
    }

    #[test]
    fn status_enums_round_trip_through_storage_strings() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Accepted,
            RequestStatus::Rejected,
            RequestStatus::Scheduled,
            RequestStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
        assert!("ARCHIVED".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn wire_tags_match_the_client_contract() {
        assert_eq!(serde_json::to_string(&UserRole::Mentor).unwrap(), "\"MENTOR\"");
        assert_eq!(serde_json::to_string(&RequestStatus::Pending).unwrap(), "\"PENDING\"");
        assert_eq!(serde_json::to_string(&DayOfWeek::Wednesday).unwrap(), "\"Wednesday\"");

        let slot: AvailabilitySlot =
            serde_json::from_str(r#"{"day_of_week":"Monday","start_time":"09:00","end_time":"10:00"}"#)
                .unwrap();
        assert_eq!(slot.day_of_week, DayOfWeek::Monday);
    }
}
