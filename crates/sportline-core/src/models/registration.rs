use serde::{Deserialize, Serialize};

use super::{Event, User};

/// Status of a participant's registration for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Pending,
    Confirmed,
    Attended,
    Cancelled,
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStatus::Pending => write!(f, "Pending"),
            RegistrationStatus::Confirmed => write!(f, "Confirmed"),
            RegistrationStatus::Attended => write!(f, "Attended"),
            RegistrationStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub id: i64,
    pub event: Event,
    pub user: User,
    pub registration_datetime: String,
    pub status: RegistrationStatus,
    pub notes_by_user: Option<String>,
}

/// Payload for `POST events/{id}/register/`. `user_id` is only honored for
/// organizers registering someone else; participants leave it unset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_by_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationStatusUpdate {
    pub status: RegistrationStatus,
}
