use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{EventType, Location, SportType, User};

/// Lifecycle status of an event, as stored server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Draft,
    Active,
    Completed,
    Cancelled,
}

impl EventStatus {
    /// Wire value, as sent in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "DRAFT",
            EventStatus::Active => "ACTIVE",
            EventStatus::Completed => "COMPLETED",
            EventStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Draft => write!(f, "Draft"),
            EventStatus::Active => write!(f, "Active"),
            EventStatus::Completed => write!(f, "Completed"),
            EventStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub organizer: User,
    pub sport_type: SportType,
    pub event_type: EventType,
    pub location: Option<Location>,
    pub custom_location_text: Option<String>,
    pub start_datetime: String,
    pub end_datetime: Option<String>,
    pub registration_deadline: Option<String>,
    pub max_participants: Option<i64>,
    pub current_participants_count: i64,
    pub status: EventStatus,
    pub is_public: bool,
    // Decimal fields arrive as strings, e.g. "12.50"
    pub entry_fee: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Event {
    /// Parsed start time, if the server sent a well-formed RFC 3339 datetime.
    pub fn starts_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.start_datetime).ok()
    }

    /// "Feb 06, 2026 @ 07:00 PM", falling back to the raw wire string.
    pub fn formatted_start(&self) -> String {
        match self.starts_at() {
            Some(dt) => dt.format("%b %d, %Y @ %I:%M %p").to_string(),
            None => self.start_datetime.chars().take(16).collect(),
        }
    }

    pub fn is_full(&self) -> bool {
        match self.max_participants {
            Some(max) => self.current_participants_count >= max,
            None => false,
        }
    }

    /// Remaining capacity, if the event has a participant limit.
    pub fn spots_left(&self) -> Option<i64> {
        self.max_participants
            .map(|max| (max - self.current_participants_count).max(0))
    }

    /// Where the event takes place: a known location, free-form text, or TBD.
    pub fn location_display(&self) -> String {
        if let Some(ref loc) = self.location {
            return loc.display_line();
        }
        match self.custom_location_text {
            Some(ref text) if !text.is_empty() => text.clone(),
            _ => "TBD".to_string(),
        }
    }
}

/// Payload for `POST events/`.
#[derive(Debug, Clone, Serialize)]
pub struct EventCreate {
    pub title: String,
    pub description: String,
    pub sport_type_id: i64,
    pub event_type_id: i64,
    pub location_id: Option<i64>,
    pub custom_location_text: Option<String>,
    pub start_datetime: String,
    pub end_datetime: Option<String>,
    pub registration_deadline: Option<String>,
    pub max_participants: Option<i64>,
    pub status: EventStatus,
    pub is_public: bool,
    pub entry_fee: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// Partial payload for `PUT events/{id}/`.
/// Fields left as `None` are omitted from the request body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_location_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}
