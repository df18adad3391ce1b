use serde::{Deserialize, Serialize};

use super::{Event, User};

/// A recorded outcome for a finished event: a placement, a score, or a
/// free-form achievement, attributed to a participant or a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResult {
    pub id: i64,
    pub event: Event,
    pub participant_user: Option<User>,
    pub team_name_if_applicable: Option<String>,
    pub position: Option<i64>,
    pub score: Option<String>,
    pub achievement_description: Option<String>,
    pub recorded_by_user: User,
    pub recorded_at: String,
}

impl EventResult {
    /// Who the result belongs to: the participant's name or the team name.
    pub fn subject(&self) -> String {
        if let Some(ref user) = self.participant_user {
            return user.display_name.clone();
        }
        self.team_name_if_applicable
            .clone()
            .unwrap_or_else(|| "Unattributed".to_string())
    }
}

/// Payload for `POST events/{id}/add_result/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultCreate {
    pub participant_user_id: Option<i64>,
    pub team_name_if_applicable: Option<String>,
    pub position: Option<i64>,
    pub score: Option<String>,
    pub achievement_description: Option<String>,
}
