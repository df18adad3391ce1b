use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub details: Option<String>,
    pub created_by_user: Option<i64>,
}

/// Payload for `POST locations/`. The server assigns `id` and
/// `created_by_user` from the authenticated caller.
#[derive(Debug, Clone, Serialize)]
pub struct NewLocation {
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Location {
    pub fn display_line(&self) -> String {
        format!("{} ({}, {})", self.name, self.address, self.city)
    }
}
