//! Shared fixtures for the integration tests: wire-shaped JSON bodies and
//! a session store + client pair wired to a wiremock server.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

use sportline_core::models::User;
use sportline_core::{ApiClient, SessionStore};

pub fn user_json(id: i64, display_name: &str) -> Value {
    json!({
        "id": id,
        "email": format!("user{id}@example.com"),
        "display_name": display_name,
        "is_active": true,
        "is_staff": false,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

pub fn auth_json(access: &str, refresh: &str) -> Value {
    json!({
        "user": user_json(1, "Pat"),
        "access": access,
        "refresh": refresh
    })
}

pub fn event_json(id: i64, is_public: bool) -> Value {
    json!({
        "id": id,
        "title": format!("Event {id}"),
        "description": "Weekly pickup game",
        "organizer": user_json(1, "Organizer"),
        "sport_type": {"id": 2, "name": "Football", "description": null, "icon_url": null},
        "event_type": {"id": 3, "name": "Friendly match", "description": null},
        "location": null,
        "custom_location_text": "Riverside pitch",
        "start_datetime": "2026-02-06T19:00:00+03:00",
        "end_datetime": null,
        "registration_deadline": null,
        "max_participants": 10,
        "current_participants_count": 4,
        "status": "ACTIVE",
        "is_public": is_public,
        "entry_fee": null,
        "contact_email": null,
        "contact_phone": null,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

pub fn registration_json(id: i64, event_id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "event": event_json(event_id, true),
        "user": user_json(1, "Pat"),
        "registration_datetime": "2026-01-15T10:00:00Z",
        "status": status,
        "notes_by_user": null
    })
}

pub fn page(results: Vec<Value>) -> Value {
    json!({
        "count": results.len(),
        "next": null,
        "previous": null,
        "results": results
    })
}

/// A fresh, signed-out session store on a temp dir. Keep the `TempDir`
/// alive for the duration of the test.
pub fn open_store() -> (TempDir, Arc<SessionStore>) {
    let dir = TempDir::new().expect("tempdir");
    let store = Arc::new(SessionStore::open(dir.path()).expect("open store"));
    (dir, store)
}

/// A store holding the given token pair and a cached user, as after login.
pub fn signed_in_store(access: &str, refresh: &str) -> (TempDir, Arc<SessionStore>) {
    let (dir, store) = open_store();
    store.save_tokens(access, refresh).expect("save tokens");
    let user: User = serde_json::from_value(user_json(1, "Pat")).expect("user");
    store.save_user(&user).expect("save user");
    (dir, store)
}

pub fn client_for(server: &MockServer, store: Arc<SessionStore>) -> ApiClient {
    ApiClient::new(server.uri(), store).expect("build client")
}
