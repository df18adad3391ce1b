//! API client for the sportline REST service.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! API requests: auth, profile, reference data, event CRUD, registrations,
//! and results.
//!
//! Every endpoint except login, registration, and token refresh goes
//! through the authenticated dispatch path: the stored access token is
//! attached as a bearer credential, and a 401 response triggers a single
//! token-refresh round trip followed by exactly one retry of the original
//! request. Refreshes are single-flight across concurrent calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::models::{
    AuthResponse, Event, EventCreate, EventResult, EventStatus, EventType, EventUpdate,
    Location, LoginRequest, NewLocation, Page, RegisterRequest, Registration,
    RegistrationRequest, RegistrationStatus, RegistrationStatusUpdate, ResultCreate,
    SportType, TokenRefreshRequest, TokenRefreshResponse, User, UserUpdate,
};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Query parameters for `GET events/`. `Default` is the unfiltered listing.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub sport_type: Option<i64>,
    pub event_type: Option<i64>,
    pub status: Option<EventStatus>,
    pub is_public: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub include_private: Option<bool>,
    pub city: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl EventFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.sport_type {
            pairs.push(("sport_type", id.to_string()));
        }
        if let Some(id) = self.event_type {
            pairs.push(("event_type", id.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(is_public) = self.is_public {
            pairs.push(("is_public", is_public.to_string()));
        }
        if let Some(ref search) = self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(ref ordering) = self.ordering {
            pairs.push(("ordering", ordering.clone()));
        }
        if let Some(include_private) = self.include_private {
            pairs.push(("include_private", include_private.to_string()));
        }
        if let Some(ref city) = self.city {
            pairs.push(("city", city.clone()));
        }
        if let Some(date) = self.date_from {
            pairs.push(("date_from", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.date_to {
            pairs.push(("date_to", date.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

struct ClientInner {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
    // Single-flight gate: concurrent 401s share one refresh round trip
    refresh_gate: Mutex<()>,
}

/// API client for the event platform.
/// Clone is cheap - the inner state (and reqwest's connection pool) is
/// shared behind an Arc.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Create a new API client against `base_url` (the versioned base path,
    /// e.g. `https://host/api`), reading and writing auth state through the
    /// given session store.
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url: String = base_url.into();
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                session,
                refresh_gate: Mutex::new(()),
            }),
        })
    }

    /// The session store this client reads tokens from.
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path)
    }

    // ===== Dispatch =====

    /// Dispatch without credentials. Only login, registration, and token
    /// refresh use this; keeping them off the authenticated path makes
    /// "these endpoints never carry a token" structural.
    async fn public_post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.inner.http.post(self.url(path)).json(body).send().await?;
        Self::into_json(response).await
    }

    /// Dispatch with the session's bearer token attached, refreshing the
    /// token and retrying once if the server rejects it with 401.
    async fn send_authed(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let retry = request.try_clone();

        let Some(token) = self.inner.session.access_token() else {
            // No token stored: proceed uncredentialed, some endpoints are
            // public and the server is the authority on which ones.
            debug!("No access token stored, dispatching without credentials");
            return Ok(request.send().await?);
        };

        let response = request.bearer_auth(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Received 401, attempting token refresh");
        drop(response);

        let Some(retry) = retry else {
            // Unreplayable body; nothing left to retry with.
            return Err(ApiError::Unauthorized);
        };

        let fresh = self.refreshed_token(&token).await?;
        Ok(retry.bearer_auth(&fresh).send().await?)
    }

    /// Obtain a fresh access token after a 401. The refresh gate makes this
    /// single-flight: the first caller performs the round trip, and callers
    /// that were queued behind it reuse the rotated token instead of
    /// spending a second one.
    async fn refreshed_token(&self, stale: &str) -> Result<String, ApiError> {
        let _gate = self.inner.refresh_gate.lock().await;

        if let Some(current) = self.inner.session.access_token() {
            if current != stale {
                debug!("Access token already rotated by a concurrent call");
                return Ok(current);
            }
        }

        let Some(refresh) = self.inner.session.refresh_token() else {
            warn!("401 with no refresh token held, session is unusable");
            return Err(ApiError::Unauthorized);
        };

        let access = self.call_refresh(&refresh).await?;
        self.inner.session.save_access_token(&access)?;
        Ok(access)
    }

    /// The raw token-refresh round trip, off the authenticated path so it
    /// can never recurse into itself.
    async fn call_refresh(&self, refresh: &str) -> Result<String, ApiError> {
        let response = self
            .inner
            .http
            .post(self.url("token/refresh/"))
            .json(&TokenRefreshRequest {
                refresh: refresh.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Token refresh rejected");
            return Err(ApiError::Unauthorized);
        }

        let body: TokenRefreshResponse = response.json().await?;
        debug!("Token refresh successful");
        Ok(body.access)
    }

    // ===== Typed helpers =====

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    async fn into_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send_authed(self.inner.http.get(self.url(path))).await?;
        Self::into_json(response).await
    }

    async fn get_json_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.inner.http.get(self.url(path)).query(query);
        let response = self.send_authed(request).await?;
        Self::into_json(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.inner.http.post(self.url(path)).json(body);
        let response = self.send_authed(request).await?;
        Self::into_json(response).await
    }

    async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.inner.http.put(self.url(path)).json(body);
        let response = self.send_authed(request).await?;
        Self::into_json(response).await
    }

    /// For endpoints answering 204 No Content (or any bodyless 2xx).
    async fn delete_no_content(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .send_authed(self.inner.http.delete(self.url(path)))
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    // ===== Authentication =====

    /// Register a new account. On success the returned token pair and
    /// profile are persisted, so the client is immediately signed in.
    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let request = RegisterRequest {
            email: email.to_string(),
            display_name: display_name.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self.public_post("users/register/", &request).await?;
        self.persist_login(&auth)?;
        Ok(auth)
    }

    /// Log in with email and password, persisting the session on success.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self.public_post("users/login/", &request).await?;
        self.persist_login(&auth)?;
        debug!(user = %auth.user.display_name, "Logged in");
        Ok(auth)
    }

    /// Explicitly renew the access token from the stored refresh token.
    /// The pipeline does this on demand; this is for callers that want to
    /// renew ahead of time.
    pub async fn refresh_session(&self) -> Result<(), ApiError> {
        let Some(refresh) = self.inner.session.refresh_token() else {
            return Err(ApiError::Unauthorized);
        };
        let access = self.call_refresh(&refresh).await?;
        self.inner.session.save_access_token(&access)?;
        Ok(())
    }

    /// Drop the local session. The server keeps no session state to clear.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.inner.session.clear()?;
        Ok(())
    }

    fn persist_login(&self, auth: &AuthResponse) -> Result<(), ApiError> {
        self.inner.session.save_tokens(&auth.access, &auth.refresh)?;
        self.inner.session.save_user(&auth.user)?;
        Ok(())
    }

    // ===== Current user =====

    /// Fetch the signed-in user's profile, updating the cached snapshot.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let user: User = self.get_json("users/me/").await?;
        self.inner.session.save_user(&user)?;
        Ok(user)
    }

    /// Partially update the signed-in user's profile.
    pub async fn update_current_user(&self, update: &UserUpdate) -> Result<User, ApiError> {
        let user: User = self.put_json("users/me/", update).await?;
        self.inner.session.save_user(&user)?;
        Ok(user)
    }

    // ===== Reference data =====

    pub async fn sport_types(&self) -> Result<Vec<SportType>, ApiError> {
        let page: Page<SportType> = self.get_json("sport-types/").await?;
        Ok(page.into_results())
    }

    pub async fn sport_type(&self, id: i64) -> Result<SportType, ApiError> {
        self.get_json(&format!("sport-types/{id}/")).await
    }

    pub async fn event_types(&self) -> Result<Vec<EventType>, ApiError> {
        let page: Page<EventType> = self.get_json("event-types/").await?;
        Ok(page.into_results())
    }

    pub async fn event_type(&self, id: i64) -> Result<EventType, ApiError> {
        self.get_json(&format!("event-types/{id}/")).await
    }

    pub async fn locations(&self, city: Option<&str>) -> Result<Vec<Location>, ApiError> {
        let mut query = Vec::new();
        if let Some(city) = city {
            query.push(("city", city.to_string()));
        }
        let page: Page<Location> = self.get_json_query("locations/", &query).await?;
        Ok(page.into_results())
    }

    pub async fn create_location(&self, location: &NewLocation) -> Result<Location, ApiError> {
        self.post_json("locations/", location).await
    }

    pub async fn location(&self, id: i64) -> Result<Location, ApiError> {
        self.get_json(&format!("locations/{id}/")).await
    }

    // ===== Events =====

    /// List events matching a filter. The pagination envelope is unwrapped;
    /// callers get the items.
    pub async fn events(&self, filter: &EventFilter) -> Result<Vec<Event>, ApiError> {
        let page: Page<Event> = self
            .get_json_query("events/", &filter.query_pairs())
            .await?;
        Ok(page.into_results())
    }

    pub async fn event(&self, id: i64) -> Result<Event, ApiError> {
        self.get_json(&format!("events/{id}/")).await
    }

    pub async fn create_event(&self, event: &EventCreate) -> Result<Event, ApiError> {
        self.post_json("events/", event).await
    }

    pub async fn update_event(&self, id: i64, update: &EventUpdate) -> Result<Event, ApiError> {
        self.put_json(&format!("events/{id}/"), update).await
    }

    pub async fn delete_event(&self, id: i64) -> Result<(), ApiError> {
        self.delete_no_content(&format!("events/{id}/")).await
    }

    // ===== Registrations =====

    pub async fn register_for_event(
        &self,
        event_id: i64,
        request: &RegistrationRequest,
    ) -> Result<Registration, ApiError> {
        self.post_json(&format!("events/{event_id}/register/"), request)
            .await
    }

    pub async fn unregister_from_event(&self, event_id: i64) -> Result<(), ApiError> {
        self.delete_no_content(&format!("events/{event_id}/unregister/"))
            .await
    }

    /// Participants of one event. Unlike the other list endpoints this one
    /// answers a plain array, not a pagination envelope.
    pub async fn event_registrations(&self, event_id: i64) -> Result<Vec<Registration>, ApiError> {
        self.get_json(&format!("events/{event_id}/registrations/"))
            .await
    }

    /// The signed-in user's own registrations.
    pub async fn my_registrations(&self) -> Result<Vec<Registration>, ApiError> {
        let page: Page<Registration> = self.get_json("registrations/").await?;
        Ok(page.into_results())
    }

    pub async fn registration(&self, id: i64) -> Result<Registration, ApiError> {
        self.get_json(&format!("registrations/{id}/")).await
    }

    pub async fn update_registration_status(
        &self,
        id: i64,
        status: RegistrationStatus,
    ) -> Result<Registration, ApiError> {
        self.put_json(
            &format!("registrations/{id}/status/"),
            &RegistrationStatusUpdate { status },
        )
        .await
    }

    // ===== Results =====

    pub async fn add_event_result(
        &self,
        event_id: i64,
        result: &ResultCreate,
    ) -> Result<EventResult, ApiError> {
        self.post_json(&format!("events/{event_id}/add_result/"), result)
            .await
    }

    /// Recorded results, optionally narrowed to one event.
    pub async fn results(&self, event_id: Option<i64>) -> Result<Vec<EventResult>, ApiError> {
        let mut query = Vec::new();
        if let Some(id) = event_id {
            query.push(("event_id", id.to_string()));
        }
        let page: Page<EventResult> = self.get_json_query("results/", &query).await?;
        Ok(page.into_results())
    }
}
