//! Core library for the sportline event platform client.
//!
//! Everything a frontend needs to talk to the platform:
//!
//! - `auth`: the persisted session (token pair + cached profile) and
//!   optional keychain-remembered credentials
//! - `api`: the REST client with transparent bearer-token refresh on 401
//! - `models`: the wire types (users, events, registrations, results,
//!   reference data, pagination envelope)
//! - `feed`: the aggregated public event listing with multi-select filters
//! - `config`: config file handling and platform directories

pub mod api;
pub mod auth;
pub mod config;
pub mod feed;
pub mod models;

pub use api::{ApiClient, ApiError, EventFilter};
pub use auth::{CredentialStore, SessionStore, StoreError};
pub use config::Config;
pub use feed::{EventFeed, FeedFilters, FeedStatus};
