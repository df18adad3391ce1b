//! REST API client module for the sportline event platform.
//!
//! This module provides the `ApiClient` for talking to the platform's
//! versioned JSON API: authentication, profile, reference data, event CRUD,
//! registrations, and results.
//!
//! The API uses JWT bearer token authentication. Expired access tokens are
//! renewed transparently: a 401 triggers one token-refresh round trip and
//! one retry of the original request (see `client`).

pub mod client;
pub mod error;

pub use client::{ApiClient, EventFilter};
pub use error::ApiError;
