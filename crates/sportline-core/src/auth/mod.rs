//! Authentication state: the persisted session and remembered credentials.
//!
//! This module provides:
//! - `SessionStore`: the token pair and cached profile, persisted to disk
//! - `CredentialStore`: optional OS-keychain storage for a remembered login
//!
//! The session file holds tokens only; passwords never reach it.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{SessionStore, StoreError};
