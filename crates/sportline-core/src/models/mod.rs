//! Data models for the sportline API.
//!
//! This module contains the data structures exchanged with the event
//! platform's REST API:
//!
//! - `User` and the auth request/response payloads
//! - `Event`, `EventCreate`, `EventUpdate`: event CRUD types
//! - `Registration`: event registration lifecycle
//! - `EventResult`: recorded results for finished events
//! - `SportType`, `EventType`, `Location`: reference data
//! - `Page`: the pagination envelope wrapping every list endpoint

pub mod event;
pub mod location;
pub mod page;
pub mod reference;
pub mod registration;
pub mod result;
pub mod user;

pub use event::{Event, EventCreate, EventStatus, EventUpdate};
pub use location::{Location, NewLocation};
pub use page::Page;
pub use reference::{EventType, SportType};
pub use registration::{
    Registration, RegistrationRequest, RegistrationStatus, RegistrationStatusUpdate,
};
pub use result::{EventResult, ResultCreate};
pub use user::{
    AuthResponse, LoginRequest, RegisterRequest, TokenRefreshRequest, TokenRefreshResponse, User,
    UserUpdate,
};
