//! Session tracking business logic.

mod auth_service;

pub use auth_service::{AuthService, SessionTracker};
