//! Auth Service Library
//!
//! Tracks which user is signed in by keeping a single session marker in
//! the key-value store. Credentials are checked against the user
//! repository.

pub mod service;

use std::sync::Arc;

use common::KeyValueStore;
use user_service_lib::UserRepository;

pub use crate::service::{AuthService, SessionTracker};

/// Build the session tracker shared by the command handlers.
pub fn session_tracker(
    users: Arc<dyn UserRepository>,
    store: Arc<dyn KeyValueStore>,
) -> Arc<dyn AuthService> {
    Arc::new(SessionTracker::new(users, store))
}
