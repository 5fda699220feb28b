//! User Service Library
//!
//! This crate owns the canonical collection of user records and persists
//! it through an injected key-value store.

pub mod repository;

use std::sync::Arc;

use common::{AppConfig, AppResult, KeyValueStore};

pub use crate::repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use crate::repository::MockUserRepository;

/// Open the user repository over `store` with the configured load policy.
pub fn open_repository(
    store: Arc<dyn KeyValueStore>,
    config: &AppConfig,
) -> AppResult<Arc<dyn UserRepository>> {
    let repo = UserStore::open(store, config.load_policy)?;
    Ok(Arc::new(repo))
}
