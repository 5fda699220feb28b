//! Session tracker - Handles sign-in state.
//!
//! SOLID (SRP): Owns the session marker only. Credential checks are
//! delegated to the user repository.

use std::sync::Arc;

use tracing::{debug, info};

use common::{AppError, AppResult, KeyValueStore};
use domain::{DomainError, User, MSG_MISSING_CREDENTIALS, SESSION_STORAGE_KEY};
use user_service_lib::UserRepository;

/// Authentication service trait for dependency injection.
pub trait AuthService: Send + Sync {
    /// Whether a session marker is present
    fn is_authenticated(&self) -> AppResult<bool>;

    /// Username held by the session marker
    fn authenticated_username(&self) -> AppResult<Option<String>>;

    /// Check credentials and, on success, record the matched username
    fn login(&self, username: &str, password: &str) -> AppResult<User>;

    /// Clear the session marker
    fn logout(&self) -> AppResult<()>;
}

/// Concrete implementation of AuthService keeping the marker in a [`KeyValueStore`].
pub struct SessionTracker {
    users: Arc<dyn UserRepository>,
    store: Arc<dyn KeyValueStore>,
}

impl SessionTracker {
    /// Create new session tracker instance
    pub fn new(users: Arc<dyn UserRepository>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { users, store }
    }
}

impl AuthService for SessionTracker {
    fn is_authenticated(&self) -> AppResult<bool> {
        Ok(self.authenticated_username()?.is_some())
    }

    fn authenticated_username(&self) -> AppResult<Option<String>> {
        let marker = self.store.get(SESSION_STORAGE_KEY)?;
        Ok(marker.filter(|username| !username.is_empty()))
    }

    fn login(&self, username: &str, password: &str) -> AppResult<User> {
        let (username, password) = (username.trim(), password.trim());
        if username.is_empty() || password.is_empty() {
            return Err(AppError::validation(MSG_MISSING_CREDENTIALS));
        }

        let Some(user) = self.users.find_by_credentials(username, password)? else {
            debug!(username, "Login rejected");
            return Err(DomainError::InvalidCredentials.into());
        };

        // The stored spelling is recorded, not the caller's input
        self.store.set(SESSION_STORAGE_KEY, &user.username)?;
        info!(user_id = user.id, username = %user.username, "Signed in");
        Ok(user)
    }

    fn logout(&self) -> AppResult<()> {
        self.store.remove(SESSION_STORAGE_KEY)?;
        info!("Signed out");
        Ok(())
    }
}
