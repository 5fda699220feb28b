//! Commands module - CLI command implementations.
//!
//! Each command returns the text to print on success.

pub mod session;
pub mod users;

use std::sync::Arc;

use auth_service_lib::AuthService;
use common::{AppConfig, AppResult, FileStore, KeyValueStore};
use user_service_lib::UserRepository;

use crate::cli::Commands;

/// Services shared by every command
pub struct AppContext {
    pub users: Arc<dyn UserRepository>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Open the file store named by `config` and wire the services over it
    pub fn open(config: &AppConfig) -> AppResult<Self> {
        let store = Arc::new(FileStore::open(&config.data_file, config.load_policy)?);
        tracing::debug!(path = %store.path().display(), "Using file store");
        Self::with_store(store, config)
    }

    /// Wire the services over an existing store
    pub fn with_store(store: Arc<dyn KeyValueStore>, config: &AppConfig) -> AppResult<Self> {
        let users = user_service_lib::open_repository(store.clone(), config)?;
        let auth = auth_service_lib::session_tracker(users.clone(), store);
        Ok(Self { users, auth })
    }
}

/// Dispatch a parsed command
pub fn execute(ctx: &AppContext, command: Commands) -> AppResult<String> {
    match command {
        Commands::Login(args) => session::login(ctx, args),
        Commands::Logout => session::logout(ctx),
        Commands::Whoami => session::whoami(ctx),
        Commands::Users(args) => users::execute(ctx, args.action),
    }
}
