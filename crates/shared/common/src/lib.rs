//! Common utilities shared by the user and session crates.
//!
//! This crate provides:
//! - Unified error handling
//! - Configuration loaded from the environment
//! - Key-value storage backends

pub mod config;
pub mod error;
pub mod storage;

pub use config::{AppConfig, LoadPolicy};
pub use error::{AppError, AppResult, OptionExt};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockKeyValueStore;
