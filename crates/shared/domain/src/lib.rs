//! Domain layer - User records and the rules that govern them.
//!
//! This crate has no storage dependencies. The repository and session
//! crates build on the types defined here.

pub mod constants;
pub mod error;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use user::{User, UserForm, UserId};
