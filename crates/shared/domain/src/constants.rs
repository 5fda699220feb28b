//! Domain-level constants.
//!
//! Storage layout and the record seeded into an empty store.

// =============================================================================
// Storage Keys
// =============================================================================

/// Key holding the JSON array of user records
pub const USERS_STORAGE_KEY: &str = "crud_usuarios";

/// Key holding the authenticated username
pub const SESSION_STORAGE_KEY: &str = "crud_auth_user";

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier given to the first record of an empty collection
pub const FIRST_USER_ID: u64 = 1;

// =============================================================================
// Seed Record
// =============================================================================

pub const SEED_FIRST_NAME: &str = "Admin";
pub const SEED_LAST_NAME: &str = "General";
/// Join date of the seed record as (year, month, day)
pub const SEED_JOIN_DATE: (i32, u32, u32) = (2025, 1, 1);
pub const SEED_USERNAME: &str = "admin";
pub const SEED_PASSWORD: &str = "admin123";

// =============================================================================
// Validation
// =============================================================================

/// Message used when a required text field is blank
pub const MSG_BLANK_FIELDS: &str = "All text fields are required";

/// Message used when the join date lies after today
pub const MSG_FUTURE_JOIN_DATE: &str = "Join date cannot be in the future";

/// Message used when a login omits the username or the password
pub const MSG_MISSING_CREDENTIALS: &str = "Username and password are required";
