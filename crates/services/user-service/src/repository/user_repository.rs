//! User repository over a key-value store.
//!
//! The whole collection lives in memory and is mirrored to the store as
//! one JSON array after every change.

use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, info, warn};

use common::{AppError, AppResult, KeyValueStore, LoadPolicy};
use domain::{DomainError, User, UserForm, UserId, FIRST_USER_ID, USERS_STORAGE_KEY};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Mutating operations normalize and validate their input and enforce
/// username uniqueness, so every caller gets the same guarantees.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait UserRepository: Send + Sync {
    /// All users ordered by ascending id
    fn list(&self) -> AppResult<Vec<User>>;

    /// Find user by id
    fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find user whose username and password both match exactly (after trimming the inputs)
    fn find_by_credentials(&self, username: &str, password: &str) -> AppResult<Option<User>>;

    /// Check whether a user other than `exclude_id` owns `username`
    fn exists_username(&self, username: &str, exclude_id: Option<UserId>) -> AppResult<bool>;

    /// Create a new user with the next sequential id
    fn create(&self, form: UserForm) -> AppResult<User>;

    /// Replace every field of user `id`; `Ok(false)` if there is no such user
    fn update(&self, id: UserId, form: UserForm) -> AppResult<bool>;

    /// Remove user `id`; `Ok(false)` if there is no such user
    fn delete(&self, id: UserId) -> AppResult<bool>;
}

/// Concrete implementation of UserRepository backed by a [`KeyValueStore`]
pub struct UserStore {
    store: Arc<dyn KeyValueStore>,
    users: RwLock<Vec<User>>,
}

impl UserStore {
    /// Load the collection from `store`.
    ///
    /// An absent or empty value seeds the administrative user and persists
    /// it. A value that is not a JSON array, or a record inside it that does
    /// not decode, is handled according to `policy`. Discarding a record
    /// keeps the rest of the collection.
    pub fn open(store: Arc<dyn KeyValueStore>, policy: LoadPolicy) -> AppResult<Self> {
        let users = match store.get(USERS_STORAGE_KEY)? {
            Some(raw) if !raw.is_empty() => match serde_json::from_str::<Vec<Value>>(&raw) {
                Ok(records) => {
                    let users = decode_records(records, policy)?;
                    debug!(count = users.len(), "Users loaded");
                    users
                }
                Err(e) => match policy {
                    LoadPolicy::Discard => {
                        warn!(error = %e, "Stored users are unreadable, starting empty");
                        Vec::new()
                    }
                    LoadPolicy::Strict => {
                        return Err(AppError::corrupt(format!("{}: {}", USERS_STORAGE_KEY, e)));
                    }
                },
            },
            _ => {
                let seed = vec![User::seed()];
                write_users(store.as_ref(), &seed)?;
                info!(username = %seed[0].username, "Seeded empty store with default user");
                seed
            }
        };

        Ok(Self {
            store,
            users: RwLock::new(users),
        })
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, Vec<User>>> {
        self.users
            .read()
            .map_err(|_| AppError::internal("user collection lock poisoned"))
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, Vec<User>>> {
        self.users
            .write()
            .map_err(|_| AppError::internal("user collection lock poisoned"))
    }
}

/// Decode each stored record on its own so one bad entry cannot drop the rest
fn decode_records(records: Vec<Value>, policy: LoadPolicy) -> AppResult<Vec<User>> {
    let mut users = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<User>(record) {
            Ok(user) => users.push(user),
            Err(e) => match policy {
                LoadPolicy::Discard => {
                    warn!(index, error = %e, "Skipping unreadable stored user");
                }
                LoadPolicy::Strict => {
                    return Err(AppError::corrupt(format!(
                        "{}[{}]: {}",
                        USERS_STORAGE_KEY, index, e
                    )));
                }
            },
        }
    }
    Ok(users)
}

fn write_users(store: &dyn KeyValueStore, users: &[User]) -> AppResult<()> {
    let json = serde_json::to_string(users)?;
    store.set(USERS_STORAGE_KEY, &json)
}

fn username_taken(users: &[User], username: &str, exclude_id: Option<UserId>) -> bool {
    users
        .iter()
        .any(|user| user.username == username && Some(user.id) != exclude_id)
}

fn next_id(users: &[User]) -> AppResult<UserId> {
    match users.iter().map(|user| user.id).max() {
        None => Ok(FIRST_USER_ID),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| AppError::internal("user id space exhausted")),
    }
}

impl UserRepository for UserStore {
    fn list(&self) -> AppResult<Vec<User>> {
        let mut users = self.read()?.clone();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let users = self.read()?;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    fn find_by_credentials(&self, username: &str, password: &str) -> AppResult<Option<User>> {
        let (username, password) = (username.trim(), password.trim());
        let users = self.read()?;
        Ok(users
            .iter()
            .find(|user| user.matches_credentials(username, password))
            .cloned())
    }

    fn exists_username(&self, username: &str, exclude_id: Option<UserId>) -> AppResult<bool> {
        let users = self.read()?;
        Ok(username_taken(&users, username.trim(), exclude_id))
    }

    fn create(&self, form: UserForm) -> AppResult<User> {
        let form = form.into_validated()?;
        let mut users = self.write()?;

        if username_taken(&users, &form.username, None) {
            return Err(DomainError::conflict("Username").into());
        }

        let user = User::from_form(next_id(&users)?, form);
        let mut next = users.clone();
        next.push(user.clone());
        write_users(self.store.as_ref(), &next)?;
        *users = next;

        info!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    fn update(&self, id: UserId, form: UserForm) -> AppResult<bool> {
        let form = form.into_validated()?;
        let mut users = self.write()?;

        let Some(index) = users.iter().position(|user| user.id == id) else {
            debug!(user_id = id, "Update skipped, no such user");
            return Ok(false);
        };
        if username_taken(&users, &form.username, Some(id)) {
            return Err(DomainError::conflict("Username").into());
        }

        let mut next = users.clone();
        next[index].apply(form);
        write_users(self.store.as_ref(), &next)?;
        *users = next;

        info!(user_id = id, "User updated");
        Ok(true)
    }

    fn delete(&self, id: UserId) -> AppResult<bool> {
        let mut users = self.write()?;

        let next: Vec<User> = users.iter().filter(|user| user.id != id).cloned().collect();
        if next.len() == users.len() {
            debug!(user_id = id, "Delete skipped, no such user");
            return Ok(false);
        }

        write_users(self.store.as_ref(), &next)?;
        *users = next;

        info!(user_id = id, "User deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::MockKeyValueStore;
    use mockall::predicate::eq;

    fn form(username: &str) -> UserForm {
        UserForm {
            first_name: "Beto".to_string(),
            last_name: "Gómez".to_string(),
            joined_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            username: username.to_string(),
            password: "pw".to_string(),
        }
    }

    /// Mock store holding an empty collection that accepts no writes
    fn read_only_store() -> MockKeyValueStore {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .with(eq(USERS_STORAGE_KEY))
            .returning(|_| Ok(Some("[]".to_string())));
        store.expect_set().never();
        store
    }

    #[test]
    fn test_seed_written_once_on_empty_store() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(None));
        store
            .expect_set()
            .withf(|key, value| key == USERS_STORAGE_KEY && value.contains("\"admin123\""))
            .times(1)
            .returning(|_, _| Ok(()));

        let repo = UserStore::open(Arc::new(store), LoadPolicy::Discard).unwrap();
        assert_eq!(repo.list().unwrap(), vec![User::seed()]);
    }

    #[test]
    fn test_update_missing_id_does_not_write() {
        let repo = UserStore::open(Arc::new(read_only_store()), LoadPolicy::Discard).unwrap();
        assert!(!repo.update(999, form("beto")).unwrap());
    }

    #[test]
    fn test_delete_missing_id_does_not_write() {
        let repo = UserStore::open(Arc::new(read_only_store()), LoadPolicy::Discard).unwrap();
        assert!(!repo.delete(42).unwrap());
    }

    #[test]
    fn test_invalid_form_does_not_write() {
        let repo = UserStore::open(Arc::new(read_only_store()), LoadPolicy::Discard).unwrap();
        let result = repo.create(form("  "));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_failed_write_leaves_collection_unchanged() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(Some("[]".to_string())));
        store.expect_set().times(1).returning(|_, _| {
            Err(AppError::Storage(std::io::Error::other("disk full")))
        });

        let repo = UserStore::open(Arc::new(store), LoadPolicy::Discard).unwrap();
        assert!(matches!(repo.create(form("beto")), Err(AppError::Storage(_))));
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(&[]).unwrap(), 1);

        let mut users = vec![User::seed()];
        users[0].id = 7;
        assert_eq!(next_id(&users).unwrap(), 8);

        users[0].id = UserId::MAX;
        assert!(next_id(&users).is_err());
    }
}
