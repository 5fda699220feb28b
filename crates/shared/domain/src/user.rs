//! User domain entity and related types.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::constants::{
    FIRST_USER_ID, MSG_BLANK_FIELDS, MSG_FUTURE_JOIN_DATE, SEED_FIRST_NAME,
    SEED_JOIN_DATE, SEED_LAST_NAME, SEED_PASSWORD, SEED_USERNAME,
};
use crate::error::{DomainError, DomainResult};

/// Sequential record identifier
pub type UserId = u64;

/// User domain entity.
///
/// Serialized with the field names of the stored format
/// (`nombre`, `apellido`, `fechaIngreso`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "fechaIngreso")]
    pub joined_on: NaiveDate,
    pub username: String,
    pub password: String,
}

impl User {
    /// Build a record from an already normalized form
    pub fn from_form(id: UserId, form: UserForm) -> Self {
        Self {
            id,
            first_name: form.first_name,
            last_name: form.last_name,
            joined_on: form.joined_on,
            username: form.username,
            password: form.password,
        }
    }

    /// The administrative record written into an empty store
    pub fn seed() -> Self {
        let (year, month, day) = SEED_JOIN_DATE;
        Self {
            id: FIRST_USER_ID,
            first_name: SEED_FIRST_NAME.to_string(),
            last_name: SEED_LAST_NAME.to_string(),
            joined_on: NaiveDate::from_ymd_opt(year, month, day)
                .expect("seed join date is a valid calendar date"),
            username: SEED_USERNAME.to_string(),
            password: SEED_PASSWORD.to_string(),
        }
    }

    /// Replace every field but the identifier
    pub fn apply(&mut self, form: UserForm) {
        self.first_name = form.first_name;
        self.last_name = form.last_name;
        self.joined_on = form.joined_on;
        self.username = form.username;
        self.password = form.password;
    }

    /// Exact, case-sensitive comparison of both credentials
    pub fn matches_credentials(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }

    /// Copy of the mutable fields, used to prefill an edit
    pub fn to_form(&self) -> UserForm {
        UserForm {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            joined_on: self.joined_on,
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// Every field of a user record except the identifier.
///
/// Used as the payload of create and update. Rules are checked on the
/// trimmed values, see [`UserForm::into_validated`].
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct UserForm {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(custom(function = "not_in_future"))]
    pub joined_on: NaiveDate,
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

/// Order in which failing fields are reported
const FORM_FIELDS: &[&str] = &["first_name", "last_name", "username", "password", "joined_on"];

impl UserForm {
    /// Trim leading and trailing whitespace from every text field
    pub fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            joined_on: self.joined_on,
            username: self.username.trim().to_string(),
            password: self.password.trim().to_string(),
        }
    }

    /// Normalize, then check the field rules.
    ///
    /// Reports the first failing field in form order: blank text fields
    /// before the join date.
    pub fn into_validated(self) -> DomainResult<Self> {
        let form = self.normalized();
        let Err(errors) = form.validate() else {
            return Ok(form);
        };

        let field_errors = errors.field_errors();
        let message = FORM_FIELDS
            .iter()
            .find_map(|field| {
                field_errors.iter().find_map(|(name, errs)| {
                    let name: &str = name.as_ref();
                    (name == *field).then(|| errs.first()).flatten()
                })
            })
            .and_then(|error| error.message.as_ref())
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| MSG_BLANK_FIELDS.to_string());

        Err(DomainError::validation(message))
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(MSG_BLANK_FIELDS.into());
        return Err(error);
    }
    Ok(())
}

fn not_in_future(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Local::now().date_naive() {
        let mut error = ValidationError::new("future_date");
        error.message = Some(MSG_FUTURE_JOIN_DATE.into());
        return Err(error);
    }
    Ok(())
}
