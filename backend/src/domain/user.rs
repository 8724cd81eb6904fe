//! User aggregate and the validated field newtypes shared with groups.
//!
//! The newtypes enforce the catalog's field rules at construction time so
//! the rest of the crate never handles unvalidated names or addresses. The
//! error messages are the exact strings shown next to form fields.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Maximum length of an entity name.
pub const ENTITY_NAME_MAX: usize = 50;
/// Maximum length of a display name.
pub const DISPLAY_NAME_MAX: usize = 100;

/// Field validation failures, one variant per user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldValidationError {
    #[error("Username is required")]
    NameRequired,
    #[error("Username must be {ENTITY_NAME_MAX} characters or less")]
    NameTooLong,
    #[error("Username can only contain letters, numbers, hyphens, and underscores")]
    NameInvalidCharacters,
    #[error("Display name is required")]
    DisplayNameRequired,
    #[error("Display name must be {DISPLAY_NAME_MAX} characters or less")]
    DisplayNameTooLong,
    #[error("Email is required")]
    EmailRequired,
    #[error("Please enter a valid email address")]
    EmailInvalid,
}

impl FieldValidationError {
    /// Form field the failure belongs to.
    pub fn field(self) -> &'static str {
        match self {
            Self::NameRequired | Self::NameTooLong | Self::NameInvalidCharacters => "name",
            Self::DisplayNameRequired | Self::DisplayNameTooLong => "displayName",
            Self::EmailRequired | Self::EmailInvalid => "email",
        }
    }
}

static ENTITY_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn entity_name_regex() -> &'static Regex {
    ENTITY_NAME_RE.get_or_init(|| {
        Regex::new("^[a-zA-Z0-9_-]+$")
            .unwrap_or_else(|error| panic!("entity name regex failed to compile: {error}"))
    })
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Catalog entity name used in `metadata.name` for users and groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityName(String);

impl EntityName {
    /// Validate and construct an [`EntityName`].
    ///
    /// Whitespace-only input fails the required check; length and charset
    /// checks run against the raw value.
    pub fn new(name: impl Into<String>) -> Result<Self, FieldValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FieldValidationError::NameRequired);
        }
        if name.chars().count() > ENTITY_NAME_MAX {
            return Err(FieldValidationError::NameTooLong);
        }
        if !entity_name_regex().is_match(&name) {
            return Err(FieldValidationError::NameInvalidCharacters);
        }
        Ok(Self(name))
    }

    /// Borrow the validated name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EntityName> for String {
    fn from(value: EntityName) -> Self {
        value.0
    }
}

impl TryFrom<String> for EntityName {
    type Error = FieldValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(display_name: impl Into<String>) -> Result<Self, FieldValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(FieldValidationError::DisplayNameRequired);
        }
        if display_name.chars().count() > DISPLAY_NAME_MAX {
            return Err(FieldValidationError::DisplayNameTooLong);
        }
        Ok(Self(display_name))
    }

    /// Borrow the validated display name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = FieldValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(email: impl Into<String>) -> Result<Self, FieldValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(FieldValidationError::EmailRequired);
        }
        if !email_regex().is_match(&email) {
            return Err(FieldValidationError::EmailInvalid);
        }
        Ok(Self(email))
    }

    /// Borrow the validated address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = FieldValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Catalog user built from validated components.
///
/// ## Invariants
/// - `name` matches `^[a-zA-Z0-9_-]+$` and is at most 50 characters.
/// - `display_name` is non-blank and at most 100 characters.
/// - `email` matches the address format check.
/// - `member_of` and `picture`, when present, are non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "UserRecordDto", into = "UserRecordDto")]
pub struct UserRecord {
    #[schema(value_type = String, example = "jdoe")]
    name: EntityName,
    #[schema(value_type = String, example = "Jane Doe")]
    display_name: DisplayName,
    #[schema(value_type = String, example = "jane@example.com")]
    email: Email,
    #[schema(value_type = Option<String>, example = "engineering")]
    member_of: Option<String>,
    #[schema(value_type = Option<String>)]
    picture: Option<String>,
}

impl UserRecord {
    /// Build a record from validated components.
    pub fn new(
        name: EntityName,
        display_name: DisplayName,
        email: Email,
        member_of: Option<String>,
        picture: Option<String>,
    ) -> Self {
        Self {
            name,
            display_name,
            email,
            member_of: normalize_optional(member_of),
            picture: normalize_optional(picture),
        }
    }

    /// Entity name (`metadata.name`).
    pub fn name(&self) -> &EntityName {
        &self.name
    }

    /// Profile display name.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Profile email address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Group membership, when selected.
    pub fn member_of(&self) -> Option<&str> {
        self.member_of.as_deref()
    }

    /// Profile picture URL, when provided.
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }
}

/// Treat blank optional fields as absent.
fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UserRecordDto {
    name: String,
    display_name: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    member_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    picture: Option<String>,
}

impl From<UserRecord> for UserRecordDto {
    fn from(value: UserRecord) -> Self {
        Self {
            name: value.name.into(),
            display_name: value.display_name.into(),
            email: value.email.into(),
            member_of: value.member_of,
            picture: value.picture,
        }
    }
}

impl TryFrom<UserRecordDto> for UserRecord {
    type Error = FieldValidationError;

    fn try_from(value: UserRecordDto) -> Result<Self, Self::Error> {
        Ok(UserRecord::new(
            EntityName::new(value.name)?,
            DisplayName::new(value.display_name)?,
            Email::new(value.email)?,
            value.member_of,
            value.picture,
        ))
    }
}
