//! In-memory form state and the submit-time validator.
//!
//! The form is a flat map from field name to value, mutated field-by-field
//! as the user edits. Validation recomputes the whole error map on each
//! submit attempt; editing a field clears only that field's error.

use std::collections::BTreeMap;

use super::entity::{EntityDocument, EntityKind};
use super::group::GroupRecord;
use super::user::{DisplayName, Email, EntityName, FieldValidationError, UserRecord};

/// Well-known form field names.
pub mod fields {
    pub const NAME: &str = "name";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const EMAIL: &str = "email";
    pub const MEMBER_OF: &str = "memberOf";
    pub const PICTURE: &str = "picture";
    pub const TYPE: &str = "type";
    pub const CHILDREN: &str = "children";
    pub const PARENT: &str = "parent";
}

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            Self::List(_) => None,
        }
    }

    fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Field name to message map produced by validation.
pub type ValidationErrors = BTreeMap<String, String>;

/// Validated outcome of a form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRecord {
    User(UserRecord),
    Group(GroupRecord),
}

impl EntityRecord {
    /// Entity kind of the record.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::User(_) => EntityKind::User,
            Self::Group(_) => EntityKind::Group,
        }
    }

    /// Entity name destined for `metadata.name`.
    pub fn name(&self) -> &str {
        match self {
            Self::User(record) => record.name().as_str(),
            Self::Group(record) => record.name().as_str(),
        }
    }

    /// Build the catalog document for this record.
    pub fn document(&self) -> EntityDocument {
        match self {
            Self::User(record) => EntityDocument::user(record),
            Self::Group(record) => EntityDocument::group(record),
        }
    }
}

/// Mutable form state for one entity creation flow.
#[derive(Debug, Clone)]
pub struct FormState {
    kind: EntityKind,
    values: BTreeMap<String, FieldValue>,
    errors: ValidationErrors,
}

impl FormState {
    /// Start an empty form for the given entity kind.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            values: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    /// Entity kind the form submits as.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Replace a single field value, leaving the others untouched.
    ///
    /// Clears any validation error previously recorded for the field.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.values.insert(name.to_owned(), value.into());
        self.errors.remove(name);
    }

    /// Restore the initial empty record.
    pub fn reset(&mut self) {
        self.values.clear();
        self.errors.clear();
    }

    /// Current text value of a field, empty when unset.
    pub fn text(&self, name: &str) -> &str {
        self.values
            .get(name)
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
    }

    /// Current list value of a field, empty when unset.
    pub fn list(&self, name: &str) -> &[String] {
        self.values
            .get(name)
            .and_then(FieldValue::as_list)
            .unwrap_or_default()
    }

    /// Trimmed text value, absent when blank.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        let value = self.text(name).trim();
        (!value.is_empty()).then(|| value.to_owned())
    }

    /// Validation errors from the last submit attempt.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Recompute the error map wholesale; returns `true` when the form may
    /// be submitted.
    pub fn validate(&mut self) -> bool {
        self.errors = match self.build_record() {
            Ok(_) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        self.errors.is_empty()
    }

    /// Validate and produce the entity record for submission.
    ///
    /// On failure the error map is retained on the form for display.
    pub fn record(&mut self) -> Result<EntityRecord, ValidationErrors> {
        match self.build_record() {
            Ok(record) => {
                self.errors.clear();
                Ok(record)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    fn build_record(&self) -> Result<EntityRecord, ValidationErrors> {
        match self.kind {
            EntityKind::User => self.build_user().map(EntityRecord::User),
            EntityKind::Group => self.build_group().map(EntityRecord::Group),
        }
    }

    fn build_user(&self) -> Result<UserRecord, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = collect(EntityName::new(self.text(fields::NAME)), &mut errors);
        let display_name = collect(DisplayName::new(self.text(fields::DISPLAY_NAME)), &mut errors);
        let email = collect(Email::new(self.text(fields::EMAIL)), &mut errors);
        match (name, display_name, email) {
            (Some(name), Some(display_name), Some(email)) => Ok(UserRecord::new(
                name,
                display_name,
                email,
                self.optional_text(fields::MEMBER_OF),
                self.optional_text(fields::PICTURE),
            )),
            _ => Err(errors),
        }
    }

    fn build_group(&self) -> Result<GroupRecord, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = collect(EntityName::new(self.text(fields::NAME)), &mut errors);
        let display_name = collect(DisplayName::new(self.text(fields::DISPLAY_NAME)), &mut errors);
        match (name, display_name) {
            (Some(name), Some(display_name)) => Ok(GroupRecord::new(
                name,
                display_name,
                self.text(fields::TYPE),
                self.list(fields::CHILDREN).to_vec(),
                self.optional_text(fields::PARENT),
            )),
            _ => Err(errors),
        }
    }
}

fn collect<T>(
    result: Result<T, FieldValidationError>,
    errors: &mut ValidationErrors,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.insert(error.field().to_owned(), error.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn filled_user_form() -> FormState {
        let mut form = FormState::new(EntityKind::User);
        form.set_field(fields::NAME, "jdoe");
        form.set_field(fields::DISPLAY_NAME, "Jane Doe");
        form.set_field(fields::EMAIL, "jane@x.com");
        form
    }

    #[test]
    fn set_field_replaces_one_entry() {
        let mut form = filled_user_form();
        form.set_field(fields::NAME, "other");
        assert_eq!(form.text(fields::NAME), "other");
        assert_eq!(form.text(fields::DISPLAY_NAME), "Jane Doe");
    }

    #[test]
    fn reset_restores_empty_record() {
        let mut form = filled_user_form();
        form.validate();
        form.reset();
        assert_eq!(form.text(fields::NAME), "");
        assert!(form.errors().is_empty());
    }

    #[test]
    fn valid_user_form_passes() {
        let mut form = filled_user_form();
        assert!(form.validate());
        assert!(form.errors().is_empty());
    }

    #[rstest]
    #[case("", "Username is required")]
    #[case("   ", "Username is required")]
    #[case("jo hn", "Username can only contain letters, numbers, hyphens, and underscores")]
    fn invalid_name_maps_to_message(#[case] name: &str, #[case] expected: &str) {
        let mut form = filled_user_form();
        form.set_field(fields::NAME, name);
        assert!(!form.validate());
        assert_eq!(form.errors().get("name").map(String::as_str), Some(expected));
    }

    #[test]
    fn whitespace_display_name_fails_required() {
        let mut form = filled_user_form();
        form.set_field(fields::DISPLAY_NAME, "   ");
        assert!(!form.validate());
        assert_eq!(
            form.errors().get("displayName").map(String::as_str),
            Some("Display name is required")
        );
    }

    #[test]
    fn editing_a_field_clears_only_its_error() {
        let mut form = FormState::new(EntityKind::User);
        assert!(!form.validate());
        assert!(form.errors().contains_key("name"));
        assert!(form.errors().contains_key("email"));
        form.set_field(fields::NAME, "jdoe");
        assert!(!form.errors().contains_key("name"));
        assert!(form.errors().contains_key("email"));
    }

    #[test]
    fn blank_member_of_is_dropped_from_the_record() {
        let mut form = filled_user_form();
        form.set_field(fields::MEMBER_OF, "");
        let record = form.record().expect("valid form");
        match record {
            EntityRecord::User(user) => assert_eq!(user.member_of(), None),
            EntityRecord::Group(_) => panic!("expected user record"),
        }
    }

    #[test]
    fn failed_record_retains_errors() {
        let mut form = filled_user_form();
        form.set_field(fields::EMAIL, "not-an-email");
        let errors = form.record().expect_err("invalid form");
        assert_eq!(
            errors.get("email").map(String::as_str),
            Some("Please enter a valid email address")
        );
        assert_eq!(form.errors(), &errors);
    }

    #[test]
    fn group_form_builds_record_with_children() {
        let mut form = FormState::new(EntityKind::Group);
        form.set_field(fields::NAME, "engineering");
        form.set_field(fields::DISPLAY_NAME, "Engineering");
        form.set_field(fields::TYPE, "team");
        form.set_field(fields::CHILDREN, vec!["backend".to_owned()]);
        let record = form.record().expect("valid form");
        assert_eq!(record.kind(), EntityKind::Group);
        assert_eq!(record.name(), "engineering");
        match record {
            EntityRecord::Group(group) => {
                assert_eq!(group.children(), ["backend".to_owned()]);
            }
            EntityRecord::User(_) => panic!("expected group record"),
        }
    }

    #[test]
    fn group_form_requires_name_and_display_name_only() {
        let mut form = FormState::new(EntityKind::Group);
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 2);
        assert!(form.errors().contains_key("name"));
        assert!(form.errors().contains_key("displayName"));
    }
}
