//! Catalog entity documents and their YAML serialization.
//!
//! An [`EntityDocument`] is the fixed-shape record the external catalog
//! ingests: `{apiVersion, kind, metadata, spec}`. Documents are immutable
//! once constructed; the org file accumulates them as a multi-document YAML
//! stream separated by `---`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::warn;

use super::group::GroupRecord;
use super::user::UserRecord;

/// Schema version accepted by the external catalog.
pub const API_VERSION: &str = "backstage.io/v1alpha1";
/// Annotation marking entities managed by the users API.
pub const MANAGED_BY_ANNOTATION: &str = "backstage.io/managed-by-location";

/// Supported entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Group,
}

impl EntityKind {
    /// Lower-case slug used in route paths (`/api/user-entity/...`).
    pub fn slug(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
        }
    }

    /// Kind string as written in entity documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Group => "Group",
        }
    }

    /// Resolve a route slug back to a kind.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "user" => Some(Self::User),
            "group" => Some(Self::Group),
            _ => None,
        }
    }

    /// Catalog entity reference for a named entity of this kind.
    pub fn entity_ref(self, name: &str) -> String {
        format!("{}:default/{name}", self.slug())
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity metadata block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotations: Option<BTreeMap<String, String>>,
}

/// User profile block (`spec.profile`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserProfile {
    display_name: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    picture: Option<String>,
}

/// User spec block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserSpec {
    profile: UserProfile,
    #[serde(default)]
    member_of: Vec<String>,
}

/// Group profile block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupProfile {
    display_name: String,
}

/// Group spec block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupSpec {
    #[serde(rename = "type")]
    group_type: String,
    profile: GroupProfile,
    #[serde(default)]
    children: Vec<String>,
}

/// Kind-specific spec payload.
///
/// Untagged: the `deny_unknown_fields` on both variants keeps
/// deserialization unambiguous (a group's `type` key never matches the user
/// spec and a user's `email` never matches the group profile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntitySpec {
    User(UserSpec),
    Group(GroupSpec),
}

/// Immutable catalog entity document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDocument {
    api_version: String,
    kind: EntityKind,
    metadata: Metadata,
    spec: EntitySpec,
}

impl EntityDocument {
    /// Build a User document from a validated record.
    ///
    /// `spec.memberOf` holds the selected group as a single-element list, or
    /// stays empty when no membership was chosen.
    pub fn user(record: &UserRecord) -> Self {
        Self {
            api_version: API_VERSION.to_owned(),
            kind: EntityKind::User,
            metadata: Metadata {
                name: record.name().as_str().to_owned(),
                annotations: None,
            },
            spec: EntitySpec::User(UserSpec {
                profile: UserProfile {
                    display_name: record.display_name().as_str().to_owned(),
                    email: record.email().as_str().to_owned(),
                    picture: record.picture().map(str::to_owned),
                },
                member_of: record.member_of().map(str::to_owned).into_iter().collect(),
            }),
        }
    }

    /// Build a Group document from a validated record.
    pub fn group(record: &GroupRecord) -> Self {
        Self {
            api_version: API_VERSION.to_owned(),
            kind: EntityKind::Group,
            metadata: Metadata {
                name: record.name().as_str().to_owned(),
                annotations: None,
            },
            spec: EntitySpec::Group(GroupSpec {
                group_type: record.group_type().to_owned(),
                profile: GroupProfile {
                    display_name: record.display_name().as_str().to_owned(),
                },
                children: record.children().to_vec(),
            }),
        }
    }

    /// Attach a metadata annotation.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Entity kind.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Entity name (`metadata.name`).
    pub fn name(&self) -> &str {
        self.metadata.name.as_str()
    }

    /// Catalog entity reference (`user:default/<name>`).
    pub fn entity_ref(&self) -> String {
        self.kind.entity_ref(self.name())
    }

    /// Group memberships for user documents.
    pub fn member_of(&self) -> Option<&[String]> {
        match &self.spec {
            EntitySpec::User(spec) => Some(&spec.member_of),
            EntitySpec::Group(_) => None,
        }
    }

    /// Group type for group documents.
    pub fn group_type(&self) -> Option<&str> {
        match &self.spec {
            EntitySpec::User(_) => None,
            EntitySpec::Group(spec) => Some(spec.group_type.as_str()),
        }
    }

    /// Profile display name.
    pub fn display_name(&self) -> &str {
        match &self.spec {
            EntitySpec::User(spec) => spec.profile.display_name.as_str(),
            EntitySpec::Group(spec) => spec.profile.display_name.as_str(),
        }
    }

    /// Profile email for user documents.
    pub fn email(&self) -> Option<&str> {
        match &self.spec {
            EntitySpec::User(spec) => Some(spec.profile.email.as_str()),
            EntitySpec::Group(_) => None,
        }
    }

    /// Render the document as YAML.
    ///
    /// The output carries no leading `---`; the append service supplies the
    /// document separator.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Parse every recognisable entity document out of a multi-document YAML
    /// stream.
    ///
    /// Foreign or malformed documents are skipped with a warning so one bad
    /// append never hides the rest of the file.
    pub fn parse_documents(text: &str) -> Vec<Self> {
        let mut documents = Vec::new();
        for deserializer in serde_yaml::Deserializer::from_str(text) {
            let value = match Value::deserialize(deserializer) {
                Ok(value) => value,
                Err(error) => {
                    warn!(%error, "skipping unreadable document in org file");
                    continue;
                }
            };
            if value.is_null() {
                continue;
            }
            match serde_yaml::from_value::<Self>(value) {
                Ok(document) => documents.push(document),
                Err(error) => warn!(%error, "skipping unrecognised document in org file"),
            }
        }
        documents
    }
}
