//! Group aggregate.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::{DisplayName, EntityName, FieldValidationError};

/// Catalog group built from validated components.
///
/// `group_type` is free-form and passed through to the catalog as-is;
/// `children` and `parent` reference other groups by entity name but are not
/// resolved here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "GroupRecordDto", into = "GroupRecordDto")]
pub struct GroupRecord {
    #[schema(value_type = String, example = "engineering")]
    name: EntityName,
    #[schema(value_type = String, example = "Engineering")]
    display_name: DisplayName,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "team")]
    group_type: String,
    children: Vec<String>,
    #[schema(value_type = Option<String>)]
    parent: Option<String>,
}

impl GroupRecord {
    /// Build a record from validated components.
    pub fn new(
        name: EntityName,
        display_name: DisplayName,
        group_type: impl Into<String>,
        children: Vec<String>,
        parent: Option<String>,
    ) -> Self {
        Self {
            name,
            display_name,
            group_type: group_type.into(),
            children,
            parent: parent.filter(|p| !p.trim().is_empty()),
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

    /// Group type (`spec.type`).
    pub fn group_type(&self) -> &str {
        self.group_type.as_str()
    }

    /// Child group names.
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// Parent group, when set.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct GroupRecordDto {
    name: String,
    display_name: String,
    #[serde(rename = "type", default)]
    group_type: String,
    #[serde(default)]
    children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
}

impl From<GroupRecord> for GroupRecordDto {
    fn from(value: GroupRecord) -> Self {
        Self {
            name: value.name.into(),
            display_name: value.display_name.into(),
            group_type: value.group_type,
            children: value.children,
            parent: value.parent,
        }
    }
}

impl TryFrom<GroupRecordDto> for GroupRecord {
    type Error = FieldValidationError;

    fn try_from(value: GroupRecordDto) -> Result<Self, Self::Error> {
        Ok(GroupRecord::new(
            EntityName::new(value.name)?,
            DisplayName::new(value.display_name)?,
            value.group_type,
            value.children,
            value.parent,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_children() {
        let group = GroupRecord::new(
            EntityName::new("engineering").expect("name"),
            DisplayName::new("Engineering").expect("display name"),
            "team",
            vec!["backend".into(), "frontend".into()],
            None,
        );
        assert_eq!(group.group_type(), "team");
        assert_eq!(group.children().len(), 2);
        assert_eq!(group.parent(), None);
    }

    #[test]
    fn serializes_type_field() {
        let group = GroupRecord::new(
            EntityName::new("design").expect("name"),
            DisplayName::new("Design").expect("display name"),
            "team",
            Vec::new(),
            Some("company".into()),
        );
        let json = serde_json::to_value(&group).expect("serialize");
        assert_eq!(json["type"], "team");
        assert_eq!(json["parent"], "company");
    }
}
