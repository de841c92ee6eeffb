use serde::{Deserialize, Serialize};

/// A project record as held by the directory service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_branch: Option<String>,
  #[serde(default)]
  pub visible_branches: Vec<String>,
  /// Single-valued classification
  #[serde(default)]
  pub group: String,
  /// Multi-valued classification
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub project_site: Option<String>,
  #[serde(default)]
  pub contact_people: Vec<ContactPerson>,
}

/// Someone to ask about a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPerson {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
}
