//! Reference entities of the remote finance service.
//!
//! Field names follow the remote JSON (camelCase). Everything besides `id`
//! is optional on the wire, so display helpers supply fallbacks.

use serde::{Deserialize, Serialize};

pub type EntityId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl Project {
    pub fn display_name(&self) -> String {
        non_empty(&self.project_name)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Project {}", self.id))
    }
}

fn non_empty(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|name| !name.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Organisation {
    pub fn display_name(&self) -> String {
        non_empty(&self.organisation_name)
            .or_else(|| non_empty(&self.name))
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Organisation {}", self.id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_id: Option<EntityId>,
}

impl Account {
    pub fn name(&self) -> &str {
        self.account_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("Unnamed account")
    }

    /// Composite key shown to the user: name plus the last four characters
    /// of the account number. Also used as the selection lookup key.
    pub fn display_key(&self) -> String {
        match self.number.as_deref().filter(|n| !n.is_empty()) {
            Some(number) => {
                let chars: Vec<char> = number.chars().collect();
                let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
                format!("{} ({})", self.name(), tail)
            }
            None => self.name().to_owned(),
        }
    }

    pub fn belongs_to(&self, organisation_id: EntityId) -> bool {
        self.organisation_id == Some(organisation_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactStream {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_stream_name: Option<String>,
}

/// A complete snapshot of the reference data, used by the offline finance
/// backend and by test fixtures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub organisations: Vec<Organisation>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub fact_streams: Vec<FactStream>,
}
