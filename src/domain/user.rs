use serde::{Deserialize, Serialize};
use std::fmt;

/// Messenger-side identifier of a user.
pub type UserId = i64;

/// API key of the remote finance service, bound to exactly one user.
///
/// `Debug` is redacted so the key never ends up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Persisted identity data of a registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub credential: Credential,
    /// Free-form organisation label set by the administrator.
    pub organisation_label: Option<String>,
}

impl UserProfile {
    pub fn new(user_id: UserId, credential: Credential) -> Self {
        Self {
            user_id,
            credential,
            organisation_label: None,
        }
    }

    pub fn with_organisation_label(mut self, label: impl Into<String>) -> Self {
        self.organisation_label = Some(label.into());
        self
    }
}
