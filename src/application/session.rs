use super::admin::AdminState;
use super::wizard::WizardState;
use crate::domain::user::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Transient conversation state of one user.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    Operation(WizardState),
    Admin(AdminState),
}

impl Session {
    /// Whether the flow waits for typed text rather than a menu choice.
    /// Such input must reach the flow even when it reads like a menu button.
    pub fn awaits_free_text(&self) -> bool {
        matches!(
            self,
            Session::Operation(
                WizardState::EnteringAmount { .. } | WizardState::EnteringPurpose { .. }
            ) | Session::Admin(
                AdminState::AwaitingUserId
                    | AdminState::AwaitingCredential { .. }
                    | AdminState::AwaitingOrganisation { .. }
            )
        )
    }
}

/// Per-user sessions. At most one session per user; storing a new one
/// replaces the old one (last start wins).
#[derive(Default, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<UserId, Session>>>,
}

impl SessionStore {
    /// Creates a new, empty session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the user's session.
    pub async fn take(&self, user_id: UserId) -> Option<Session> {
        self.sessions.write().await.remove(&user_id)
    }

    /// Stores `session`, replacing any session the user already had.
    pub async fn put(&self, user_id: UserId, session: Session) {
        self.sessions.write().await.insert(user_id, session);
    }

    /// Returns `true` if a session was dropped.
    pub async fn clear(&self, user_id: UserId) -> bool {
        self.sessions.write().await.remove(&user_id).is_some()
    }

    /// Returns a copy of the user's session, leaving it in place.
    pub async fn get(&self, user_id: UserId) -> Option<Session> {
        self.sessions.read().await.get(&user_id).cloned()
    }

    pub async fn awaits_free_text(&self, user_id: UserId) -> bool {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .is_some_and(Session::awaits_free_text)
    }
}
