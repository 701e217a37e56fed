//! Administrator console: user registration and the operation report.

use super::reply::{Reply, Step};
use crate::domain::ports::{OperationLogRef, UserStoreRef};
use crate::domain::user::{Credential, UserId, UserProfile};
use crate::error::{BotError, Result};
use std::collections::HashSet;
use tracing::{error, info};

pub const REGISTER_USER: &str = "Register user";
pub const EXPORT_OPERATIONS: &str = "Export operations (CSV)";
pub const BACK: &str = "Back";
/// Answer that skips the organisation label.
pub const SKIP: &str = "-";

const MENU: [&str; 3] = [REGISTER_USER, EXPORT_OPERATIONS, BACK];

#[derive(Debug, Clone, PartialEq)]
pub enum AdminState {
    Menu,
    AwaitingUserId,
    AwaitingCredential {
        user_id: UserId,
    },
    AwaitingOrganisation {
        user_id: UserId,
        credential: Credential,
    },
}

pub type AdminStep = Step<AdminState>;

pub struct AdminConsole {
    users: UserStoreRef,
    log: OperationLogRef,
    admins: HashSet<UserId>,
}

impl AdminConsole {
    pub fn new(users: UserStoreRef, log: OperationLogRef, admins: HashSet<UserId>) -> Self {
        Self { users, log, admins }
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admins.contains(&user_id)
    }

    pub fn open(&self, user_id: UserId) -> AdminStep {
        if !self.is_admin(user_id) {
            return denied();
        }
        menu("Administrator panel:")
    }

    pub async fn advance(
        &self,
        user_id: UserId,
        state: AdminState,
        input: &str,
    ) -> Result<AdminStep> {
        // Rights are re-checked on every message, not only on entry.
        if !self.is_admin(user_id) {
            return Ok(denied());
        }
        let input = input.trim();

        let step = match state {
            AdminState::Menu => match input {
                REGISTER_USER => Step::stay(
                    AdminState::AwaitingUserId,
                    Reply::text("Enter the user's id:"),
                ),
                EXPORT_OPERATIONS => self.export().await,
                BACK => Step::finish(Reply::text("Back to the main menu.")),
                _ => menu("Please pick an option from the menu."),
            },
            AdminState::AwaitingUserId => match input.parse::<UserId>() {
                Ok(target) => Step::stay(
                    AdminState::AwaitingCredential { user_id: target },
                    Reply::text("Enter the user's Report.Finance API key:"),
                ),
                Err(_) => Step::stay(
                    AdminState::AwaitingUserId,
                    Reply::text("Invalid id format. Enter an integer."),
                ),
            },
            AdminState::AwaitingCredential { user_id: target } => {
                if input.is_empty() {
                    Step::stay(
                        AdminState::AwaitingCredential { user_id: target },
                        Reply::text("The API key cannot be empty. Try again:"),
                    )
                } else {
                    Step::stay(
                        AdminState::AwaitingOrganisation {
                            user_id: target,
                            credential: Credential::new(input),
                        },
                        Reply::text("Enter the organisation name (or send \"-\" to skip):"),
                    )
                }
            }
            AdminState::AwaitingOrganisation {
                user_id: target,
                credential,
            } => {
                let label = (!input.is_empty() && input != SKIP).then(|| input.to_owned());
                self.register(user_id, target, credential, label).await
            }
        };
        Ok(step)
    }

    async fn register(
        &self,
        admin_id: UserId,
        target: UserId,
        credential: Credential,
        label: Option<String>,
    ) -> AdminStep {
        let mut profile = UserProfile::new(target, credential);
        profile.organisation_label = label.clone();

        let text = match self.users.register(profile).await {
            Ok(()) => {
                info!(admin_id, user_id = target, "User registered");
                format!(
                    "✅ User {} registered.\nOrganisation: {}.",
                    target,
                    label.as_deref().unwrap_or("not set")
                )
            }
            Err(e) => {
                error!(admin_id, user_id = target, error = %e, "Registration failed");
                format!("❌ Registration failed: {}", e)
            }
        };
        Step::stay(AdminState::Menu, Reply::text(text).with_options(MENU))
    }

    async fn export(&self) -> AdminStep {
        let reply = match self.log.all().await {
            Ok(entries) if entries.is_empty() => Reply::text("No operations recorded."),
            Ok(entries) => {
                info!(count = entries.len(), "Operation report exported");
                Reply::text("📊 All operations (user, type, date).").with_report(entries)
            }
            Err(e) => {
                error!(error = %e, "Failed to read the operation log");
                Reply::text(format!("❌ Failed to build the report: {}", e))
            }
        };
        Step::stay(AdminState::Menu, reply.with_options(MENU))
    }
}

fn menu(text: &str) -> AdminStep {
    Step::stay(AdminState::Menu, Reply::text(text).with_options(MENU))
}

fn denied() -> AdminStep {
    Step::finish(Reply::text(format!("❌ {}", BotError::PermissionDenied)))
}
