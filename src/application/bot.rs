use super::admin::AdminConsole;
use super::reply::{Reply, Step};
use super::session::{Session, SessionStore};
use super::wizard::OperationWizard;
use crate::domain::operation::OperationKind;
use crate::domain::user::UserId;
use crate::error::Result;
use tracing::{debug, error};

pub const ADD_EXPENSE: &str = "Add expense";
pub const ADD_INCOME: &str = "Add income";
pub const ADMIN: &str = "Admin";
pub const START_COMMAND: &str = "/start";
pub const CANCEL_COMMAND: &str = "/cancel";
pub const ADMIN_COMMAND: &str = "/admin";

/// Routes each incoming message of a user to the right flow and owns the
/// per-user session lifecycle.
pub struct Bot {
    wizard: OperationWizard,
    admin: AdminConsole,
    sessions: SessionStore,
}

impl Bot {
    pub fn new(wizard: OperationWizard, admin: AdminConsole) -> Self {
        Self {
            wizard,
            admin,
            sessions: SessionStore::new(),
        }
    }

    pub fn main_menu(&self, user_id: UserId) -> Vec<String> {
        let mut menu = vec![ADD_EXPENSE.to_owned(), ADD_INCOME.to_owned()];
        if self.admin.is_admin(user_id) {
            menu.push(ADMIN.to_owned());
        }
        menu
    }

    pub fn greeting(&self, user_id: UserId) -> Reply {
        Reply::text("Hello! I will help you record a financial operation.\nChoose an operation type:")
            .with_options(self.main_menu(user_id))
    }

    pub async fn session(&self, user_id: UserId) -> Option<Session> {
        self.sessions.get(user_id).await
    }

    /// Handles one message. Failures are turned into a reply and end the
    /// user's current flow.
    ///
    /// `/start` and `/cancel` always apply. Otherwise a flow that waits for
    /// typed text (amount, purpose, admin form fields) receives the message
    /// verbatim; menu buttons only take effect outside such states.
    pub async fn handle(&self, user_id: UserId, text: &str) -> Reply {
        match self.dispatch(user_id, text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(user_id, error = %e, "Message handling failed");
                self.sessions.clear(user_id).await;
                Reply::text(format!("❌ {}", e)).with_options(self.main_menu(user_id))
            }
        }
    }

    async fn dispatch(&self, user_id: UserId, text: &str) -> Result<Reply> {
        match text.trim() {
            START_COMMAND => {
                self.sessions.clear(user_id).await;
                Ok(self.greeting(user_id))
            }
            CANCEL_COMMAND => {
                let text = if self.sessions.clear(user_id).await {
                    "Cancelled."
                } else {
                    "Nothing to cancel."
                };
                Ok(Reply::text(text).with_options(self.main_menu(user_id)))
            }
            // A flow waiting for typed text owns every other message.
            _ if self.sessions.awaits_free_text(user_id).await => {
                self.continue_session(user_id, text).await
            }
            ADD_EXPENSE => self.start_operation(user_id, OperationKind::Expense).await,
            ADD_INCOME => self.start_operation(user_id, OperationKind::Income).await,
            ADMIN | ADMIN_COMMAND => {
                self.sessions.clear(user_id).await;
                let step = self.admin.open(user_id);
                Ok(self.settle(user_id, step, Session::Admin).await)
            }
            _ => self.continue_session(user_id, text).await,
        }
    }

    async fn start_operation(&self, user_id: UserId, kind: OperationKind) -> Result<Reply> {
        // Starting over discards whatever was in flight.
        self.sessions.clear(user_id).await;
        let step = self.wizard.start(user_id, kind).await?;
        Ok(self.settle(user_id, step, Session::Operation).await)
    }

    async fn continue_session(&self, user_id: UserId, text: &str) -> Result<Reply> {
        match self.sessions.take(user_id).await {
            Some(Session::Operation(state)) => {
                debug!(user_id, state = state.name(), "Wizard input");
                let step = self.wizard.advance(user_id, state, text).await?;
                Ok(self.settle(user_id, step, Session::Operation).await)
            }
            Some(Session::Admin(state)) => {
                let step = self.admin.advance(user_id, state, text).await?;
                Ok(self.settle(user_id, step, Session::Admin).await)
            }
            None => Ok(Reply::text("Please choose an operation type:")
                .with_options(self.main_menu(user_id))),
        }
    }

    /// Stores the next state, or drops the session and falls back to the
    /// main menu when the flow is over.
    async fn settle<S>(&self, user_id: UserId, step: Step<S>, wrap: fn(S) -> Session) -> Reply {
        match step {
            Step::Continue { state, reply } => {
                self.sessions.put(user_id, wrap(state)).await;
                reply
            }
            Step::Finished { mut reply } => {
                if reply.options.is_empty() {
                    reply.options = self.main_menu(user_id);
                }
                reply
            }
        }
    }
}
