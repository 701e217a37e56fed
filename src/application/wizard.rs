//! The operation wizard: a linear form that collects one payment.
//!
//! `ChoosingKind → ChoosingProject → ChoosingOrganisation → ChoosingAccount
//! → EnteringAmount → EnteringPurpose → Confirming → Committed | Cancelled`
//!
//! `ChoosingKind` is the main menu (see [`OperationWizard::start`]); the
//! terminal states are represented by [`Step::Finished`]. Validation of an
//! answer is done by the pure functions at the bottom of this module and
//! never changes state on failure. Remote failures end the flow.

use super::reply::{Reply, Step};
use crate::domain::catalog::Account;
use crate::domain::operation::{
    Amount, DraftOperation, OperationKind, OperationLogEntry, PaymentDefaults, Selection,
};
use crate::domain::options::ChoiceList;
use crate::domain::ports::{FinanceApiRef, OperationLogRef, UserStoreRef};
use crate::domain::user::UserId;
use crate::error::{BotError, Result};
use chrono::Local;
use tracing::{error, info, warn};

/// Sentinel option meaning "no project chosen".
pub const NO_PROJECT: &str = "No project";
pub const CONFIRM_YES: &str = "Yes";
pub const CONFIRM_NO: &str = "No";

#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    ChoosingProject {
        draft: DraftOperation,
        options: ChoiceList<Option<Selection>>,
    },
    ChoosingOrganisation {
        draft: DraftOperation,
        options: ChoiceList<Selection>,
    },
    ChoosingAccount {
        draft: DraftOperation,
        options: ChoiceList<Selection>,
    },
    EnteringAmount {
        draft: DraftOperation,
    },
    EnteringPurpose {
        draft: DraftOperation,
    },
    Confirming {
        draft: DraftOperation,
    },
}

impl WizardState {
    pub fn draft(&self) -> &DraftOperation {
        match self {
            WizardState::ChoosingProject { draft, .. }
            | WizardState::ChoosingOrganisation { draft, .. }
            | WizardState::ChoosingAccount { draft, .. }
            | WizardState::EnteringAmount { draft }
            | WizardState::EnteringPurpose { draft }
            | WizardState::Confirming { draft } => draft,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardState::ChoosingProject { .. } => "choosing_project",
            WizardState::ChoosingOrganisation { .. } => "choosing_organisation",
            WizardState::ChoosingAccount { .. } => "choosing_account",
            WizardState::EnteringAmount { .. } => "entering_amount",
            WizardState::EnteringPurpose { .. } => "entering_purpose",
            WizardState::Confirming { .. } => "confirming",
        }
    }
}

pub type WizardStep = Step<WizardState>;

pub struct OperationWizard {
    api: FinanceApiRef,
    users: UserStoreRef,
    log: OperationLogRef,
    defaults: PaymentDefaults,
}

impl OperationWizard {
    pub fn new(
        api: FinanceApiRef,
        users: UserStoreRef,
        log: OperationLogRef,
        defaults: PaymentDefaults,
    ) -> Self {
        Self {
            api,
            users,
            log,
            defaults,
        }
    }

    /// Handles the choice of an operation kind and loads the first options.
    ///
    /// An unregistered user gets a message and no state is created.
    pub async fn start(&self, user_id: UserId, kind: OperationKind) -> Result<WizardStep> {
        let Some(profile) = self.users.get(user_id).await? else {
            info!(user_id, "Unregistered user tried to start an operation");
            return Ok(Step::finish(Reply::text(format!(
                "❌ {}",
                BotError::NotRegistered
            ))));
        };

        info!(user_id, kind = %kind, "Operation started");
        let draft = DraftOperation::new(kind, profile.credential);
        Ok(self.enter_project_step(draft).await)
    }

    /// Feeds one user answer into the current state.
    pub async fn advance(
        &self,
        user_id: UserId,
        state: WizardState,
        input: &str,
    ) -> Result<WizardStep> {
        let step = match state {
            WizardState::ChoosingProject { mut draft, options } => {
                match choose(&options, input) {
                    Ok(project) => {
                        draft.project = project.clone();
                        self.enter_organisation_step(draft).await
                    }
                    Err(e) => {
                        let reply = Reply::text(format!("{} Please pick a project.", e))
                            .with_options(options.keys());
                        Step::stay(WizardState::ChoosingProject { draft, options }, reply)
                    }
                }
            }
            WizardState::ChoosingOrganisation { mut draft, options } => {
                match choose(&options, input) {
                    Ok(organisation) => {
                        draft.organisation = Some(organisation.clone());
                        self.enter_account_step(draft).await
                    }
                    Err(e) => {
                        let reply = Reply::text(format!("{} Please pick an organisation.", e))
                            .with_options(options.keys());
                        Step::stay(WizardState::ChoosingOrganisation { draft, options }, reply)
                    }
                }
            }
            WizardState::ChoosingAccount { mut draft, options } => {
                match choose(&options, input) {
                    Ok(account) => {
                        draft.account = Some(account.clone());
                        Step::stay(
                            WizardState::EnteringAmount { draft },
                            Reply::text("Enter the amount:"),
                        )
                    }
                    Err(e) => {
                        let reply = Reply::text(format!("{} Please pick an account.", e))
                            .with_options(options.keys());
                        Step::stay(WizardState::ChoosingAccount { draft, options }, reply)
                    }
                }
            }
            WizardState::EnteringAmount { mut draft } => match Amount::parse(input) {
                Ok(amount) => {
                    draft.amount = Some(amount);
                    Step::stay(
                        WizardState::EnteringPurpose { draft },
                        Reply::text("Enter the payment purpose:"),
                    )
                }
                Err(e) => Step::stay(
                    WizardState::EnteringAmount { draft },
                    Reply::text(e.to_string()),
                ),
            },
            WizardState::EnteringPurpose { mut draft } => match parse_purpose(input) {
                Ok(purpose) => {
                    draft.purpose = Some(purpose);
                    let reply = Reply::text(draft.summary()).with_options([CONFIRM_YES, CONFIRM_NO]);
                    Step::stay(WizardState::Confirming { draft }, reply)
                }
                Err(e) => Step::stay(
                    WizardState::EnteringPurpose { draft },
                    Reply::text(e.to_string()),
                ),
            },
            WizardState::Confirming { draft } => match parse_confirmation(input) {
                Ok(true) => self.commit(user_id, draft).await?,
                Ok(false) => {
                    info!(user_id, "Operation cancelled at confirmation");
                    Step::finish(Reply::text("Operation cancelled."))
                }
                Err(e) => Step::stay(
                    WizardState::Confirming { draft },
                    Reply::text(e.to_string()).with_options([CONFIRM_YES, CONFIRM_NO]),
                ),
            },
        };
        Ok(step)
    }

    async fn enter_project_step(&self, mut draft: DraftOperation) -> WizardStep {
        let projects = match self.api.fetch_all_projects(&draft.credential).await {
            Ok(projects) => projects,
            Err(e) => return abort("loading projects", e),
        };

        if projects.is_empty() {
            // The project dimension is optional: skip straight ahead.
            draft.project = None;
            return self.enter_organisation_step(draft).await;
        }

        let mut options: ChoiceList<Option<Selection>> = projects
            .iter()
            .map(|p| {
                let name = p.display_name();
                (name.clone(), Some(Selection::new(p.id, name)))
            })
            .collect();
        options.push(NO_PROJECT, None);

        let reply = Reply::text("Choose a project:").with_options(options.keys());
        Step::stay(WizardState::ChoosingProject { draft, options }, reply)
    }

    async fn enter_organisation_step(&self, draft: DraftOperation) -> WizardStep {
        let organisations = match self.api.fetch_all_organisations(&draft.credential).await {
            Ok(organisations) => organisations,
            Err(e) => return abort("loading organisations", e),
        };

        if organisations.is_empty() {
            return Step::finish(Reply::text("No organisations available."));
        }

        let options: ChoiceList<Selection> = organisations
            .iter()
            .map(|o| {
                let name = o.display_name();
                (name.clone(), Selection::new(o.id, name))
            })
            .collect();

        let reply = Reply::text("Choose an organisation:").with_options(options.keys());
        Step::stay(WizardState::ChoosingOrganisation { draft, options }, reply)
    }

    async fn enter_account_step(&self, draft: DraftOperation) -> WizardStep {
        let Some(organisation_id) = draft.organisation.as_ref().map(|o| o.id) else {
            return abort(
                "loading accounts",
                BotError::internal("organisation not selected"),
            );
        };

        let accounts = match self.api.fetch_all_accounts(&draft.credential).await {
            Ok(accounts) => accounts,
            Err(e) => return abort("loading accounts", e),
        };

        let options = account_choices(&accounts, organisation_id);
        if options.is_empty() {
            return Step::finish(Reply::text(
                "No bank accounts available for the selected organisation.",
            ));
        }

        let reply = Reply::text("Choose an account:").with_options(options.keys());
        Step::stay(WizardState::ChoosingAccount { draft, options }, reply)
    }

    async fn commit(&self, user_id: UserId, draft: DraftOperation) -> Result<WizardStep> {
        let kind = draft.kind;
        let credential = draft.credential.clone();
        let today = Local::now().date_naive();
        let payment = draft.into_payment(&self.defaults, today)?;

        if let Err(e) = self.api.create_payment(&credential, &payment).await {
            warn!(user_id, external_id = %payment.external_id, error = %e, "Payment rejected");
            return Ok(Step::finish(Reply::text(format!(
                "❌ Failed to submit the operation: {}",
                e
            ))));
        }
        info!(user_id, kind = %kind, external_id = %payment.external_id, "Payment submitted");

        let entry = OperationLogEntry {
            user_id,
            kind,
            operation_date: today,
        };
        let mut text = format!("✅ {} recorded successfully!", kind.label());
        if let Err(e) = self.log.append(entry).await {
            error!(user_id, error = %e, "Failed to append operation log entry");
            text.push_str("\n(The operation was not added to the statistics.)");
        }
        Ok(Step::finish(Reply::text(text)))
    }
}

fn abort(context: &str, e: BotError) -> WizardStep {
    warn!(context, error = %e, "Operation aborted");
    Step::finish(Reply::text(format!("❌ Error {}: {}", context, e)))
}

/// Accounts of `organisation_id`, keyed by their composite display key.
pub fn account_choices(accounts: &[Account], organisation_id: i64) -> ChoiceList<Selection> {
    accounts
        .iter()
        .filter(|a| a.belongs_to(organisation_id))
        .map(|a| (a.display_key(), Selection::new(a.id, a.name())))
        .collect()
}

/// Resolves a typed or tapped option.
pub fn choose<'a, V>(options: &'a ChoiceList<V>, input: &str) -> Result<&'a V> {
    options
        .lookup(input)
        .ok_or_else(|| BotError::validation("Invalid choice."))
}

/// Any non-blank text is accepted verbatim.
pub fn parse_purpose(input: &str) -> Result<String> {
    if input.trim().is_empty() {
        Err(BotError::validation("The purpose cannot be empty. Enter the payment purpose:"))
    } else {
        Ok(input.to_owned())
    }
}

pub fn parse_confirmation(input: &str) -> Result<bool> {
    match input {
        CONFIRM_YES => Ok(true),
        CONFIRM_NO => Ok(false),
        _ => Err(BotError::validation(
            "Please use the buttons to confirm the operation.",
        )),
    }
}
