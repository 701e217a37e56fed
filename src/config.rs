//! Runtime settings, read from command-line flags with environment
//! variable fallbacks.

use crate::domain::operation::PaymentDefaults;
use crate::domain::user::UserId;
use crate::infrastructure::report_finance::DEFAULT_BASE_URL;
use clap::Args;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Base URL of the Report.Finance REST API.
    #[arg(long, env = "FINBOT_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Comma-separated ids of users allowed to open the admin console.
    #[arg(
        long,
        env = "FINBOT_ADMIN_IDS",
        value_delimiter = ',',
        value_parser = parse_user_id,
        global = true
    )]
    pub admin_ids: Vec<UserId>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "FINBOT_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Comment attached to every submitted payment.
    #[arg(long, env = "FINBOT_PAYMENT_COMMENT", default_value = "Chat bot", global = true)]
    pub payment_comment: String,

    /// Currency code of submitted amounts.
    #[arg(long, env = "FINBOT_CURRENCY", default_value = "RUB", global = true)]
    pub currency: String,
}

impl Settings {
    pub fn admins(&self) -> HashSet<UserId> {
        self.admin_ids.iter().copied().collect()
    }

    pub fn payment_defaults(&self) -> PaymentDefaults {
        PaymentDefaults {
            currency: self.currency.clone(),
            comment: self.payment_comment.clone(),
        }
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid user id: {:?}", raw))
}
