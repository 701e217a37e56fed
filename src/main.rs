use clap::{Parser, Subcommand};
use finbot::application::admin::AdminConsole;
use finbot::application::bot::Bot;
use finbot::application::wizard::OperationWizard;
use finbot::config::Settings;
use finbot::domain::ports::{FinanceApiRef, OperationLog, OperationLogRef, UserStore, UserStoreRef};
use finbot::domain::user::{Credential, UserId, UserProfile};
use finbot::infrastructure::in_memory::{
    InMemoryFinanceApi, InMemoryOperationLog, InMemoryUserStore,
};
use finbot::infrastructure::report_finance::ReportFinanceClient;
use finbot::interfaces::console::Console;
use finbot::interfaces::csv::operation_writer::OperationWriter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the bot on stdin/stdout as the given user.
    Chat {
        #[arg(long)]
        user: UserId,

        /// Serve projects, organisations and accounts from a local JSON
        /// catalog instead of the remote API.
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Directory where exported reports are written.
        #[arg(long, default_value = ".")]
        report_dir: PathBuf,
    },
    /// Register (or re-register) a user's API key.
    Register {
        #[arg(long)]
        user: UserId,

        #[arg(long)]
        api_key: String,

        #[arg(long)]
        organisation: Option<String>,
    },
    /// Export the operation log as CSV.
    Export {
        /// Output file; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

struct Stores {
    users: UserStoreRef,
    log: OperationLogRef,
    persistent: bool,
}

impl Stores {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            log: Arc::new(InMemoryOperationLog::new()),
            persistent: false,
        }
    }

    /// Fails unless the stores outlive the process.
    fn require_persistent(&self, command: &str) -> Result<()> {
        if self.persistent {
            Ok(())
        } else {
            Err(miette::miette!(
                help = "pass --db-path and build with the 'storage-rocksdb' feature",
                "`{}` needs persistent storage",
                command
            ))
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_persistent(path: &Path) -> Result<Stores> {
    use finbot::infrastructure::rocksdb::RocksDBStore;

    let store = RocksDBStore::open(path).into_diagnostic()?;
    info!(path = %path.display(), "Using RocksDB storage");
    Ok(Stores {
        users: Arc::new(store.clone()),
        log: Arc::new(store),
        persistent: true,
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_persistent(_path: &Path) -> Result<Stores> {
    tracing::warn!(
        "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
    );
    Ok(Stores::in_memory())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finbot=info")),
        )
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let settings = cli.settings;

    let stores = match &settings.db_path {
        Some(path) => open_persistent(path)?,
        None => Stores::in_memory(),
    };

    match cli.command {
        Command::Chat {
            user,
            catalog,
            report_dir,
        } => {
            let api: FinanceApiRef = match catalog {
                Some(path) => {
                    info!(path = %path.display(), "Using offline catalog");
                    Arc::new(InMemoryFinanceApi::from_file(path).into_diagnostic()?)
                }
                None => Arc::new(ReportFinanceClient::new(&settings.base_url).into_diagnostic()?),
            };

            let wizard = OperationWizard::new(
                api,
                stores.users.clone(),
                stores.log.clone(),
                settings.payment_defaults(),
            );
            let admin = AdminConsole::new(stores.users, stores.log, settings.admins());
            let bot = Bot::new(wizard, admin);

            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut console = Console::new(stdin.lock(), stdout.lock(), report_dir);
            console.run(&bot, user).await.into_diagnostic()?;
        }
        Command::Register {
            user,
            api_key,
            organisation,
        } => {
            stores.require_persistent("register")?;
            let mut profile = UserProfile::new(user, Credential::new(api_key.trim()));
            profile.organisation_label = organisation.filter(|o| !o.trim().is_empty());
            stores.users.register(profile).await.into_diagnostic()?;
            println!("User {} registered.", user);
        }
        Command::Export { output } => {
            stores.require_persistent("export")?;
            let entries = stores.log.all().await.into_diagnostic()?;
            match output {
                Some(path) => {
                    let file = File::create(&path).into_diagnostic()?;
                    OperationWriter::new(file)
                        .write_entries(&entries)
                        .into_diagnostic()?;
                    eprintln!("{} operations written to {}", entries.len(), path.display());
                }
                None => {
                    let stdout = io::stdout();
                    OperationWriter::new(stdout.lock())
                        .write_entries(&entries)
                        .into_diagnostic()?;
                }
            }
        }
    }

    Ok(())
}
