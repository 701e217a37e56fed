use crate::domain::catalog::{Account, Catalog, FactStream, Organisation, Project};
use crate::domain::operation::{OperationLogEntry, PaymentRecord};
use crate::domain::page::Page;
use crate::domain::ports::{FinanceApi, OperationLog, UserStore};
use crate::domain::user::{Credential, UserId, UserProfile};
use crate::error::{BotError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store of registered users.
///
/// Uses `Arc<RwLock<HashMap<UserId, UserProfile>>>` to allow shared concurrent access.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, UserProfile>>>,
}

impl InMemoryUserStore {
    /// Creates a new, empty user store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn register(&self, profile: UserProfile) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(profile.user_id, profile);
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }
}

/// Append-only in-memory operation log.
#[derive(Default, Clone)]
pub struct InMemoryOperationLog {
    entries: Arc<RwLock<Vec<OperationLogEntry>>>,
}

impl InMemoryOperationLog {
    /// Creates a new, empty operation log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OperationLog for InMemoryOperationLog {
    async fn append(&self, entry: OperationLogEntry) -> Result<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<OperationLogEntry>> {
        Ok(self.entries.read().await.clone())
    }
}

/// Offline finance backend serving a fixed [`Catalog`].
///
/// Pages are cut exactly like the remote API does and submitted payments
/// are kept for inspection. When an allow-list of credentials is set, any
/// other credential gets an [`BotError::Auth`].
#[derive(Default, Clone)]
pub struct InMemoryFinanceApi {
    catalog: Arc<Catalog>,
    accepted: Option<Arc<HashSet<String>>>,
    payments: Arc<RwLock<Vec<PaymentRecord>>>,
}

impl InMemoryFinanceApi {
    /// Creates a backend serving `catalog` to any credential.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            ..Self::default()
        }
    }

    /// Loads the catalog from a JSON file shaped like [`Catalog`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&content)?;
        Ok(Self::new(catalog))
    }

    /// Restricts access to the given credentials; others get an auth error.
    pub fn accepting<I, S>(mut self, credentials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted = Some(Arc::new(credentials.into_iter().map(Into::into).collect()));
        self
    }

    /// Payments received so far, in submission order.
    pub async fn payments(&self) -> Vec<PaymentRecord> {
        self.payments.read().await.clone()
    }

    fn authorize(&self, credential: &Credential) -> Result<()> {
        match &self.accepted {
            Some(accepted) if !accepted.contains(credential.expose()) => {
                Err(BotError::Auth("check the API key".to_owned()))
            }
            _ => Ok(()),
        }
    }
}

fn slice_page<T: Clone>(items: &[T], offset: u64, limit: u32) -> Page<T> {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(items.len());
    let end = start.saturating_add(limit as usize).min(items.len());
    Page::new(items[start..end].to_vec(), items.len() as u64)
}

#[async_trait]
impl FinanceApi for InMemoryFinanceApi {
    async fn projects_page(
        &self,
        credential: &Credential,
        offset: u64,
        limit: u32,
    ) -> Result<Page<Project>> {
        self.authorize(credential)?;
        Ok(slice_page(&self.catalog.projects, offset, limit))
    }

    async fn accounts_page(
        &self,
        credential: &Credential,
        offset: u64,
        limit: u32,
    ) -> Result<Page<Account>> {
        self.authorize(credential)?;
        Ok(slice_page(&self.catalog.accounts, offset, limit))
    }

    async fn organisations_page(
        &self,
        credential: &Credential,
        offset: u64,
        limit: u32,
    ) -> Result<Page<Organisation>> {
        self.authorize(credential)?;
        Ok(slice_page(&self.catalog.organisations, offset, limit))
    }

    async fn fact_streams(&self, credential: &Credential) -> Result<Vec<FactStream>> {
        self.authorize(credential)?;
        Ok(self.catalog.fact_streams.clone())
    }

    async fn create_payment(
        &self,
        credential: &Credential,
        payment: &PaymentRecord,
    ) -> Result<String> {
        self.authorize(credential)?;
        self.payments.write().await.push(payment.clone());
        Ok(payment.external_id.to_string())
    }
}
