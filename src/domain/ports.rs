use super::catalog::{Account, FactStream, Organisation, Project};
use super::operation::{OperationLogEntry, PaymentRecord};
use super::page::{PAGE_SIZE, Page, fetch_all_pages};
use super::user::{Credential, UserId, UserProfile};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Remote finance service, authenticated per call with the user's credential.
///
/// Implementors provide single-page access; the `fetch_all_*` methods drain
/// the pages with [`fetch_all_pages`].
#[async_trait]
pub trait FinanceApi: Send + Sync {
    async fn projects_page(
        &self,
        credential: &Credential,
        offset: u64,
        limit: u32,
    ) -> Result<Page<Project>>;

    async fn accounts_page(
        &self,
        credential: &Credential,
        offset: u64,
        limit: u32,
    ) -> Result<Page<Account>>;

    async fn organisations_page(
        &self,
        credential: &Credential,
        offset: u64,
        limit: u32,
    ) -> Result<Page<Organisation>>;

    /// Unpaginated.
    async fn fact_streams(&self, credential: &Credential) -> Result<Vec<FactStream>>;

    /// Submits one payment and returns the raw response text.
    async fn create_payment(&self, credential: &Credential, payment: &PaymentRecord)
    -> Result<String>;

    async fn fetch_all_projects(&self, credential: &Credential) -> Result<Vec<Project>> {
        fetch_all_pages(PAGE_SIZE, |offset, limit| {
            self.projects_page(credential, offset, limit)
        })
        .await
    }

    async fn fetch_all_accounts(&self, credential: &Credential) -> Result<Vec<Account>> {
        fetch_all_pages(PAGE_SIZE, |offset, limit| {
            self.accounts_page(credential, offset, limit)
        })
        .await
    }

    async fn fetch_all_organisations(&self, credential: &Credential) -> Result<Vec<Organisation>> {
        fetch_all_pages(PAGE_SIZE, |offset, limit| {
            self.organisations_page(credential, offset, limit)
        })
        .await
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts or replaces the profile of `profile.user_id`.
    async fn register(&self, profile: UserProfile) -> Result<()>;
    async fn get(&self, user_id: UserId) -> Result<Option<UserProfile>>;
}

#[async_trait]
pub trait OperationLog: Send + Sync {
    async fn append(&self, entry: OperationLogEntry) -> Result<()>;
    async fn all(&self) -> Result<Vec<OperationLogEntry>>;
}

pub type FinanceApiRef = Arc<dyn FinanceApi>;
pub type UserStoreRef = Arc<dyn UserStore>;
pub type OperationLogRef = Arc<dyn OperationLog>;
