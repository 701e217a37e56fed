//! HTTP client of the Report.Finance REST API.

use crate::domain::catalog::{Account, FactStream, Organisation, Project};
use crate::domain::operation::PaymentRecord;
use crate::domain::page::Page;
use crate::domain::ports::FinanceApi;
use crate::domain::user::Credential;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://rest.api.report.finance";

/// Stateless client; the credential travels with every call.
#[derive(Clone)]
pub struct ReportFinanceClient {
    client: Client,
    base_url: String,
}

impl ReportFinanceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        let base_url = base_url.into().trim().trim_end_matches('/').to_owned();
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request
            .header("accept", "application/json")
            .header("X-API-KEY", credential.expose())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        let request = self.authorized(self.client.get(self.url(path)), credential);
        let response = request.query(query).send().await?;
        let body = expect_ok(response, what).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
        offset: u64,
        limit: u32,
        what: &str,
    ) -> Result<Page<T>> {
        let query = [("offset", offset.to_string()), ("limit", limit.to_string())];
        let page: Page<T> = self.get_json(credential, path, &query, what).await?;
        debug!(path, offset, limit, received = page.items.len(), "Page loaded");
        Ok(page)
    }
}

/// 200 → body; 401 → [`BotError::Auth`]; anything else → [`BotError::Remote`].
async fn expect_ok(response: Response, what: &str) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    match status {
        StatusCode::OK => Ok(body),
        StatusCode::UNAUTHORIZED => {
            warn!(what, "Remote API rejected the credential");
            Err(BotError::Auth(format!("check the API key ({})", what)))
        }
        _ => Err(BotError::Remote {
            status: status.as_u16(),
            body,
        }),
    }
}

#[async_trait]
impl FinanceApi for ReportFinanceClient {
    async fn projects_page(
        &self,
        credential: &Credential,
        offset: u64,
        limit: u32,
    ) -> Result<Page<Project>> {
        self.get_page(credential, "/api/Projects", offset, limit, "loading projects")
            .await
    }

    async fn accounts_page(
        &self,
        credential: &Credential,
        offset: u64,
        limit: u32,
    ) -> Result<Page<Account>> {
        self.get_page(credential, "/api/Accounts", offset, limit, "loading accounts")
            .await
    }

    async fn organisations_page(
        &self,
        credential: &Credential,
        offset: u64,
        limit: u32,
    ) -> Result<Page<Organisation>> {
        self.get_page(
            credential,
            "/api/Organisations",
            offset,
            limit,
            "loading organisations",
        )
        .await
    }

    async fn fact_streams(&self, credential: &Credential) -> Result<Vec<FactStream>> {
        self.get_json(credential, "/api/FactStreams", &[], "loading fact streams")
            .await
    }

    async fn create_payment(
        &self,
        credential: &Credential,
        payment: &PaymentRecord,
    ) -> Result<String> {
        // The endpoint is a batch endpoint; we always send exactly one item.
        let request = self.authorized(self.client.post(self.url("/api/Payments")), credential);
        let response = request
            .query(&[("isRunRules", "false")])
            .json(&[payment])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::OK {
            debug!(external_id = %payment.external_id, "Payment accepted");
            Ok(body)
        } else {
            Err(BotError::Remote {
                status: status.as_u16(),
                body,
            })
        }
    }
}
