//! Client for the external paginated table-read service.
//!
//! The service itself (SQL execution, pagination) is an external
//! collaborator; this crate only reads from it, primarily to populate the
//! organisation selector with tenant options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query parameters accepted by the row-fetch endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RowQuery {
    pub table: String,
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
    #[serde(rename = "whereClause", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
}

impl RowQuery {
    /// Defaults mirror the service: page 1, 100 rows.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            page: 1,
            page_size: 100,
            where_clause: None,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Page size is bounded to the service's accepted 1..=1000 range.
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size.clamp(1, 1000);
        self
    }

    pub fn where_clause(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }
}

/// One page of rows from the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowPage {
    #[serde(default)]
    pub rows: Vec<BTreeMap<String, Value>>,
    #[serde(default)]
    pub columns: Vec<String>,
    pub total_pages: u32,
    pub current_page: u32,
    pub total_count: u64,
}

/// Error body the service returns with 4xx statuses.
#[derive(Debug, Clone, Deserialize)]
struct RowErrorBody {
    error: String,
}

/// Error type for row-fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum RowFetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("row service rejected the query: {message}")]
    Service {
        status: reqwest::StatusCode,
        message: String,
    },
}

/// A tenant option for the organisation selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganisationOption {
    pub id: i64,
    pub name: String,
}

/// Read-only client for the row-fetch service.
#[derive(Debug, Clone)]
pub struct RowFetchClient {
    http: reqwest::Client,
    base_url: String,
}

impl RowFetchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Fetch one page of rows.
    pub async fn fetch_rows(&self, query: &RowQuery) -> Result<RowPage, RowFetchError> {
        let url = format!("{}/api/database", self.base_url);
        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<RowErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(RowFetchError::Service { status, message });
        }

        Ok(response.json().await?)
    }

    /// Load tenant options from the `organisations` table.
    pub async fn organisation_options(&self) -> Result<Vec<OrganisationOption>, RowFetchError> {
        let query = RowQuery::table("organisations").page_size(50);
        let page = self.fetch_rows(&query).await?;
        Ok(organisation_options_from_rows(&page.rows))
    }
}

/// Map raw organisation rows to selector options, skipping malformed rows.
/// Ids arrive as numbers or numeric strings depending on the backing
/// database driver.
pub fn organisation_options_from_rows(
    rows: &[BTreeMap<String, Value>],
) -> Vec<OrganisationOption> {
    rows.iter()
        .filter_map(|row| {
            let id = match row.get("id")? {
                Value::Number(n) => n.as_i64()?,
                Value::String(s) => s.trim().parse().ok()?,
                _ => return None,
            };
            let name = row.get("name")?.as_str()?.to_string();
            Some(OrganisationOption { id, name })
        })
        .collect()
}
