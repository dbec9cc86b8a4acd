// src/sec_api/client.rs
use std::time::Duration;

use reqwest::{header, StatusCode};

use crate::sec_api::models::{FilingQuery, QueryResponse, SectionCode};
use crate::sec_api::{FilingSearch, SectionSource};
use crate::utils::error::SecApiError;

pub const DEFAULT_API_URL: &str = "https://api.sec-api.io";

const USER_AGENT: &str = concat!("fraud_filings/", env!("CARGO_PKG_VERSION"));
// Keep well under the sec-api.io request rate; calls are sequential anyway.
const REQUEST_DELAY_MS: u64 = 150;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for the sec-api.io query and extractor endpoints.
pub struct SecApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SecApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, SecApiError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn throttle(&self) {
        tokio::time::sleep(Duration::from_millis(REQUEST_DELAY_MS)).await;
    }
}

/// Maps non-2xx statuses onto the error taxonomy.
fn check_status(status: StatusCode, what: &str) -> Result<(), SecApiError> {
    if status.is_success() {
        return Ok(());
    }

    tracing::error!("HTTP error status: {} for {}", status, what);
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SecApiError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => SecApiError::RateLimited,
        StatusCode::NOT_FOUND => SecApiError::NotFound(what.to_string()),
        other => SecApiError::Http(other),
    })
}

impl FilingSearch for SecApiClient {
    async fn search(&self, query: &FilingQuery) -> Result<QueryResponse, SecApiError> {
        tracing::debug!("Querying filings: {}", query.query_string());
        self.throttle().await;

        let response = self
            .http
            .post(&self.base_url)
            .query(&[("token", self.api_key.as_str())])
            .header(header::ACCEPT, "application/json")
            .json(&query.to_body())
            .send()
            .await?;

        check_status(response.status(), &format!("filing query for CIK {}", query.cik))?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SecApiError::Parse(e.to_string()))
    }
}

impl SectionSource for SecApiClient {
    async fn section(&self, url: &str, section: SectionCode) -> Result<String, SecApiError> {
        tracing::debug!("Extracting item {} from {}", section.code(), url);
        self.throttle().await;

        let response = self
            .http
            .get(format!("{}/extractor", self.base_url))
            .query(&[
                ("url", url),
                ("item", section.code()),
                ("type", "text"),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await?;

        check_status(response.status(), url)?;

        let text = response.text().await?;
        tracing::debug!("Extracted {} bytes of item {}", text.len(), section.code());
        Ok(text)
    }
}
