use crate::error::FetchError;
use crate::fetch::traits::ListingFetcher;
use crate::fetch::types::{ApiErrorBody, Session};
use crate::models::QueryResult;
use crate::query::ListingQuery;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, Request};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetches listing pages from the REST API (`GET {base_url}/properties`)
pub struct HttpListingFetcher {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpListingFetcher {
    /// Create a fetcher without credentials
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Self::build(base_url.into(), timeout, None)
    }

    /// Create a fetcher that sends the session cookie on every request
    pub fn with_session(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Session,
    ) -> Result<Self, FetchError> {
        Self::build(base_url.into(), timeout, Some(session))
    }

    fn build(base_url: String, timeout: Duration, session: Option<Session>) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(session) = &session {
            let cookie = HeaderValue::from_str(&session.cookie)
                .map_err(|e| FetchError::Network(format!("Invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, cookie);
            debug!(user = ?session.user_id, "Attaching session cookie to listing requests");
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(concat!("listing-scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the `GET /properties` request for `query` without sending it
    pub fn build_request(&self, query: &ListingQuery) -> Result<Request, FetchError> {
        self.client
            .get(format!("{}/properties", self.base_url))
            .query(&query.to_params())
            .build()
            .map_err(|e| FetchError::Network(format!("Invalid request: {}", e)))
    }

    fn map_send_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::from(err)
        }
    }
}

/// Turn a non-2xx body into an API error, keeping the server's message if any
pub(crate) fn api_error(status: u16, body: &str) -> FetchError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(ApiErrorBody::into_message);
    FetchError::Api { status, message }
}

pub(crate) fn parse_page(body: &str) -> Result<QueryResult, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))
}

#[async_trait]
impl ListingFetcher for HttpListingFetcher {
    async fn fetch_page(&self, query: &ListingQuery) -> Result<QueryResult, FetchError> {
        let request = self.build_request(query)?;
        debug!("Fetching URL: {}", request.url());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            warn!("Listing API returned status: {}", status);
            return Err(api_error(status.as_u16(), &body));
        }

        debug!("Downloaded {} bytes of JSON", body.len());
        let page = parse_page(&body)?;
        info!(
            "Fetched {} of {} properties (page {})",
            page.properties.len(),
            page.total,
            query.page
        );
        Ok(page)
    }

    fn source_name(&self) -> &'static str {
        "HTTP API"
    }
}
