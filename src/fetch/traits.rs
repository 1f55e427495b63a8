use crate::error::FetchError;
use crate::models::QueryResult;
use crate::query::ListingQuery;
use async_trait::async_trait;

/// Source of listing pages.
///
/// The engine only talks to this trait, so tests and alternative backends
/// can stand in for the HTTP API.
#[async_trait]
pub trait ListingFetcher: Send + Sync {
    /// Fetch one page of listings matching `query`
    async fn fetch_page(&self, query: &ListingQuery) -> Result<QueryResult, FetchError>;

    /// Get the name of the backing source
    fn source_name(&self) -> &'static str;
}
