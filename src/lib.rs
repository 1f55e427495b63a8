//! Property listing search engine.
//!
//! Holds the filter state of a listing page (listing type, region/city
//! cascade, price range, property type, room counts, free-text search),
//! turns it into paginated `GET /properties` queries, and reconciles the
//! responses into a loading / error / empty / success view. Responses from
//! superseded queries are discarded.

pub mod advisory;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod models;
pub mod query;

pub use advisory::{AdvisoryHint, AdvisoryThresholds};
pub use config::Config;
pub use directory::RegionDirectory;
pub use engine::{
    CompletedQuery, EngineSettings, ListingQueryEngine, PendingQuery, QueryExecutor, ViewKind,
    ViewState,
};
pub use error::{FetchError, ValidationError};
pub use fetch::{HttpListingFetcher, ListingFetcher, Session};
pub use filters::{FilterKey, FilterState, FilterUpdate};
pub use models::{ListingType, Property, PropertyType, QueryResult};
pub use query::ListingQuery;
