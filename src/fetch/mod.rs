pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpListingFetcher;
pub use traits::ListingFetcher;
pub use types::Session;
