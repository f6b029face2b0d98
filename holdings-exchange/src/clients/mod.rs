//! HTTP clients for the review service and the search API

pub mod document_stream;
pub mod review_client;
pub mod search_client;

pub use review_client::{ReviewClient, ReviewFilter};
pub use search_client::{SearchApi, SearchClient, SearchError};
