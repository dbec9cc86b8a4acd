// src/sec_api/mod.rs
pub mod client;
pub mod models;

use std::future::Future;

use crate::utils::error::SecApiError;
pub use client::SecApiClient;
pub use models::{FilingQuery, QueryResponse, SectionCode};

/// Structured search over the filing index.
pub trait FilingSearch {
    fn search(&self, query: &FilingQuery) -> impl Future<Output = Result<QueryResponse, SecApiError>>;
}

/// Plain-text extraction of one item from a filing document.
pub trait SectionSource {
    /// Returns the section text; an empty string means the filing has no such item.
    fn section(
        &self,
        url: &str,
        section: SectionCode,
    ) -> impl Future<Output = Result<String, SecApiError>>;
}
