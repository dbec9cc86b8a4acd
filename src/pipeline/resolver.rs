// src/pipeline/resolver.rs
//! Maps fraud windows to the 10-K filings filed inside them.

use crate::pipeline::windows::{FraudWindow, FraudWindows};
use crate::records::{self, RecordStore};
use crate::sec_api::{FilingQuery, FilingSearch, QueryResponse};
use crate::utils::error::SecApiError;

/// A 10-K document matched to a fraud window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFiling {
    pub url: String,
    pub cik: String,
    /// Four-digit year taken from the filing's `filedAt` timestamp.
    pub year: String,
}

/// Everything the resolver learned about a batch of windows.
#[derive(Debug, Default)]
pub struct Resolution {
    pub filings: Vec<ResolvedFiling>,
    /// CIKs with no matching 10-K; their incidents stay unscraped.
    pub unmatched: Vec<String>,
    /// CIKs whose query failed.
    pub failed: Vec<String>,
}

/// Picks the first document typed "10-K" (any case), scanning filings in
/// order and each filing's documents in order.
///
/// Amendments and later duplicates are never considered: one document per
/// window is enough for the archive.
pub fn first_10k(cik: &str, response: &QueryResponse) -> Option<ResolvedFiling> {
    response.filings.iter().find_map(|filing| {
        filing
            .document_format_files
            .iter()
            .find(|doc| doc.doc_type.eq_ignore_ascii_case("10-k"))
            .map(|doc| {
                tracing::debug!(
                    "Matched {} in filing {}",
                    doc.document_url,
                    filing.accession_no.as_deref().unwrap_or("<unknown>")
                );
                ResolvedFiling {
                    url: doc.document_url.clone(),
                    cik: cik.to_string(),
                    year: filing.filed_at.chars().take(4).collect(),
                }
            })
    })
}

async fn resolve_window<Q: FilingSearch>(
    search: &Q,
    window: &FraudWindow,
) -> Result<Option<ResolvedFiling>, SecApiError> {
    let query = FilingQuery::new(&window.cik, window.start_year, window.end_year);
    let response = search.search(&query).await?;
    tracing::debug!(
        "Query for CIK {} returned {} filings",
        window.cik,
        response.filings.len()
    );
    Ok(first_10k(&window.cik, &response))
}

/// Resolves every window, one query at a time.
///
/// A match marks the window's source incidents as scraped. Unmatched and
/// failed windows are recorded and skipped; neither stops the batch.
pub async fn resolve<Q, S>(windows: &FraudWindows, search: &Q, store: &S) -> Resolution
where
    Q: FilingSearch,
    S: RecordStore,
{
    let mut resolution = Resolution::default();

    for window in windows.values() {
        match resolve_window(search, window).await {
            Ok(Some(filing)) => {
                tracing::info!(
                    "Resolved {} (CIK {}) to {} filing {}",
                    window.company_name,
                    window.cik,
                    filing.year,
                    filing.url
                );
                if let Some(Err(e)) =
                    records::mark_scraped(store, &window.company_name, &window.urls).await
                {
                    tracing::warn!(
                        "Last scraped-status update for {} failed: {}",
                        window.company_name,
                        e
                    );
                }
                resolution.filings.push(filing);
            }
            Ok(None) => {
                tracing::info!(
                    "No 10-K found for {} (CIK {}) between {} and {}",
                    window.company_name,
                    window.cik,
                    window.start_year,
                    window.end_year
                );
                resolution.unmatched.push(window.cik.clone());
            }
            Err(e) => {
                tracing::error!(
                    "Filing query failed for {} (CIK {}): {}",
                    window.company_name,
                    window.cik,
                    e
                );
                resolution.failed.push(window.cik.clone());
            }
        }
    }

    resolution
}
