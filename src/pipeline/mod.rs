// src/pipeline/mod.rs
//! Record store → window aggregation → filing resolution → section archive.

pub mod resolver;
pub mod windows;

use crate::extractors::{self, ArchiveReport};
use crate::records::{self, RecordStore};
use crate::sec_api::{FilingSearch, SectionSource};
use crate::storage::ArchiveStore;
use crate::utils::error::StoreError;

/// Counts gathered over one pipeline run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub incidents: usize,
    pub windows: usize,
    pub resolved: usize,
    pub unmatched: usize,
    pub failed_windows: usize,
    pub archived: usize,
    pub archive_failures: usize,
}

/// Runs every stage in order, one external call at a time.
///
/// Only a failure to read the record store aborts the run; per-window and
/// per-filing failures are logged and counted. Incidents that resolve are
/// marked scraped, so running again only picks up what is still pending.
pub async fn run<S, C, A>(store: &S, sec: &C, archive: &A) -> Result<RunSummary, StoreError>
where
    S: RecordStore,
    C: FilingSearch + SectionSource,
    A: ArchiveStore,
{
    let incidents = records::fetch_all(store).await?;
    let fraud_windows = windows::aggregate(&incidents);
    let resolution = resolver::resolve(&fraud_windows, sec, store).await;
    let ArchiveReport { written, failed } =
        extractors::archive(&resolution.filings, sec, archive).await;

    Ok(RunSummary {
        incidents: incidents.len(),
        windows: fraud_windows.len(),
        resolved: resolution.filings.len(),
        unmatched: resolution.unmatched.len(),
        failed_windows: resolution.failed.len(),
        archived: written.len(),
        archive_failures: failed,
    })
}
