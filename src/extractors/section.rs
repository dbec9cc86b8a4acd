// src/extractors/section.rs

// --- Imports ---
use serde::Serialize;

use crate::pipeline::resolver::ResolvedFiling;
use crate::sec_api::{SectionCode, SectionSource};
use crate::storage::ArchiveStore;
use crate::utils::error::{ArchiveFailure, StorageError};

// --- Constants ---
pub const ARCHIVE_NAMESPACE: &str = "fraudulent";
pub const ARCHIVE_EXTENSION: &str = "json";

// --- Data Structures ---
/// The narrative sections of one fraudulent 10-K, as written to the archive.
/// Any section may be empty when the filing lacks that item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchivedRecord {
    pub url: String,
    #[serde(rename = "1A")]
    pub risk_factors: String,
    #[serde(rename = "7")]
    pub mdna: String,
    #[serde(rename = "7A")]
    pub market_risk: String,
}

impl ArchivedRecord {
    pub fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        serde_json::to_vec(self).map_err(|e| StorageError::SerializationError(e.to_string()))
    }
}

/// Outcome of archiving a batch of resolved filings.
#[derive(Debug, Default)]
pub struct ArchiveReport {
    /// Keys written, in processing order.
    pub written: Vec<String>,
    pub failed: usize,
}

/// `fraudulent/{cik}/{year}.json`
pub fn archive_key(filing: &ResolvedFiling) -> String {
    format!(
        "{}/{}/{}.{}",
        ARCHIVE_NAMESPACE, filing.cik, filing.year, ARCHIVE_EXTENSION
    )
}

/// Pulls the three narrative sections of one filing.
pub async fn extract_record<X: SectionSource>(
    extractor: &X,
    url: &str,
) -> Result<ArchivedRecord, ArchiveFailure> {
    let mut texts = Vec::with_capacity(SectionCode::ALL.len());
    for section in SectionCode::ALL {
        let text = extractor
            .section(url, section)
            .await
            .map_err(|source| ArchiveFailure::Extraction {
                section: section.code(),
                source,
            })?;
        if text.trim().is_empty() {
            tracing::debug!("Item {} is empty in {}", section.code(), url);
        }
        texts.push(text);
    }

    let mut texts = texts.into_iter();
    Ok(ArchivedRecord {
        url: url.to_string(),
        risk_factors: texts.next().unwrap_or_default(),
        mdna: texts.next().unwrap_or_default(),
        market_risk: texts.next().unwrap_or_default(),
    })
}

async fn archive_one<X, A>(
    extractor: &X,
    archive: &A,
    filing: &ResolvedFiling,
) -> Result<String, ArchiveFailure>
where
    X: SectionSource,
    A: ArchiveStore,
{
    let record = extract_record(extractor, &filing.url).await?;
    let key = archive_key(filing);
    archive.put(&key, record.to_bytes()?).await?;
    Ok(key)
}

/// Extracts and archives every resolved filing, one at a time.
///
/// A failure on one filing is logged and counted; the rest still run.
pub async fn archive<X, A>(filings: &[ResolvedFiling], extractor: &X, store: &A) -> ArchiveReport
where
    X: SectionSource,
    A: ArchiveStore,
{
    let mut report = ArchiveReport::default();

    for filing in filings {
        tracing::info!("Archiving {} filing for CIK {}: {}", filing.year, filing.cik, filing.url);
        match archive_one(extractor, store, filing).await {
            Ok(key) => report.written.push(key),
            Err(e) => {
                tracing::error!("Failed to archive {} ({}): {}", filing.url, filing.cik, e);
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        "Archived {} filings, {} failures",
        report.written.len(),
        report.failed
    );
    report
}
