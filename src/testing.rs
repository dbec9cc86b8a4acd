// src/testing.rs
//! In-memory stand-ins for the record store, sec-api.io and the archive.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::records::{FraudIncident, IncidentPage, RecordStore, UpdateOutcome};
use crate::sec_api::models::{DocumentFile, Filing};
use crate::sec_api::{FilingQuery, FilingSearch, QueryResponse, SectionCode, SectionSource};
use crate::storage::ArchiveStore;
use crate::utils::error::{SecApiError, StorageError, StoreError};

/// An eligible 2018-01 .. 2019-06 incident with a 21(c) reference.
pub fn incident(cik: &str, company_name: &str, url: &str) -> FraudIncident {
    FraudIncident {
        cik: cik.into(),
        company_name: company_name.into(),
        year_start: 2018,
        month_start: 1,
        year_end: 2019,
        month_end: 6,
        url: url.into(),
        contains_21c: true,
        scraped: false,
    }
}

pub fn filing(filed_at: &str, docs: &[(&str, &str)]) -> Filing {
    Filing {
        accession_no: None,
        filed_at: format!("{filed_at}T16:00:00-05:00"),
        document_format_files: docs
            .iter()
            .map(|(doc_type, url)| DocumentFile {
                doc_type: doc_type.to_string(),
                document_url: url.to_string(),
            })
            .collect(),
    }
}

// ─── Record store ────────────────────────────────────────────────────────────

/// Serves its rows in fixed-size pages, continuation token = next offset.
pub struct PagedStore {
    rows: Mutex<Vec<FraudIncident>>,
    page_size: usize,
    scans: AtomicUsize,
    updates: AtomicUsize,
    fail_scans: bool,
    fail_update_url: Option<String>,
}

impl PagedStore {
    pub fn new(rows: Vec<FraudIncident>, page_size: usize) -> Self {
        Self {
            rows: Mutex::new(rows),
            page_size,
            scans: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            fail_scans: false,
            fail_update_url: None,
        }
    }

    pub fn failing_scans(mut self) -> Self {
        self.fail_scans = true;
        self
    }

    pub fn failing_update_for(mut self, url: &str) -> Self {
        self.fail_update_url = Some(url.to_string());
        self
    }

    pub fn scan_calls(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn is_scraped(&self, company_name: &str, url: &str) -> bool {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.company_name == company_name && r.url == url && r.scraped)
    }
}

impl RecordStore for PagedStore {
    async fn scan_page(&self, start_key: Option<&str>) -> Result<IncidentPage, StoreError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if self.fail_scans {
            return Err(StoreError::Unavailable("connection refused".into()));
        }

        let offset: usize = start_key.map_or(0, |k| k.parse().unwrap());
        let rows = self.rows.lock().unwrap();
        let end = (offset + self.page_size).min(rows.len());
        let items = rows[offset..end].to_vec();
        let last_evaluated_key = (end < rows.len()).then(|| end.to_string());

        Ok(IncidentPage {
            items,
            last_evaluated_key,
        })
    }

    async fn set_scraped(&self, company_name: &str, url: &str) -> Result<UpdateOutcome, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_update_url.as_deref() == Some(url) {
            return Err(StoreError::Unavailable("update timed out".into()));
        }

        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|r| r.company_name == company_name && r.url == url)
        {
            Some(row) => {
                row.scraped = true;
                Ok(UpdateOutcome::Updated)
            }
            None => Ok(UpdateOutcome::Missing),
        }
    }
}

// ─── sec-api.io ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeSearch {
    filings: HashMap<String, Vec<Filing>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<FilingQuery>>,
}

impl FakeSearch {
    pub fn with(mut self, cik: &str, filings: Vec<Filing>) -> Self {
        self.filings.insert(cik.to_string(), filings);
        self
    }

    pub fn failing_for(mut self, cik: &str) -> Self {
        self.failing.insert(cik.to_string());
        self
    }

    pub fn queries(&self) -> Vec<FilingQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl FilingSearch for FakeSearch {
    async fn search(&self, query: &FilingQuery) -> Result<QueryResponse, SecApiError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.failing.contains(&query.cik) {
            return Err(SecApiError::Parse("unexpected end of input".into()));
        }
        Ok(QueryResponse {
            filings: self.filings.get(&query.cik).cloned().unwrap_or_default(),
        })
    }
}

/// Returns `"{item} of {url}"` for every section.
#[derive(Default)]
pub struct FakeExtractor {
    failing_urls: HashSet<String>,
    empty_sections: HashSet<&'static str>,
    requests: Mutex<Vec<(String, &'static str)>>,
}

impl FakeExtractor {
    pub fn failing_for(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    pub fn empty_section(mut self, code: &'static str) -> Self {
        self.empty_sections.insert(code);
        self
    }

    pub fn requests(&self) -> Vec<(String, &'static str)> {
        self.requests.lock().unwrap().clone()
    }
}

impl SectionSource for FakeExtractor {
    async fn section(&self, url: &str, section: SectionCode) -> Result<String, SecApiError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), section.code()));
        if self.failing_urls.contains(url) {
            return Err(SecApiError::RateLimited);
        }
        if self.empty_sections.contains(section.code()) {
            return Ok(String::new());
        }
        Ok(format!("{} of {}", section.code(), url))
    }
}

/// Both sec-api.io seams behind one value, like the real client.
#[derive(Default)]
pub struct FakeSec {
    pub search: FakeSearch,
    pub extractor: FakeExtractor,
}

impl FakeSec {
    pub fn with(mut self, cik: &str, filings: Vec<Filing>) -> Self {
        self.search = self.search.with(cik, filings);
        self
    }
}

impl FilingSearch for FakeSec {
    async fn search(&self, query: &FilingQuery) -> Result<QueryResponse, SecApiError> {
        self.search.search(query).await
    }
}

impl SectionSource for FakeSec {
    async fn section(&self, url: &str, section: SectionCode) -> Result<String, SecApiError> {
        self.extractor.section(url, section).await
    }
}

// ─── Archive ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryArchive {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    failing_keys: HashSet<String>,
    puts: AtomicUsize,
}

impl MemoryArchive {
    pub fn failing_for(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl ArchiveStore for MemoryArchive {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.failing_keys.contains(key) {
            return Err(StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only bucket",
            )));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), body);
        Ok(())
    }
}
