// src/records/models.rs
use serde::{Deserialize, Serialize};

/// One fraud-related filing reference, keyed by `(company_name, url)`.
///
/// Maintained by upstream data entry; this crate only ever flips `scraped`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudIncident {
    pub cik: String,
    pub company_name: String,
    pub year_start: i32,
    pub month_start: i32,
    pub year_end: i32,
    pub month_end: i32,
    pub url: String,
    pub contains_21c: bool,
    #[serde(default)]
    pub scraped: bool,
}

/// A bounded slice of the incident table plus the token for the next one.
#[derive(Debug, Clone, Default)]
pub struct IncidentPage {
    pub items: Vec<FraudIncident>,
    /// `None` once the scan is exhausted.
    pub last_evaluated_key: Option<String>,
}

/// Result of a single `scraped = true` update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// No incident exists for the `(company_name, url)` key.
    Missing,
}
