// src/sec_api/models.rs
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

/// Response of the sec-api.io full-text query endpoint.
/// Only the fields the resolver reads are modelled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub filings: Vec<Filing>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filing {
    #[serde(default)]
    pub accession_no: Option<String>,
    pub filed_at: String,
    #[serde(default)]
    pub document_format_files: Vec<DocumentFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    #[serde(rename = "type", default)]
    pub doc_type: String,
    pub document_url: String,
}

/// Search for 10-K filings of one company filed inside a year range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingQuery {
    pub cik: String,
    pub start_year: i32,
    pub end_year: i32,
}

impl FilingQuery {
    pub fn new(cik: impl Into<String>, start_year: i32, end_year: i32) -> Self {
        Self {
            cik: cik.into(),
            start_year,
            end_year,
        }
    }

    /// Lucene-style query string understood by the query endpoint.
    pub fn query_string(&self) -> String {
        format!(
            "cik:\"{}\" AND filedAt:{{{} TO {}}} AND formType:\"10-K\" AND documentFormatFiles.type:\"10-K\"",
            self.cik,
            format_day(self.start_year, 1, 1),
            format_day(self.end_year, 12, 31),
        )
    }

    /// JSON body posted to the query endpoint.
    pub fn to_body(&self) -> serde_json::Value {
        json!({
            "query": {
                "query_string": {
                    "query": self.query_string()
                }
            }
        })
    }
}

fn format_day(year: i32, month: u32, day: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        // Out of chrono's range; the endpoint rejects it with a clear error either way.
        None => format!("{}-{:02}-{:02}", year, month, day),
    }
}

/// Narrative sections pulled from every resolved 10-K.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionCode {
    /// Item 1A, Risk Factors.
    RiskFactors,
    /// Item 7, Management's Discussion and Analysis.
    Mdna,
    /// Item 7A, Quantitative and Qualitative Disclosures About Market Risk.
    MarketRisk,
}

impl SectionCode {
    pub const ALL: [SectionCode; 3] = [
        SectionCode::RiskFactors,
        SectionCode::Mdna,
        SectionCode::MarketRisk,
    ];

    /// Item code used by the extractor endpoint.
    pub fn code(self) -> &'static str {
        match self {
            SectionCode::RiskFactors => "1A",
            SectionCode::Mdna => "7",
            SectionCode::MarketRisk => "7A",
        }
    }
}
