// src/pipeline/windows.rs
//! Collapses per-incident fraud records into one fraud window per company.

use std::collections::BTreeMap;
use std::fmt;

use crate::records::FraudIncident;

/// Minimum span, in months, of a fraud that starts and ends in the same year.
pub const MIN_SAME_YEAR_MONTHS: i32 = 6;

/// The merged date range across one company's eligible incidents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FraudWindow {
    pub cik: String,
    pub company_name: String,
    pub start_year: i32,
    pub end_year: i32,
    /// Source incident URLs in first-seen order; duplicates are kept.
    pub urls: Vec<String>,
}

/// Windows keyed by CIK. Iteration order is by CIK, so runs are reproducible.
pub type FraudWindows = BTreeMap<String, FraudWindow>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    AlreadyScraped,
    InvertedRange,
    NoSection21c,
    TooShort,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Ineligibility::AlreadyScraped => "already scraped",
            Ineligibility::InvertedRange => "start year after end year",
            Ineligibility::NoSection21c => "no 21(c) reference",
            Ineligibility::TooShort => "fraud shorter than six months",
        };
        f.write_str(reason)
    }
}

/// Checks whether an incident may contribute to a window.
pub fn eligibility(incident: &FraudIncident) -> Result<(), Ineligibility> {
    if incident.scraped {
        return Err(Ineligibility::AlreadyScraped);
    }
    if incident.year_start > incident.year_end {
        return Err(Ineligibility::InvertedRange);
    }
    if !incident.contains_21c {
        return Err(Ineligibility::NoSection21c);
    }
    if incident.year_start == incident.year_end
        && incident.month_end - incident.month_start < MIN_SAME_YEAR_MONTHS
    {
        return Err(Ineligibility::TooShort);
    }
    Ok(())
}

/// Builds one window per distinct CIK among the eligible incidents.
///
/// The window starts at the earliest start year but ends at the *earliest*
/// end year as well, so merged windows are never wider than their
/// narrowest-ending incident.
pub fn aggregate(incidents: &[FraudIncident]) -> FraudWindows {
    let mut windows = FraudWindows::new();

    for incident in incidents {
        if let Err(reason) = eligibility(incident) {
            match reason {
                Ineligibility::TooShort => tracing::info!(
                    "Skipping {} ({}): {}",
                    incident.company_name,
                    incident.url,
                    reason
                ),
                _ => tracing::debug!(
                    "Skipping {} ({}): {}",
                    incident.company_name,
                    incident.url,
                    reason
                ),
            }
            continue;
        }

        windows
            .entry(incident.cik.clone())
            .and_modify(|window| {
                window.urls.push(incident.url.clone());
                window.start_year = window.start_year.min(incident.year_start);
                window.end_year = window.end_year.min(incident.year_end);
            })
            .or_insert_with(|| FraudWindow {
                cik: incident.cik.clone(),
                company_name: incident.company_name.clone(),
                start_year: incident.year_start,
                end_year: incident.year_end,
                urls: vec![incident.url.clone()],
            });
    }

    tracing::info!(
        "Aggregated {} incidents into {} fraud windows",
        incidents.len(),
        windows.len()
    );
    windows
}
