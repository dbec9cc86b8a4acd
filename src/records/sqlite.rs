// src/records/sqlite.rs
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection};

use crate::records::models::{FraudIncident, IncidentPage, UpdateOutcome};
use crate::records::RecordStore;
use crate::utils::error::StoreError;

pub const DEFAULT_PAGE_SIZE: usize = 100;

// Table names are interpolated into SQL, so only plain identifiers are accepted.
static TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Failed to compile TABLE_NAME_RE")
});

const SELECT_COLUMNS: &str =
    "rowid, cik, company_name, year_start, month_start, year_end, month_end, url, contains_21c, scraped";

/// Fraud incident table in a SQLite database, keyed by `(company_name, url)`.
pub struct SqliteRecordStore {
    conn: Connection,
    table: String,
    page_size: usize,
}

impl SqliteRecordStore {
    /// Opens (or creates) the database at `path` and ensures `table` exists.
    pub fn open<P: AsRef<Path>>(path: P, table: &str, page_size: usize) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Opened record store at {}", path.display());
        Self::with_connection(conn, table, page_size)
    }

    pub fn open_in_memory(table: &str, page_size: usize) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::with_connection(conn, table, page_size)
    }

    fn with_connection(conn: Connection, table: &str, page_size: usize) -> Result<Self, StoreError> {
        if !TABLE_NAME_RE.is_match(table) {
            return Err(StoreError::InvalidTableName(table.to_string()));
        }

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                company_name TEXT NOT NULL,
                url          TEXT NOT NULL,
                cik          TEXT NOT NULL,
                year_start   INTEGER NOT NULL,
                month_start  INTEGER NOT NULL,
                year_end     INTEGER NOT NULL,
                month_end    INTEGER NOT NULL,
                contains_21c INTEGER NOT NULL DEFAULT 0,
                scraped      INTEGER,
                PRIMARY KEY (company_name, url)
            );"
        ))?;

        Ok(Self {
            conn,
            table: table.to_string(),
            page_size: page_size.max(1),
        })
    }

    /// Upserts incidents keyed by `(company_name, url)`.
    ///
    /// An existing row keeps its `scraped` flag; only the descriptive columns
    /// are refreshed. Returns the number of rows written.
    pub fn import(&self, incidents: &[FraudIncident]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (company_name, url, cik, year_start, month_start, year_end, month_end, contains_21c, scraped)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT (company_name, url) DO UPDATE SET
                    cik = excluded.cik,
                    year_start = excluded.year_start,
                    month_start = excluded.month_start,
                    year_end = excluded.year_end,
                    month_end = excluded.month_end,
                    contains_21c = excluded.contains_21c",
                self.table
            ))?;

            for incident in incidents {
                written += stmt.execute(params![
                    incident.company_name,
                    incident.url,
                    incident.cik,
                    incident.year_start,
                    incident.month_start,
                    incident.year_end,
                    incident.month_end,
                    incident.contains_21c,
                    incident.scraped.then_some(true),
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!("Imported {} incidents into {}", written, self.table);
        Ok(written)
    }
}

impl RecordStore for SqliteRecordStore {
    async fn scan_page(&self, start_key: Option<&str>) -> Result<IncidentPage, StoreError> {
        let after: i64 = match start_key {
            None => 0,
            Some(key) => key
                .parse()
                .map_err(|_| StoreError::BadContinuationToken(key.to_string()))?,
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} WHERE rowid > ?1 ORDER BY rowid LIMIT ?2",
            SELECT_COLUMNS, self.table
        ))?;
        let rows = stmt
            .query_map(params![after, self.page_size as i64], |row| {
                let rowid: i64 = row.get(0)?;
                let scraped: Option<bool> = row.get(9)?;
                Ok((
                    rowid,
                    FraudIncident {
                        cik: row.get(1)?,
                        company_name: row.get(2)?,
                        year_start: row.get(3)?,
                        month_start: row.get(4)?,
                        year_end: row.get(5)?,
                        month_end: row.get(6)?,
                        url: row.get(7)?,
                        contains_21c: row.get(8)?,
                        scraped: scraped.unwrap_or(false),
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        // A short page means the scan reached the end of the table.
        let last_evaluated_key = if rows.len() == self.page_size {
            rows.last().map(|(rowid, _)| rowid.to_string())
        } else {
            None
        };

        Ok(IncidentPage {
            items: rows.into_iter().map(|(_, incident)| incident).collect(),
            last_evaluated_key,
        })
    }

    async fn set_scraped(&self, company_name: &str, url: &str) -> Result<UpdateOutcome, StoreError> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET scraped = 1 WHERE company_name = ?1 AND url = ?2",
                self.table
            ),
            params![company_name, url],
        )?;

        Ok(if changed == 0 {
            UpdateOutcome::Missing
        } else {
            UpdateOutcome::Updated
        })
    }
}
