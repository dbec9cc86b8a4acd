// src/records/mod.rs
//! Access to the fraud incident table: full paginated scans and the
//! `scraped` status flag.

pub mod models;
pub mod sqlite;

use std::future::Future;

use futures::{Stream, TryStreamExt};

use crate::utils::error::StoreError;
pub use models::{FraudIncident, IncidentPage, UpdateOutcome};
pub use sqlite::SqliteRecordStore;

/// Backend holding the fraud incident records.
///
/// Scans are paged: each call returns at most one bounded page together with
/// the continuation token for the following call.
pub trait RecordStore {
    /// Fetch the page starting after `start_key` (`None` for the first page).
    fn scan_page(
        &self,
        start_key: Option<&str>,
    ) -> impl Future<Output = Result<IncidentPage, StoreError>>;

    /// Set `scraped = true` on the incident keyed by `(company_name, url)`.
    fn set_scraped(
        &self,
        company_name: &str,
        url: &str,
    ) -> impl Future<Output = Result<UpdateOutcome, StoreError>>;
}

enum Cursor {
    Start,
    After(String),
    Done,
}

/// Lazily walks the whole table, one store call per yielded page.
///
/// The stream ends after the first page that comes back without a
/// continuation token.
pub fn pages<S: RecordStore>(
    store: &S,
) -> impl Stream<Item = Result<Vec<FraudIncident>, StoreError>> + '_ {
    futures::stream::try_unfold(Cursor::Start, move |cursor| next_page(store, cursor))
}

async fn next_page<S: RecordStore>(
    store: &S,
    cursor: Cursor,
) -> Result<Option<(Vec<FraudIncident>, Cursor)>, StoreError> {
    let start_key = match cursor {
        Cursor::Done => return Ok(None),
        Cursor::Start => None,
        Cursor::After(key) => Some(key),
    };

    let page = store.scan_page(start_key.as_deref()).await?;
    let next = match page.last_evaluated_key {
        Some(key) => Cursor::After(key),
        None => Cursor::Done,
    };
    Ok(Some((page.items, next)))
}

/// Reads every incident, concatenating pages in the order received.
pub async fn fetch_all<S: RecordStore>(store: &S) -> Result<Vec<FraudIncident>, StoreError> {
    let mut pages = std::pin::pin!(pages(store));
    let mut items = Vec::new();
    let mut page_count = 0usize;

    while let Some(page) = pages.try_next().await? {
        page_count += 1;
        tracing::debug!("Fetched page {} with {} incidents", page_count, page.len());
        items.extend(page);
    }

    tracing::info!("Read {} incidents across {} pages", items.len(), page_count);
    Ok(items)
}

/// Marks every `(company_name, url)` incident as scraped.
///
/// Updates are applied one at a time and are not atomic; a failed update is
/// logged and the remaining URLs are still attempted. Returns the outcome of
/// the last update, or `None` when `urls` is empty.
pub async fn mark_scraped<S: RecordStore>(
    store: &S,
    company_name: &str,
    urls: &[String],
) -> Option<Result<UpdateOutcome, StoreError>> {
    let mut last = None;

    for url in urls {
        let outcome = store.set_scraped(company_name, url).await;
        match &outcome {
            Ok(UpdateOutcome::Updated) => {
                tracing::debug!("Marked {} / {} as scraped", company_name, url);
            }
            Ok(UpdateOutcome::Missing) => {
                tracing::warn!("No incident stored for {} / {}", company_name, url);
            }
            Err(e) => {
                tracing::error!("Failed to mark {} / {} as scraped: {}", company_name, url, e);
            }
        }
        last = Some(outcome);
    }

    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{incident, PagedStore};

    #[test]
    fn fetch_all_concatenates_three_pages_in_order() {
        let store = PagedStore::new(
            vec![
                incident("1", "Acme", "u1"),
                incident("2", "Bolt", "u2"),
                incident("3", "Core", "u3"),
                incident("4", "Dyne", "u4"),
                incident("5", "Echo", "u5"),
            ],
            2,
        );

        let all = tokio_test::block_on(fetch_all(&store)).unwrap();

        let urls: Vec<_> = all.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, ["u1", "u2", "u3", "u4", "u5"]);
        assert_eq!(store.scan_calls(), 3);
    }

    #[test]
    fn fetch_all_of_empty_store_makes_one_call() {
        let store = PagedStore::new(Vec::new(), 10);
        let all = tokio_test::block_on(fetch_all(&store)).unwrap();
        assert!(all.is_empty());
        assert_eq!(store.scan_calls(), 1);
    }

    #[test]
    fn pages_are_pulled_lazily() {
        let store = PagedStore::new(
            vec![incident("1", "Acme", "u1"), incident("2", "Bolt", "u2")],
            1,
        );

        let first = tokio_test::block_on(async {
            let mut stream = std::pin::pin!(pages(&store));
            stream.try_next().await
        })
        .unwrap();

        assert_eq!(first.unwrap().len(), 1);
        assert_eq!(store.scan_calls(), 1);
    }

    #[tokio::test]
    async fn fetch_all_surfaces_unavailable_store() {
        let store = PagedStore::new(vec![incident("1", "Acme", "u1")], 1).failing_scans();
        let err = fetch_all(&store).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn mark_scraped_continues_past_failures_and_reports_last() {
        let store = PagedStore::new(
            vec![incident("1", "Acme", "u1"), incident("1", "Acme", "u3")],
            10,
        )
        .failing_update_for("u2");

        let urls = vec!["u1".to_string(), "u2".to_string(), "u3".to_string()];
        let last = mark_scraped(&store, "Acme", &urls).await;

        assert!(matches!(last, Some(Ok(UpdateOutcome::Updated))));
        assert!(store.is_scraped("Acme", "u1"));
        assert!(store.is_scraped("Acme", "u3"));
    }

    #[tokio::test]
    async fn mark_scraped_reports_missing_key() {
        let store = PagedStore::new(vec![incident("1", "Acme", "u1")], 10);
        let last = mark_scraped(&store, "Acme", &["nope".to_string()]).await;
        assert!(matches!(last, Some(Ok(UpdateOutcome::Missing))));
    }

    #[tokio::test]
    async fn mark_scraped_with_no_urls_reports_nothing() {
        let store = PagedStore::new(Vec::new(), 10);
        assert!(mark_scraped(&store, "Acme", &[]).await.is_none());
    }
}
