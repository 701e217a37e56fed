use crate::error::Result;
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

/// Number of records requested per page.
pub const PAGE_SIZE: u32 = 100;

/// One page of a list endpoint.
///
/// The remote API names the list field after the entity (`listProject`,
/// `listAccount`, `listOrganisation`); all of them land in `items`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    #[serde(
        rename = "list",
        alias = "listProject",
        alias = "listAccount",
        alias = "listOrganisation",
        default = "Vec::new"
    )]
    pub items: Vec<T>,
    #[serde(rename = "totalLineCount", default)]
    pub total_line_count: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_line_count: u64) -> Self {
        Self {
            items,
            total_line_count,
        }
    }
}

/// Drains a paginated endpoint.
///
/// `fetch` is called with `(offset, limit)`. Aggregation stops when a page
/// comes back empty or when `offset + limit >= totalLineCount`, whichever
/// happens first. The first error aborts the whole fetch.
pub async fn fetch_all_pages<T, F, Fut>(limit: u32, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u64, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut all = Vec::new();
    let mut offset: u64 = 0;
    loop {
        let page = fetch(offset, limit).await?;
        let received = page.items.len();
        all.extend(page.items);
        debug!(offset, received, total = page.total_line_count, "Fetched page");
        if received == 0 || offset + u64::from(limit) >= page.total_line_count {
            break;
        }
        offset += u64::from(limit);
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;
    use std::sync::{Arc, Mutex};

    /// Serves `total_items` numbered records, but reports `reported_total`.
    fn server(
        total_items: u64,
        reported_total: u64,
        calls: Arc<Mutex<Vec<(u64, u32)>>>,
    ) -> impl FnMut(u64, u32) -> std::future::Ready<Result<Page<u64>>> {
        move |offset, limit| {
            calls.lock().unwrap().push((offset, limit));
            let end = (offset + u64::from(limit)).min(total_items);
            let items = (offset.min(end)..end).collect();
            std::future::ready(Ok(Page::new(items, reported_total)))
        }
    }

    #[tokio::test]
    async fn test_exact_multiple_of_page_size() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let all = fetch_all_pages(100, server(200, 200, calls.clone()))
            .await
            .unwrap();

        assert_eq!(all.len(), 200);
        assert_eq!(*calls.lock().unwrap(), vec![(0, 100), (100, 100)]);
    }

    #[tokio::test]
    async fn test_last_partial_page_is_fetched() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let all = fetch_all_pages(100, server(250, 250, calls.clone()))
            .await
            .unwrap();

        assert_eq!(all, (0..250).collect::<Vec<_>>());
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_under_reported_total_stops_early() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let all = fetch_all_pages(100, server(500, 150, calls.clone()))
            .await
            .unwrap();

        assert_eq!(all.len(), 200);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_over_reported_total_stops_on_empty_page() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let all = fetch_all_pages(100, server(120, 10_000, calls.clone()))
            .await
            .unwrap();

        assert_eq!(all.len(), 120);
        // 0..100, 100..120, then an empty page ends it.
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_endpoint_single_call() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let all = fetch_all_pages(100, server(0, 0, calls.clone()))
            .await
            .unwrap();

        assert!(all.is_empty());
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_error_aborts_fetch() {
        let mut n = 0;
        let result: Result<Vec<u64>> = fetch_all_pages(2, |offset, _| {
            n += 1;
            let page = if offset == 0 {
                Ok(Page::new(vec![1, 2], 10))
            } else {
                Err(BotError::Remote {
                    status: 500,
                    body: "boom".into(),
                })
            };
            std::future::ready(page)
        })
        .await;

        assert!(matches!(result, Err(BotError::Remote { status: 500, .. })));
        assert_eq!(n, 2);
    }

    #[test]
    fn test_page_deserializes_entity_specific_list_names() {
        let page: Page<serde_json::Value> =
            serde_json::from_str(r#"{"listAccount":[{"id":1}],"totalLineCount":1}"#).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_line_count, 1);

        let page: Page<serde_json::Value> = serde_json::from_str(r#"{}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_line_count, 0);
    }

    #[test]
    fn test_project_page_tolerates_null_names() {
        let json = r#"{"listProject":[{"id":1,"projectName":"Retail"},{"id":2,"projectName":null}],"totalLineCount":2}"#;
        let page: Page<crate::domain::catalog::Project> = serde_json::from_str(json).unwrap();
        let names: Vec<String> = page.items.iter().map(|p| p.display_name()).collect();
        assert_eq!(names, vec!["Retail", "Project 2"]);
    }
}
