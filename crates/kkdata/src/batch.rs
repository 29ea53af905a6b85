//! Concurrent fan-out over many queries.

use futures::future::join_all;
use polars::prelude::DataFrame;
use tracing::{debug, warn};

use kkdata_core::{QueryExecutor, Result};

/// Run many queries concurrently and collect one result per query.
///
/// Results are returned in input order. Every query is independent: a failure
/// is reported in its own slot and never cancels or affects the others.
pub async fn run_queries<E, I, S>(executor: &E, queries: I) -> Vec<Result<DataFrame>>
where
    E: QueryExecutor + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let queries: Vec<S> = queries.into_iter().collect();
    debug!(query_count = queries.len(), "Running query batch");

    let results = join_all(queries.iter().map(|q| executor.run_query(q.as_ref()))).await;

    for (query, result) in queries.iter().zip(&results) {
        if let Err(e) = result {
            warn!(query = query.as_ref(), error = %e, "Query in batch failed");
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kkdata_core::KkDataError;
    use polars::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers `DESCRIBE TABLE x` with a one-row table and fails for `x = missing`.
    #[derive(Debug, Default)]
    struct FakeExecutor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QueryExecutor for FakeExecutor {
        async fn run_query(&self, query: &str) -> Result<DataFrame> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let table = query.trim_start_matches("DESCRIBE TABLE ");
            if table == "missing" {
                return Err(KkDataError::Remote {
                    status: 404,
                    body: "Table not found".to_string(),
                });
            }
            DataFrame::new(vec![Column::new("table".into(), vec![table])])
                .map_err(|e| KkDataError::Deserialize(e.to_string()))
        }
    }

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let executor = FakeExecutor::default();
        let queries = ["DESCRIBE TABLE daily", "DESCRIBE TABLE income"];
        let results = run_queries(&executor, queries).await;

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        let second = results[1].as_ref().unwrap();
        assert_eq!(first.column("table").unwrap().str().unwrap().get(0), Some("daily"));
        assert_eq!(second.column("table").unwrap().str().unwrap().get(0), Some("income"));
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_siblings() {
        let executor = Arc::new(FakeExecutor::default());
        let queries = vec![
            "DESCRIBE TABLE daily".to_string(),
            "DESCRIBE TABLE missing".to_string(),
            "DESCRIBE TABLE balancesheet".to_string(),
        ];
        let results = run_queries(&executor, &queries).await;

        assert_eq!(executor.calls.load(Ordering::SeqCst), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(KkDataError::Remote { status: 404, .. })
        ));
        assert!(results[2].is_ok());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let executor = FakeExecutor::default();
        let results = run_queries(&executor, Vec::<String>::new()).await;
        assert!(results.is_empty());
    }
}
