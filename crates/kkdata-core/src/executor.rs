//! Query executor trait.
//!
//! [`QueryExecutor`] is the seam between code that needs tables and the
//! transport that fetches them. The HTTP client implements it; batch helpers
//! and tests are written against the trait.

use async_trait::async_trait;
use polars::prelude::DataFrame;
use std::fmt::Debug;

use crate::error::Result;

/// Runs opaque query strings against the remote service.
///
/// The query text is sent verbatim; implementations do not parse it.
#[async_trait]
pub trait QueryExecutor: Send + Sync + Debug {
    /// Runs a single query and returns the result table.
    ///
    /// Each call performs exactly one round trip and carries no state into
    /// the next call.
    async fn run_query(&self, query: &str) -> Result<DataFrame>;
}

#[async_trait]
impl<T: QueryExecutor + ?Sized> QueryExecutor for std::sync::Arc<T> {
    async fn run_query(&self, query: &str) -> Result<DataFrame> {
        (**self).run_query(query).await
    }
}
