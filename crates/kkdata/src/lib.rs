#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/KAKIQUANT/kkdatac/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Client library for the kkdata financial data service.
//!
//! This crate re-exports the wire codec, symbol normalizer and error types
//! from `kkdata-core` and the HTTP client from `kkdata-client`, and adds the
//! [`sql`] one-shot helper and [`run_queries`] for concurrent batches.
//!
//! # Example
//!
//! ```rust,ignore
//! use kkdata::{normalize, Notation};
//!
//! #[tokio::main]
//! async fn main() -> kkdata::Result<()> {
//!     let tables = kkdata::sql("show tables", Some("your_api_key"), None).await?;
//!     println!("{tables}");
//!
//!     assert_eq!(normalize("000001.XSHE", Notation::Internal)?, "000001.SZ");
//!     Ok(())
//! }
//! ```

use polars::prelude::DataFrame;
use tracing::debug;

// Codec, symbols and errors
pub use kkdata_core::*;

// Transport
pub use kkdata_client::{
    API_KEY_ENV, AccessMode, ClientConfig, DEFAULT_ENDPOINT, ENDPOINT_ENV, FactorCategory,
    FactorDataRequest, FactorExposureRequest, FactorResponse, FactorReturnMethod,
    FactorReturnRequest, KkDataClient, NewFactor, templates,
};

mod batch;
pub use batch::run_queries;

/// Run a single query with a throwaway client.
///
/// Settings start from `KKDATA_ENDPOINT` and `KKDATA_API_KEY`; an explicit
/// `api_key` or `base_url` overrides the matching variable. With no API key
/// anywhere the free endpoint is used.
pub async fn sql(query: &str, api_key: Option<&str>, base_url: Option<&str>) -> Result<DataFrame> {
    let mut config = ClientConfig::from_env();
    if let Some(base_url) = base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(api_key) = api_key {
        config = config.with_api_key(api_key);
    }
    debug!(base_url = config.base_url(), "One-shot kkdata query");

    KkDataClient::new(config).run_query(query).await
}
