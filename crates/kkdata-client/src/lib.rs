#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/KAKIQUANT/kkdatac/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! HTTP client for the kkdata service.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kkdata_client::{ClientConfig, KkDataClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KkDataClient::new(
//!         ClientConfig::new("https://kkdata.example.com").with_api_key("your_api_key"),
//!     );
//!
//!     let tables = client.run_query("show tables").await?;
//!     println!("{tables}");
//!
//!     Ok(())
//! }
//! ```

/// Transport client and access modes.
pub mod client;
/// Client configuration.
pub mod config;
/// Factor catalog operations.
pub mod factors;
/// SQL builders for common queries.
pub mod templates;

pub use client::{AccessMode, KkDataClient};
pub use config::{API_KEY_ENV, ClientConfig, DEFAULT_ENDPOINT, ENDPOINT_ENV};
pub use factors::{
    FactorCategory, FactorDataRequest, FactorExposureRequest, FactorResponse, FactorReturnMethod,
    FactorReturnRequest, NewFactor,
};
