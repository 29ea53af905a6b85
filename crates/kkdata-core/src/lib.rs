#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/KAKIQUANT/kkdatac/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the kkdata client.
//!
//! This crate provides the pieces shared by every kkdata crate:
//!
//! - [`codec`] - Wire payload encoding and decoding
//! - [`symbol`] - Security code notations and conversion
//! - [`QueryExecutor`](executor::QueryExecutor) - Query transport abstraction
//! - [`KkDataError`](error::KkDataError) - Error taxonomy

/// Wire payload codec (hex, LZ4 frame, Arrow IPC).
pub mod codec;
/// Error types for kkdata operations.
pub mod error;
/// Query executor trait.
pub mod executor;
/// Security code notations and normalization.
pub mod symbol;
/// Shared request types.
pub mod types;

// Re-export commonly used items at crate root
pub use codec::{decode, encode};
pub use error::{KkDataError, Result};
pub use executor::QueryExecutor;
pub use symbol::{
    DETECTION_ORDER, Exchange, Notation, SecurityCode, detect_notation, normalize, normalize_all,
};
pub use types::OrderBookIds;
