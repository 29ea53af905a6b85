//! Error types for kkdata operations.
//!
//! This module defines [`KkDataError`] which covers every failure the wire codec,
//! the symbol normalizer and the transport client can surface to a caller.

use thiserror::Error;

/// Errors that can occur while querying the service or converting its data.
#[derive(Error, Debug)]
pub enum KkDataError {
    /// The wire payload is not valid hex (odd length or a non-hex character).
    #[error("Decode error: {0}")]
    Decode(#[from] hex::FromHexError),

    /// The LZ4 frame is corrupt, truncated or empty.
    #[error("Decompress error: {0}")]
    Decompress(String),

    /// The decompressed bytes are not a serialized table.
    #[error("Deserialize error: {0}")]
    Deserialize(String),

    /// A table could not be serialized into a wire payload.
    #[error("Serialize error: {0}")]
    Serialize(String),

    /// The service answered with a status other than 200.
    #[error("Remote error: HTTP {status} - {body}")]
    Remote {
        /// HTTP status code returned by the service.
        status: u16,
        /// Raw response body, verbatim.
        body: String,
    },

    /// The request could not be sent or its response could not be read.
    #[error("Network error: {0}")]
    Network(String),

    /// A JSON response did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The security code carries no known exchange marker.
    #[error("Unknown exchange marker in code: {0}")]
    UnknownExchangeMarker(String),

    /// The security code does not split into a number and a marker.
    #[error("Malformed security code: {0}")]
    MalformedCode(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl KkDataError {
    /// Returns true for failures of the wire payload pipeline
    /// (hex, decompression or deserialization).
    #[must_use]
    pub const fn is_payload_error(&self) -> bool {
        matches!(
            self,
            Self::Decode(_) | Self::Decompress(_) | Self::Deserialize(_)
        )
    }

    /// Returns the HTTP status for [`KkDataError::Remote`] errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias using [`KkDataError`].
pub type Result<T> = std::result::Result<T, KkDataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display_keeps_body() {
        let err = KkDataError::Remote {
            status: 401,
            body: "{\"detail\":\"Invalid API key\"}".to_string(),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.to_string(),
            "Remote error: HTTP 401 - {\"detail\":\"Invalid API key\"}"
        );
    }

    #[test]
    fn test_payload_error_classification() {
        assert!(KkDataError::Decompress("truncated".into()).is_payload_error());
        assert!(KkDataError::Deserialize("bad".into()).is_payload_error());
        assert!(!KkDataError::MalformedCode("x".into()).is_payload_error());
        assert_eq!(KkDataError::Parse("x".into()).status(), None);
    }
}
