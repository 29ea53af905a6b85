//! Shared request types.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::symbol::{Notation, normalize, normalize_all};

/// One security code or an ordered list of them.
///
/// Conversions keep the shape the caller passed in: a single code stays a
/// single code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderBookIds {
    /// A single code, e.g. `000001.XSHE`.
    Single(String),
    /// An ordered list of codes.
    Many(Vec<String>),
}

impl OrderBookIds {
    /// Converts every code to `target`. Fails without partial output if any
    /// code is invalid.
    pub fn normalize(&self, target: Notation) -> Result<Self> {
        match self {
            Self::Single(code) => normalize(code, target).map(Self::Single),
            Self::Many(codes) => normalize_all(codes, target).map(Self::Many),
        }
    }

    /// Iterates over the codes in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let codes: &[String] = match self {
            Self::Single(code) => std::slice::from_ref(code),
            Self::Many(codes) => codes,
        };
        codes.iter().map(String::as_str)
    }

    /// Number of codes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(codes) => codes.len(),
        }
    }

    /// Returns true if this is an empty list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the ids into a list.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(code) => vec![code],
            Self::Many(codes) => codes,
        }
    }
}

impl From<&str> for OrderBookIds {
    fn from(code: &str) -> Self {
        Self::Single(code.to_string())
    }
}

impl From<String> for OrderBookIds {
    fn from(code: String) -> Self {
        Self::Single(code)
    }
}

impl From<Vec<String>> for OrderBookIds {
    fn from(codes: Vec<String>) -> Self {
        Self::Many(codes)
    }
}

impl From<Vec<&str>> for OrderBookIds {
    fn from(codes: Vec<&str>) -> Self {
        Self::Many(codes.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for OrderBookIds {
    fn from(codes: &[&str]) -> Self {
        Self::Many(codes.iter().map(|c| (*c).to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KkDataError;

    #[test]
    fn test_normalize_keeps_shape() {
        let single = OrderBookIds::from("000001.XSHE");
        assert_eq!(
            single.normalize(Notation::Internal).unwrap(),
            OrderBookIds::Single("000001.SZ".to_string())
        );

        let many = OrderBookIds::from(vec!["000001.XSHE", "SSE.600000"]);
        assert_eq!(
            many.normalize(Notation::Internal).unwrap().into_vec(),
            vec!["000001.SZ", "600000.SH"]
        );
    }

    #[test]
    fn test_normalize_many_fails_fast() {
        let many = OrderBookIds::from(vec!["000001.XSHE", "bogus"]);
        assert!(matches!(
            many.normalize(Notation::Internal),
            Err(KkDataError::UnknownExchangeMarker(_))
        ));
    }

    #[test]
    fn test_iter_and_len() {
        let ids = OrderBookIds::from("600000.SH");
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec!["600000.SH"]);
        assert!(OrderBookIds::Many(Vec::new()).is_empty());
    }

    #[test]
    fn test_untagged_serde() {
        let single: OrderBookIds = serde_json::from_str("\"000001.SZ\"").unwrap();
        assert_eq!(single, OrderBookIds::from("000001.SZ"));
        let many: OrderBookIds = serde_json::from_str("[\"000001.SZ\",\"600000.SH\"]").unwrap();
        assert_eq!(many.len(), 2);
    }
}
