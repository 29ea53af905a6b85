//! Security code notations and conversion between them.
//!
//! Three notations are in use for A-share codes:
//!
//! | notation                    | Shenzhen      | Shanghai      |
//! |-----------------------------|---------------|---------------|
//! | [`Notation::Internal`]      | `000001.SZ`   | `600000.SH`   |
//! | [`Notation::RiceQuant`]     | `000001.XSHE` | `600000.XSHG` |
//! | [`Notation::GoldMiner`]     | `SZSE.000001` | `SSE.600000`  |
//!
//! The numeric component is carried over verbatim; only the exchange marker
//! and its position change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KkDataError, Result};

/// A security code notation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    /// KakiQuant / Tushare notation, `{number}.{SZ|SH}`. Used by the service.
    #[default]
    Internal,
    /// RiceQuant notation, `{number}.{XSHE|XSHG}`.
    #[serde(rename = "rq")]
    RiceQuant,
    /// GoldMiner notation, `{SZSE|SSE}.{number}`.
    #[serde(rename = "gm")]
    GoldMiner,
}

/// Order in which notations are matched against a code.
///
/// Marker detection is by substring, and `XSHE`/`XSHG` contain `SH` while
/// `SZSE` contains `SZ`, so both external notations must be tried before the
/// Internal one.
pub const DETECTION_ORDER: [Notation; 3] =
    [Notation::RiceQuant, Notation::GoldMiner, Notation::Internal];

impl Notation {
    /// All notations.
    pub const ALL: [Self; 3] = [Self::Internal, Self::RiceQuant, Self::GoldMiner];

    /// Short name of this notation (`internal`, `rq`, `gm`).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::RiceQuant => "rq",
            Self::GoldMiner => "gm",
        }
    }

    /// Exchange markers of this notation, Shenzhen first.
    #[must_use]
    pub const fn markers(&self) -> [&'static str; 2] {
        [
            Exchange::Shenzhen.marker(*self),
            Exchange::Shanghai.marker(*self),
        ]
    }

    /// Whether the marker precedes the number.
    #[must_use]
    pub const fn marker_first(&self) -> bool {
        matches!(self, Self::GoldMiner)
    }

    fn matches(self, code: &str) -> bool {
        self.markers().iter().any(|marker| code.contains(marker))
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Notation {
    type Err = KkDataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "internal" | "kakiquant" | "tushare" => Ok(Self::Internal),
            "rq" | "ricequant" => Ok(Self::RiceQuant),
            "gm" | "goldminer" => Ok(Self::GoldMiner),
            _ => Err(KkDataError::InvalidParameter(format!(
                "Unknown notation: {s}. Supported: internal, rq, gm"
            ))),
        }
    }
}

/// Stock exchange a code is listed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    /// Shenzhen Stock Exchange.
    Shenzhen,
    /// Shanghai Stock Exchange.
    Shanghai,
}

impl Exchange {
    /// Marker for this exchange in the given notation.
    #[must_use]
    pub const fn marker(&self, notation: Notation) -> &'static str {
        match (self, notation) {
            (Self::Shenzhen, Notation::Internal) => "SZ",
            (Self::Shanghai, Notation::Internal) => "SH",
            (Self::Shenzhen, Notation::RiceQuant) => "XSHE",
            (Self::Shanghai, Notation::RiceQuant) => "XSHG",
            (Self::Shenzhen, Notation::GoldMiner) => "SZSE",
            (Self::Shanghai, Notation::GoldMiner) => "SSE",
        }
    }

    /// Looks up the exchange for a marker of the given notation.
    #[must_use]
    pub fn from_marker(notation: Notation, marker: &str) -> Option<Self> {
        [Self::Shenzhen, Self::Shanghai]
            .into_iter()
            .find(|exchange| exchange.marker(notation) == marker)
    }
}

/// Detects the notation of a code from its exchange marker.
///
/// Returns `None` when the code contains no known marker. Detection does not
/// validate the rest of the code; see [`SecurityCode::parse`].
#[must_use]
pub fn detect_notation(code: &str) -> Option<Notation> {
    DETECTION_ORDER
        .into_iter()
        .find(|notation| notation.matches(code))
}

/// A parsed security code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SecurityCode {
    number: String,
    exchange: Exchange,
    notation: Notation,
}

impl SecurityCode {
    /// Parses a code in any of the three notations.
    pub fn parse(code: &str) -> Result<Self> {
        let notation = detect_notation(code)
            .ok_or_else(|| KkDataError::UnknownExchangeMarker(code.to_string()))?;

        let mut parts = code.split('.');
        let (first, second) = match (parts.next(), parts.next(), parts.next()) {
            (Some(first), Some(second), None) if !first.is_empty() && !second.is_empty() => {
                (first, second)
            }
            _ => return Err(KkDataError::MalformedCode(code.to_string())),
        };

        let (number, marker) = if notation.marker_first() {
            (second, first)
        } else {
            (first, second)
        };

        let exchange = Exchange::from_marker(notation, marker)
            .ok_or_else(|| KkDataError::UnknownExchangeMarker(code.to_string()))?;

        Ok(Self {
            number: number.to_string(),
            exchange,
            notation,
        })
    }

    /// The numeric component, verbatim.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// The exchange the code is listed on.
    #[must_use]
    pub const fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// The notation the code was parsed from.
    #[must_use]
    pub const fn notation(&self) -> Notation {
        self.notation
    }

    /// Formats the code in the given notation.
    #[must_use]
    pub fn to_notation(&self, target: Notation) -> String {
        let marker = self.exchange.marker(target);
        if target.marker_first() {
            format!("{marker}.{}", self.number)
        } else {
            format!("{}.{marker}", self.number)
        }
    }
}

impl fmt::Display for SecurityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_notation(self.notation))
    }
}

impl FromStr for SecurityCode {
    type Err = KkDataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Converts a single code to the target notation.
///
/// A code already in the target notation is returned unchanged.
pub fn normalize(code: &str, target: Notation) -> Result<String> {
    let parsed = SecurityCode::parse(code)?;
    if parsed.notation() == target {
        return Ok(code.to_string());
    }
    Ok(parsed.to_notation(target))
}

/// Converts a sequence of codes to the target notation, preserving order.
///
/// Fails on the first invalid code; no partial output is returned.
pub fn normalize_all<I, S>(codes: I, target: Notation) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .map(|code| normalize(code.as_ref(), target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [&str; 6] = [
        "000001.SZ",
        "600000.SH",
        "000001.XSHE",
        "600000.XSHG",
        "SZSE.000001",
        "SSE.600000",
    ];

    #[test]
    fn test_ricequant_to_internal_and_goldminer() {
        assert_eq!(normalize("000001.XSHE", Notation::Internal).unwrap(), "000001.SZ");
        assert_eq!(normalize("000001.XSHE", Notation::GoldMiner).unwrap(), "SZSE.000001");
    }

    #[test]
    fn test_goldminer_to_ricequant() {
        assert_eq!(normalize("SSE.600000", Notation::RiceQuant).unwrap(), "600000.XSHG");
    }

    #[test]
    fn test_internal_to_external() {
        assert_eq!(normalize("600000.SH", Notation::RiceQuant).unwrap(), "600000.XSHG");
        assert_eq!(normalize("000001.SZ", Notation::GoldMiner).unwrap(), "SZSE.000001");
    }

    #[test]
    fn test_identity_when_already_in_target() {
        for code in SAMPLES {
            let notation = detect_notation(code).unwrap();
            assert_eq!(normalize(code, notation).unwrap(), code);
        }
    }

    #[test]
    fn test_round_trip_over_all_notation_pairs() {
        for code in SAMPLES {
            let source = detect_notation(code).unwrap();
            for target in Notation::ALL {
                let converted = normalize(code, target).unwrap();
                assert_eq!(detect_notation(&converted), Some(target));
                assert_eq!(normalize(&converted, source).unwrap(), code);
            }
        }
    }

    #[test]
    fn test_number_is_preserved() {
        for code in ["000001.XSHE", "688981.SH", "SZSE.300750", "SSE.000300"] {
            let number = SecurityCode::parse(code).unwrap().number().to_string();
            for target in Notation::ALL {
                let converted = normalize(code, target).unwrap();
                assert_eq!(SecurityCode::parse(&converted).unwrap().number(), number);
            }
        }
    }

    #[test]
    fn test_detection_priority() {
        assert_eq!(
            DETECTION_ORDER,
            [Notation::RiceQuant, Notation::GoldMiner, Notation::Internal]
        );
        // "XSHE"/"XSHG" contain "SH" and "SZSE" contains "SZ".
        assert_eq!(detect_notation("000001.XSHE"), Some(Notation::RiceQuant));
        assert_eq!(detect_notation("600000.XSHG"), Some(Notation::RiceQuant));
        assert_eq!(detect_notation("SZSE.000001"), Some(Notation::GoldMiner));
        assert_eq!(detect_notation("000001.SZ"), Some(Notation::Internal));
        assert_eq!(detect_notation("AAPL"), None);
    }

    #[test]
    fn test_unknown_marker() {
        assert!(matches!(
            normalize("000001.XSHF", Notation::Internal),
            Err(KkDataError::UnknownExchangeMarker(_))
        ));
        assert!(matches!(
            normalize("AAPL.O", Notation::Internal),
            Err(KkDataError::UnknownExchangeMarker(_))
        ));
        // Marker on the wrong side for GoldMiner.
        assert!(matches!(
            normalize("000001.SZSE", Notation::Internal),
            Err(KkDataError::UnknownExchangeMarker(_))
        ));
    }

    #[test]
    fn test_malformed_code() {
        for code in ["000001SZ", "000001.SZ.SZ", ".SZ", "SSE."] {
            assert!(
                matches!(
                    normalize(code, Notation::RiceQuant),
                    Err(KkDataError::MalformedCode(_))
                ),
                "{code} should be malformed"
            );
        }
    }

    #[test]
    fn test_batch_preserves_order() {
        let codes = ["600000.XSHG", "SZSE.000001", "000002.SZ"];
        assert_eq!(
            normalize_all(codes, Notation::Internal).unwrap(),
            vec!["600000.SH", "000001.SZ", "000002.SZ"]
        );
    }

    #[test]
    fn test_batch_fails_fast() {
        let codes = vec!["600000.XSHG".to_string(), "000001SZ".to_string()];
        assert!(matches!(
            normalize_all(&codes, Notation::Internal),
            Err(KkDataError::MalformedCode(code)) if code == "000001SZ"
        ));
    }

    #[test]
    fn test_notation_from_str() {
        assert_eq!("rq".parse::<Notation>().unwrap(), Notation::RiceQuant);
        assert_eq!("GM".parse::<Notation>().unwrap(), Notation::GoldMiner);
        assert_eq!("internal".parse::<Notation>().unwrap(), Notation::Internal);
        assert!(matches!(
            "bloomberg".parse::<Notation>(),
            Err(KkDataError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_security_code_display_uses_source_notation() {
        let code: SecurityCode = "SSE.600000".parse().unwrap();
        assert_eq!(code.exchange(), Exchange::Shanghai);
        assert_eq!(code.to_string(), "SSE.600000");
    }
}
