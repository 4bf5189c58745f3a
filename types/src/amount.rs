//! Decimal amounts stored as strings.
//!
//! Approved amounts and taxes are persisted as text and compared with string
//! equality. The unapproved-withdrawal filter matches `approvedTax = "0"`
//! exactly, so every zero must be written in its canonical form.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::TypesError;

/// Optional sign, digits, optional fraction. No exponent, no size limit.
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)([0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").expect("valid decimal grammar")
});

/// A non-negative decimal value kept in its textual form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecimalAmount(String);

impl DecimalAmount {
    /// Canonical text of the zero amount.
    pub const ZERO_STR: &'static str = "0";

    pub fn zero() -> Self {
        Self(Self::ZERO_STR.to_string())
    }

    /// Validate and canonicalise a caller-supplied amount.
    ///
    /// The text is checked against the decimal grammar and never converted,
    /// so precision and magnitude are unbounded. Any representation of zero
    /// becomes `"0"`. Other values keep their trimmed text, minus a leading `+`.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let invalid = |reason: &str| TypesError::InvalidAmount {
            value: raw.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = raw.trim();
        let captures = DECIMAL
            .captures(trimmed)
            .ok_or_else(|| invalid("not a decimal number"))?;
        let sign = captures.get(1).map_or("", |m| m.as_str());
        let digits = captures.get(2).map_or("", |m| m.as_str());

        if digits.bytes().all(|b| b == b'0' || b == b'.') {
            return Ok(Self::zero());
        }
        if sign == "-" {
            return Err(invalid("amount must not be negative"));
        }
        Ok(Self(digits.to_string()))
    }

    /// Wrap a value read back from storage without re-validating it.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// String-equality zero check, matching the storage-level filter.
    pub fn is_zero(&self) -> bool {
        self.0 == Self::ZERO_STR
    }
}

impl Default for DecimalAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for DecimalAmount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
