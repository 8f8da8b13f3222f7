//! Box value: the amount of nanoERG a box holds.
//!
//! A [`BoxValue`] is always within `MIN_BOX_VALUE..=MAX_BOX_VALUE`. There is
//! no way to construct one outside that range, so every arithmetic helper
//! returns a `Result` rather than wrapping or saturating.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{MAX_BOX_VALUE, MIN_BOX_VALUE, SAFE_USER_MIN, SUGGESTED_TX_FEE};

/// Errors produced by box value construction and arithmetic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoxValueError {
    /// The value is zero, negative, or above the protocol ceiling.
    #[error("invalid box value {value}: must be positive and at most i64::MAX")]
    InvalidValue { value: i128 },

    /// Summation exceeded the representable range.
    #[error("box value overflow while adding {lhs} and {rhs}")]
    Overflow { lhs: u64, rhs: u64 },
}

/// Box value in nanoERG, bounded by the protocol limits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BoxValue(u64);

impl BoxValue {
    /// Smallest valid value.
    pub const MIN: BoxValue = BoxValue(MIN_BOX_VALUE);

    /// Largest valid value.
    pub const MAX: BoxValue = BoxValue(MAX_BOX_VALUE);

    /// Recommended minimal value for user-created boxes.
    pub const SAFE_USER_MIN: BoxValue = BoxValue(SAFE_USER_MIN);

    /// Creates a box value, rejecting anything outside the protocol range.
    pub fn new(value: u64) -> Result<Self, BoxValueError> {
        if !(MIN_BOX_VALUE..=MAX_BOX_VALUE).contains(&value) {
            return Err(BoxValueError::InvalidValue {
                value: value as i128,
            });
        }
        Ok(Self(value))
    }

    /// Creates a box value from a signed amount (the wire representation).
    pub fn from_i64(value: i64) -> Result<Self, BoxValueError> {
        if value < 0 {
            return Err(BoxValueError::InvalidValue {
                value: value as i128,
            });
        }
        Self::new(value as u64)
    }

    /// Suggested miner fee.
    pub fn suggested_tx_fee() -> Self {
        Self(SUGGESTED_TX_FEE)
    }

    /// Raw nanoERG amount.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Signed representation; always fits because of the ceiling.
    pub fn as_i64(&self) -> i64 {
        self.0 as i64
    }

    /// Adds two values, failing with `Overflow` past the ceiling.
    pub fn checked_add(self, other: Self) -> Result<Self, BoxValueError> {
        let overflow = BoxValueError::Overflow {
            lhs: self.0,
            rhs: other.0,
        };
        let sum = self.0.checked_add(other.0).ok_or_else(|| overflow.clone())?;
        if sum > MAX_BOX_VALUE {
            return Err(overflow);
        }
        Ok(Self(sum))
    }

    /// Subtracts `other`, failing with `InvalidValue` if the result is not a
    /// valid box value (zero or negative).
    pub fn checked_sub(self, other: Self) -> Result<Self, BoxValueError> {
        Self::new(self.0.saturating_sub(other.0)).map_err(|_| BoxValueError::InvalidValue {
            value: self.0 as i128 - other.0 as i128,
        })
    }

    /// Sums an iterator of values, failing on overflow.
    ///
    /// Returns the raw `u64` so that an empty iterator (sum `0`) is
    /// representable.
    pub fn sum_of<I>(values: I) -> Result<u64, BoxValueError>
    where
        I: IntoIterator<Item = BoxValue>,
    {
        values.into_iter().try_fold(0u64, |acc, v| {
            acc.checked_add(v.0)
                .filter(|sum| *sum <= MAX_BOX_VALUE)
                .ok_or(BoxValueError::Overflow { lhs: acc, rhs: v.0 })
        })
    }
}

impl TryFrom<u64> for BoxValue {
    type Error = BoxValueError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BoxValue> for u64 {
    fn from(v: BoxValue) -> Self {
        v.0
    }
}

impl<'de> Deserialize<'de> for BoxValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for BoxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BoxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxValue({})", self.0)
    }
}
