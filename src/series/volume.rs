//! Abbreviated-magnitude volume codec
//!
//! TUFLOW prints large volumes as a digit run followed by `'` markers, each
//! marker standing for another factor of 1000: `123''` is 123,000,000.
//! Encoding keeps at most six digits, so it truncates.

use crate::errors::{ReviewError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Magnitude marker character
pub const MAGNITUDE_MARKER: char = '\'';

/// Longest digit run emitted by the encoder
pub const MAX_DIGITS: usize = 6;

/// A volume in abbreviated-magnitude form
///
/// `mantissa * 1000^magnitude` is the (possibly truncated) raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeValue {
    mantissa: u64,
    magnitude: u32,
}

impl VolumeValue {
    /// Encode a raw volume, truncating to at most six digits
    pub fn encode(raw: u64) -> Self {
        let mut magnitude = 0u32;
        let mut mantissa = raw;
        while digit_count(mantissa) > MAX_DIGITS {
            magnitude += 1;
            mantissa = raw / 1000u64.pow(magnitude);
        }
        Self {
            mantissa,
            magnitude,
        }
    }

    /// Parse the text form (`digits` then zero or more markers)
    pub fn parse(text: &str) -> Result<Self> {
        let digits_end = text.find(MAGNITUDE_MARKER).unwrap_or(text.len());
        let (digits, markers) = text.split_at(digits_end);

        if digits.is_empty() {
            return Err(ReviewError::format(text, "missing digits before magnitude markers"));
        }
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(ReviewError::format(text, format!("unexpected character '{}'", bad)));
        }
        if markers.chars().any(|c| c != MAGNITUDE_MARKER) {
            return Err(ReviewError::format(text, "magnitude markers must be trailing"));
        }

        let mantissa: u64 = digits
            .parse()
            .map_err(|_| ReviewError::format(text, "digit run does not fit in 64 bits"))?;
        let magnitude = markers.len() as u32;

        let value = Self {
            mantissa,
            magnitude,
        };
        value.checked_raw().ok_or_else(|| ReviewError::format(text, "value overflows 64 bits"))?;
        Ok(value)
    }

    /// Decode the text form straight to a raw integer
    pub fn decode(text: &str) -> Result<u64> {
        Self::parse(text).map(|v| v.raw())
    }

    /// Raw integer value (digits times 1000 per marker)
    pub fn raw(&self) -> u64 {
        // parse and encode only build values that fit
        self.checked_raw().unwrap_or(u64::MAX)
    }

    fn checked_raw(&self) -> Option<u64> {
        1000u64
            .checked_pow(self.magnitude)
            .and_then(|scale| self.mantissa.checked_mul(scale))
    }

    /// Digit run without markers
    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    /// Number of trailing markers
    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }
}

impl fmt::Display for VolumeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mantissa)?;
        for _ in 0..self.magnitude {
            write!(f, "{}", MAGNITUDE_MARKER)?;
        }
        Ok(())
    }
}

impl FromStr for VolumeValue {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn digit_count(n: u64) -> usize {
    if n == 0 {
        1
    } else {
        (n.ilog10() + 1) as usize
    }
}
