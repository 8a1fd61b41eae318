//! Slack message timestamps.
//!
//! Slack identifies messages by a decimal string such as
//! `"1700000000.123456"`. Comparisons here are done on the integer parts of
//! that string so two timestamps that print the same always compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nh_core::error::NhError;

const MICROS_DIGITS: usize = 6;

/// Largest seconds value whose centisecond form still fits in a `u64`.
const MAX_SECS: u64 = (u64::MAX - 99) / 100;

/// A parsed Slack `ts` value. Keeps the original text for round-tripping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlackTs {
    raw: String,
    secs: u64,
    micros: u32,
}

impl SlackTs {
    /// Parse a timestamp. A leading apostrophe (text-forced spreadsheet
    /// cell) and surrounding whitespace are ignored.
    pub fn parse(input: &str) -> Result<Self, NhError> {
        let raw = input.trim();
        let raw = raw.strip_prefix('\'').unwrap_or(raw).trim();

        let invalid = || NhError::InvalidInput(format!("invalid slack timestamp: {input:?}"));

        let (int_part, frac_part) = match raw.split_once('.') {
            Some((i, f)) => (i, f),
            None => (raw, ""),
        };
        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let secs: u64 = int_part.parse().map_err(|_| invalid())?;
        if secs > MAX_SECS {
            return Err(invalid());
        }
        let mut digits: String = frac_part.chars().take(MICROS_DIGITS).collect();
        while digits.len() < MICROS_DIGITS {
            digits.push('0');
        }
        let micros: u32 = digits.parse().map_err(|_| invalid())?;

        Ok(Self {
            raw: raw.to_string(),
            secs,
            micros,
        })
    }

    /// The timestamp text as it was given (minus any leading apostrophe).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn secs(&self) -> u64 {
        self.secs
    }

    /// Floor of `ts * 100`, the precision at which two timestamps count as
    /// the same message.
    pub fn truncated_centis(&self) -> u64 {
        self.secs * 100 + u64::from(self.micros / 10_000)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.secs as f64 + f64::from(self.micros) / 1_000_000.0
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.secs).ok()?;
        DateTime::from_timestamp(secs, self.micros * 1_000)
    }

    /// Whether this is the "nothing ingested yet" value.
    pub fn is_zero(&self) -> bool {
        self.secs == 0 && self.micros == 0
    }
}

impl FromStr for SlackTs {
    type Err = NhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SlackTs {
    type Error = NhError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SlackTs> for String {
    fn from(ts: SlackTs) -> Self {
        ts.raw
    }
}

impl fmt::Display for SlackTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for SlackTs {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SlackTs {}

impl PartialOrd for SlackTs {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SlackTs {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.secs, self.micros).cmp(&(other.secs, other.micros))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard() {
        let ts = SlackTs::parse("1700000000.123456").unwrap();
        assert_eq!(ts.secs(), 1_700_000_000);
        assert_eq!(ts.truncated_centis(), 170_000_000_012);
        assert_eq!(ts.as_str(), "1700000000.123456");
    }

    #[test]
    fn test_parse_strips_apostrophe() {
        let ts = SlackTs::parse("'1700000000.000100").unwrap();
        assert_eq!(ts.as_str(), "1700000000.000100");
        assert_eq!(ts.to_string(), "1700000000.000100");
    }

    #[test]
    fn test_parse_short_fraction_and_integer() {
        assert_eq!(SlackTs::parse("12.5").unwrap().truncated_centis(), 1250);
        assert_eq!(SlackTs::parse("0").unwrap().truncated_centis(), 0);
        assert!(SlackTs::parse("0").unwrap().is_zero());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "abc", "1.2.3", "-5.0", ".5", "1e9", "12.x"] {
            assert!(SlackTs::parse(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range_seconds() {
        assert!(SlackTs::parse("999999999999999999.5").is_err());
        assert!(SlackTs::parse("99999999999999999999").is_err());

        let max = SlackTs::parse(&format!("{MAX_SECS}.999999")).unwrap();
        assert_eq!(max.truncated_centis(), MAX_SECS * 100 + 99);
        assert!(SlackTs::parse(&(MAX_SECS + 1).to_string()).is_err());
    }

    #[test]
    fn test_truncation_equality() {
        let a = SlackTs::parse("1700000000.123456").unwrap();
        let b = SlackTs::parse("1700000000.129999").unwrap();
        let c = SlackTs::parse("1700000000.130000").unwrap();
        assert_eq!(a.truncated_centis(), b.truncated_centis());
        assert_ne!(a.truncated_centis(), c.truncated_centis());
        assert!(a < b && b < c);
    }

    #[test]
    fn test_ordering_ignores_trailing_zeros() {
        assert_eq!(
            SlackTs::parse("5.1").unwrap(),
            SlackTs::parse("5.100000").unwrap()
        );
    }

    #[test]
    fn test_to_datetime() {
        let dt = SlackTs::parse("1700000000.250000").unwrap().to_datetime().unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_serde_as_string() {
        let ts: SlackTs = serde_json::from_str("\"42.000001\"").unwrap();
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"42.000001\"");
        assert!(serde_json::from_str::<SlackTs>("\"x\"").is_err());
    }
}
