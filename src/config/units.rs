//! Human-readable duration and byte-size values.
//!
//! Several config fields are written as strings like `"1m30s"`, `"30d"` or
//! `"16k"`. The types here keep the string exactly as written next to the
//! parsed value, and can only be built by parsing, so a resolved config never
//! holds a duration or size that failed to parse.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

const NANOSECOND: u128 = 1;
const MICROSECOND: u128 = 1_000 * NANOSECOND;
const MILLISECOND: u128 = 1_000 * MICROSECOND;
const SECOND: u128 = 1_000 * MILLISECOND;
const MINUTE: u128 = 60 * SECOND;
const HOUR: u128 = 60 * MINUTE;
const DAY: u128 = 24 * HOUR;
const WEEK: u128 = 7 * DAY;
const MONTH: u128 = 30 * DAY;
const YEAR: u128 = 365 * DAY;

/// Largest representable duration, in nanoseconds (same ceiling as a signed
/// 64-bit nanosecond counter, roughly 292 years).
const MAX_NANOS: u128 = i64::MAX as u128;

/// Units accepted by the standard grammar.
const STANDARD_UNITS: &[(&str, u128)] = &[
    ("ns", NANOSECOND),
    ("us", MICROSECOND),
    ("\u{00b5}s", MICROSECOND),
    ("\u{03bc}s", MICROSECOND),
    ("ms", MILLISECOND),
    ("s", SECOND),
    ("m", MINUTE),
    ("h", HOUR),
];

/// Extra units accepted by the extended grammar.
const EXTENDED_UNITS: &[(&str, u128)] = &[("d", DAY), ("w", WEEK), ("mo", MONTH), ("y", YEAR)];

const KIBIBYTE: f64 = 1024.0;
const MEBIBYTE: f64 = 1024.0 * KIBIBYTE;
const GIBIBYTE: f64 = 1024.0 * MEBIBYTE;
const TEBIBYTE: f64 = 1024.0 * GIBIBYTE;

/// Errors from parsing durations and byte sizes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("invalid duration {0:?}")]
    InvalidDuration(String),
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
    #[error("negative duration {0:?}")]
    NegativeDuration(String),
    #[error("duration {0:?} is out of range")]
    DurationOverflow(String),
    #[error("invalid byte quantity {0:?} (expected a number followed by B, K, M, G or T)")]
    InvalidByteSize(String),
}

/// Which duration grammar a field uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationGrammar {
    /// `ns`, `us`, `ms`, `s`, `m`, `h`.
    Standard,
    /// Standard units plus `d`, `w`, `mo` and `y`.
    Extended,
}

impl DurationGrammar {
    fn unit_scale(self, unit: &str) -> Option<u128> {
        let extended: &[(&str, u128)] = match self {
            Self::Standard => &[],
            Self::Extended => EXTENDED_UNITS,
        };
        STANDARD_UNITS
            .iter()
            .chain(extended)
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
    }
}

/// A duration parsed from a config string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanDuration {
    raw: String,
    value: Duration,
}

impl HumanDuration {
    /// Parse using the standard grammar (`"1h30m"`, `"2.5s"`).
    pub fn parse_standard(raw: &str) -> Result<Self, UnitError> {
        Self::parse(raw, DurationGrammar::Standard)
    }

    /// Parse using the extended grammar (`"30d"`, `"1y2mo"`).
    pub fn parse_extended(raw: &str) -> Result<Self, UnitError> {
        Self::parse(raw, DurationGrammar::Extended)
    }

    pub fn parse(raw: &str, grammar: DurationGrammar) -> Result<Self, UnitError> {
        let value = parse_duration(raw, grammar)?;
        Ok(Self {
            raw: raw.to_string(),
            value,
        })
    }

    /// The string as written in the config file.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn as_duration(&self) -> Duration {
        self.value
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A byte count parsed from a config string such as `"96k"` or `"1.5MB"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSize {
    raw: String,
    bytes: u64,
}

impl ByteSize {
    pub fn parse(raw: &str) -> Result<Self, UnitError> {
        let bytes = parse_byte_size(raw)?;
        Ok(Self {
            raw: raw.to_string(),
            bytes,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse a duration string such as `"1h15m30.5s"`.
///
/// The input is a sequence of `<number><unit>` terms, where the number may
/// carry a decimal fraction. A lone `"0"` needs no unit. A leading `+` is
/// accepted; a leading `-` is rejected since `Duration` is unsigned.
pub fn parse_duration(raw: &str, grammar: DurationGrammar) -> Result<Duration, UnitError> {
    let invalid = || UnitError::InvalidDuration(raw.to_string());

    let mut rest = raw;
    if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    } else if rest.starts_with('-') {
        return Err(UnitError::NegativeDuration(raw.to_string()));
    }

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, after) = split_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(after_dot) => split_digits(after_dot),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_end = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_end);
        if unit.is_empty() {
            return Err(UnitError::MissingUnit(raw.to_string()));
        }
        let scale = grammar
            .unit_scale(unit)
            .ok_or_else(|| UnitError::UnknownUnit {
                unit: unit.to_string(),
                input: raw.to_string(),
            })?;

        let overflow = || UnitError::DurationOverflow(raw.to_string());
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;
        nanos = nanos
            .checked_add(fraction_nanos(fraction, scale))
            .ok_or_else(overflow)?;
        total = total.checked_add(nanos).ok_or_else(overflow)?;
        if total > MAX_NANOS {
            return Err(overflow());
        }

        rest = after;
    }

    let secs = (total / SECOND) as u64;
    let subsec = (total % SECOND) as u32;
    Ok(Duration::new(secs, subsec))
}

/// Split off the leading run of ASCII digits.
fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Nanoseconds contributed by the fractional digits of a term.
fn fraction_nanos(fraction: &str, scale: u128) -> u128 {
    // Digits past the 18th cannot change the result at nanosecond precision.
    let mut numerator: u128 = 0;
    let mut denominator: u128 = 1;
    for digit in fraction.bytes().take(18) {
        numerator = numerator * 10 + u128::from(digit - b'0');
        denominator *= 10;
    }
    numerator * scale / denominator
}

/// Parse a byte size such as `"16k"` or `"1.5MB"`.
///
/// Units are powers of 1024 and case-insensitive. No space is allowed between
/// the number and the unit.
pub fn parse_byte_size(raw: &str) -> Result<u64, UnitError> {
    let invalid = || UnitError::InvalidByteSize(raw.to_string());

    let upper = raw.trim().to_uppercase();
    let unit_start = upper
        .find(|c: char| c.is_alphabetic())
        .ok_or_else(invalid)?;
    let (number, unit) = upper.split_at(unit_start);

    let value: f64 = number.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }

    let multiplier = match unit {
        "T" | "TB" | "TIB" => TEBIBYTE,
        "G" | "GB" | "GIB" => GIBIBYTE,
        "M" | "MB" | "MIB" => MEBIBYTE,
        "K" | "KB" | "KIB" => KIBIBYTE,
        "B" => 1.0,
        _ => return Err(invalid()),
    };

    let bytes = value * multiplier;
    if bytes >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as u64)
}
