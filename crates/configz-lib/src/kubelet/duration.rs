//! Go duration strings as served by the kubelet (`"1m0s"`, `"500ms"`, `"4h0m0s"`)

use std::fmt::Write as _;
use std::time::Duration;

use serde::Serializer;
use thiserror::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,
    #[error("negative durations are not supported")]
    Negative,
    #[error("missing unit")]
    MissingUnit,
    #[error("unknown unit {0:?}")]
    UnknownUnit(String),
    #[error("invalid number")]
    InvalidNumber,
    #[error("duration out of range")]
    Overflow,
}

/// Parse a Go `time.Duration` string
pub fn parse_go_duration(input: &str) -> Result<Duration, DurationParseError> {
    let (negative, mut rest) = match input.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);

        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3600 * NANOS_PER_SEC,
            "" => return Err(DurationParseError::MissingUnit),
            other => return Err(DurationParseError::UnknownUnit(other.to_string())),
        };

        total = total
            .checked_add(scaled(number, unit_nanos)?)
            .ok_or(DurationParseError::Overflow)?;
        rest = tail;
    }

    if negative && total != 0 {
        return Err(DurationParseError::Negative);
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| DurationParseError::Overflow)?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// `number` (digits with an optional fraction) multiplied by `unit_nanos`
fn scaled(number: &str, unit_nanos: u128) -> Result<u128, DurationParseError> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(DurationParseError::InvalidNumber);
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationParseError::InvalidNumber);
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| DurationParseError::Overflow)?
    };
    let mut value = whole
        .checked_mul(unit_nanos)
        .ok_or(DurationParseError::Overflow)?;

    let mut scale = unit_nanos;
    for digit in fraction.bytes() {
        scale /= 10;
        if scale == 0 {
            break;
        }
        value = value
            .checked_add(u128::from(digit - b'0') * scale)
            .ok_or(DurationParseError::Overflow)?;
    }
    Ok(value)
}

/// Render a duration the way Go's `Duration.String` does
pub fn format_go_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }

    let nanos = duration.as_nanos();
    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return format!("{}µs", fraction(nanos, 1_000));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", fraction(nanos, 1_000_000));
    }

    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = u128::from(secs % 60) * NANOS_PER_SEC + u128::from(duration.subsec_nanos());

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{}h", hours);
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{}m", minutes);
    }
    let _ = write!(out, "{}s", fraction(seconds, NANOS_PER_SEC));
    out
}

/// `value / unit` with the remainder as trimmed decimal digits
fn fraction(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let remainder = value % unit;
    if remainder == 0 {
        return whole.to_string();
    }

    let width = unit.to_string().len() - 1;
    let digits = format!("{:0width$}", remainder, width = width);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

pub(crate) fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_go_duration(*duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kubelet_defaults() {
        assert_eq!(parse_go_duration("1m0s").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_go_duration("20s").unwrap(), Duration::from_secs(20));
        assert_eq!(parse_go_duration("4h0m0s").unwrap(), Duration::from_secs(4 * 3600));
        assert_eq!(parse_go_duration("0s").unwrap(), Duration::ZERO);
        assert_eq!(parse_go_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_fractions_and_small_units() {
        assert_eq!(parse_go_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_go_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_go_duration("2us").unwrap(), Duration::from_micros(2));
        assert_eq!(parse_go_duration("3µs").unwrap(), Duration::from_micros(3));
        assert_eq!(parse_go_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(
            parse_go_duration("1h2m3.25s").unwrap(),
            Duration::from_millis(3_723_250)
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_go_duration(""), Err(DurationParseError::Empty));
        assert_eq!(parse_go_duration("10"), Err(DurationParseError::MissingUnit));
        assert_eq!(parse_go_duration("-5s"), Err(DurationParseError::Negative));
        assert_eq!(parse_go_duration("-"), Err(DurationParseError::Empty));
        assert_eq!(
            parse_go_duration("5d"),
            Err(DurationParseError::UnknownUnit("d".to_string()))
        );
        assert_eq!(parse_go_duration("1.2.3s"), Err(DurationParseError::InvalidNumber));
        assert_eq!(parse_go_duration("s"), Err(DurationParseError::InvalidNumber));
    }

    #[test]
    fn test_negative_zero_is_zero() {
        assert_eq!(parse_go_duration("-0"), Ok(Duration::ZERO));
        assert_eq!(parse_go_duration("-0s"), Ok(Duration::ZERO));
        assert_eq!(parse_go_duration("-0.0s"), Ok(Duration::ZERO));
        assert_eq!(parse_go_duration("+0h0m"), Ok(Duration::ZERO));
    }

    #[test]
    fn test_huge_values_overflow_instead_of_panicking() {
        assert_eq!(
            parse_go_duration("94522879700260684295381835.9h"),
            Err(DurationParseError::Overflow)
        );
        assert_eq!(
            parse_go_duration("99999999999999999999999999999999999999999h"),
            Err(DurationParseError::Overflow)
        );
        assert_eq!(
            parse_go_duration("18446744073709551616s"),
            Err(DurationParseError::Overflow)
        );
    }

    #[test]
    fn test_format_matches_go() {
        assert_eq!(format_go_duration(Duration::ZERO), "0s");
        assert_eq!(format_go_duration(Duration::from_secs(60)), "1m0s");
        assert_eq!(format_go_duration(Duration::from_secs(4 * 3600)), "4h0m0s");
        assert_eq!(format_go_duration(Duration::from_secs(10)), "10s");
        assert_eq!(format_go_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_go_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_go_duration(Duration::from_nanos(1500)), "1.5µs");
        assert_eq!(format_go_duration(Duration::from_nanos(42)), "42ns");
    }
}
