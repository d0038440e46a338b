use std::fmt;
use std::num::ParseIntError;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// The value kinds a single record line converts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Integer,
    Boolean,
    Duration,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::String => "string".fmt(f),
            Self::Integer => "integer".fmt(f),
            Self::Boolean => "boolean".fmt(f),
            Self::Duration => "duration".fmt(f),
        }
    }
}

/// A type that can be read from one raw value.
pub trait Scalar: Sized {
    const KIND: ScalarKind;

    fn from_raw(raw: &str) -> Result<Self, ScalarError>;
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn from_raw(raw: &str) -> Result<Self, ScalarError> {
        Ok(raw.to_owned())
    }
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Boolean;

    fn from_raw(raw: &str) -> Result<Self, ScalarError> {
        parse_bool(raw)
    }
}

impl Scalar for Duration {
    const KIND: ScalarKind = ScalarKind::Duration;

    fn from_raw(raw: &str) -> Result<Self, ScalarError> {
        parse_duration(raw).map_err(ScalarError::Duration)
    }
}

macro_rules! integer_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::Integer;

                fn from_raw(raw: &str) -> Result<Self, ScalarError> {
                    raw.parse().map_err(ScalarError::Integer)
                }
            }
        )*
    };
}

integer_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScalarError {
    #[error("invalid integer")]
    Integer(#[source] ParseIntError),
    #[error("invalid boolean, expected one of 0, 1, t, f, true, false")]
    Boolean,
    #[error("invalid duration")]
    Duration(#[source] DurationError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("negative durations are not supported")]
    Negative,
    #[error("expected a number")]
    MissingNumber,
    #[error("missing unit")]
    MissingUnit,
    #[error("unknown unit {0:?}")]
    UnknownUnit(String),
    #[error("duration out of range")]
    Overflow,
}

/// Accepts `0`, `1`, `t`, `f`, `true`, `false` in any letter case.
pub fn parse_bool(raw: &str) -> Result<bool, ScalarError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        _ => Err(ScalarError::Boolean),
    }
}

/// Parses compound literals such as `72h`, `1h30m`, `1.5s` or `250ms`.
pub fn parse_duration(raw: &str) -> Result<Duration, DurationError> {
    let mut rest = raw.strip_prefix('+').unwrap_or(raw);
    if rest.starts_with('-') {
        return Err(DurationError::Negative);
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationError::Empty);
    }

    let mut nanos: u128 = 0;

    while !rest.is_empty() {
        let (whole, tail) = split_digits(rest);
        let (fraction, tail) = match tail.strip_prefix('.') {
            Some(tail) => split_digits(tail),
            None => ("", tail),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(DurationError::MissingNumber);
        }

        let unit_len = tail
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale = unit_scale(unit)?;

        let whole = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|_| DurationError::Overflow)?
        };
        nanos = whole
            .checked_mul(scale)
            .and_then(|n| nanos.checked_add(n))
            .ok_or(DurationError::Overflow)?;
        nanos = nanos
            .checked_add(fraction_nanos(fraction, scale))
            .ok_or(DurationError::Overflow)?;

        rest = tail;
    }

    let secs = u64::try_from(nanos / NANOS_PER_SEC).map_err(|_| DurationError::Overflow)?;
    // Always below one billion.
    #[allow(clippy::cast_possible_truncation)]
    let subsec = (nanos % NANOS_PER_SEC) as u32;

    Ok(Duration::new(secs, subsec))
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn unit_scale(unit: &str) -> Result<u128, DurationError> {
    Ok(match unit {
        "" => return Err(DurationError::MissingUnit),
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 60 * 60 * NANOS_PER_SEC,
        other => return Err(DurationError::UnknownUnit(other.to_owned())),
    })
}

/// Digits past the 18th are below nanosecond precision for every unit and are dropped.
fn fraction_nanos(fraction: &str, scale: u128) -> u128 {
    let mut value: u128 = 0;
    let mut denom: u128 = 1;

    for d in fraction.bytes().take(18) {
        value = value * 10 + u128::from(d - b'0');
        denom *= 10;
    }

    value * scale / denom
}
