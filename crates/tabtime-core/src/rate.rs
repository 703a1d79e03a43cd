//! Exact rational helpers for rates, hours and amounts.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::Duration;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use thiserror::Error;

/// Largest exponent accepted in scientific rate notation.
const MAX_EXPONENT: u32 = 64;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Errors from parsing a rate string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("empty rate")]
    Empty,

    #[error("malformed rate {input:?}")]
    Malformed { input: String },

    #[error("rate {input:?} has a zero denominator")]
    ZeroDenominator { input: String },

    #[error("rate {input:?} has an exponent beyond {max}", max = MAX_EXPONENT)]
    ExponentTooLarge { input: String },
}

/// Parses a decimal (`120`, `87.50`, `-.5`, `1.2e2`) or fraction (`255/2`)
/// into an exact rational.
pub fn parse_rate(input: &str) -> Result<BigRational, RateError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(RateError::Empty);
    }
    let malformed = || RateError::Malformed {
        input: input.to_string(),
    };

    if let Some((numer, denom)) = s.split_once('/') {
        let numer = BigInt::from_str(numer.trim()).map_err(|_| malformed())?;
        let denom = BigInt::from_str(denom.trim()).map_err(|_| malformed())?;
        if denom.is_zero() {
            return Err(RateError::ZeroDenominator {
                input: input.to_string(),
            });
        }
        return Ok(BigRational::new(numer, denom));
    }

    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i32>().map_err(|_| malformed())?),
        None => (unsigned, 0),
    };
    if exponent.unsigned_abs() > MAX_EXPONENT {
        return Err(RateError::ExponentTooLarge {
            input: input.to_string(),
        });
    }

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
    {
        return Err(malformed());
    }

    let digits = format!("{whole}{fraction}");
    let mut numer = BigInt::from_str(&digits).map_err(|_| malformed())?;
    if negative {
        numer = -numer;
    }

    let fraction_len = i64::try_from(fraction.len()).map_err(|_| malformed())?;
    let scale = fraction_len - i64::from(exponent);
    let value = match scale.cmp(&0) {
        Ordering::Greater => BigRational::new(numer, pow10(scale.unsigned_abs())),
        Ordering::Less => BigRational::from_integer(numer * pow10(scale.unsigned_abs())),
        Ordering::Equal => BigRational::from_integer(numer),
    };
    Ok(value)
}

fn pow10(exp: u64) -> BigInt {
    let exp = usize::try_from(exp).unwrap_or(usize::MAX);
    num_traits::pow(BigInt::from(10), exp)
}

/// Converts a duration into an exact number of hours.
pub fn hours(duration: Duration) -> BigRational {
    let nanos = BigInt::from(duration.num_seconds()) * NANOS_PER_SECOND
        + BigInt::from(duration.subsec_nanos());
    BigRational::new(nanos, BigInt::from(SECONDS_PER_HOUR * NANOS_PER_SECOND))
}

/// Rounds to `places` decimals, ties going to the even neighbour.
pub fn round_half_even(value: &BigRational, places: u32) -> BigRational {
    let scale = BigRational::from_integer(pow10(u64::from(places)));
    let scaled = value * &scale;
    let floor = scaled.floor();
    let half = BigRational::new(BigInt::one(), BigInt::from(2));

    let rounded = match (&scaled - &floor).cmp(&half) {
        Ordering::Less => floor,
        Ordering::Greater => floor + BigRational::one(),
        Ordering::Equal => {
            if (floor.to_integer() % BigInt::from(2)).is_zero() {
                floor
            } else {
                floor + BigRational::one()
            }
        }
    };
    rounded / scale
}

/// Renders with exactly `places` decimals, halves rounded away from zero.
pub fn format_fixed(value: &BigRational, places: u32) -> String {
    let scale = BigRational::from_integer(pow10(u64::from(places)));
    let digits = (value.abs() * scale).round().to_integer().to_string();

    let places = usize::try_from(places).unwrap_or(usize::MAX);
    let digits = format!("{digits:0>width$}", width = places + 1);
    let (whole, fraction) = digits.split_at(digits.len() - places);

    let sign = if value.is_negative() && digits.bytes().any(|b| b != b'0') {
        "-"
    } else {
        ""
    };
    if fraction.is_empty() {
        format!("{sign}{whole}")
    } else {
        format!("{sign}{whole}.{fraction}")
    }
}
