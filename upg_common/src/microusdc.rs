use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const USDC_CURRENCY_CODE: &str = "USDC";
/// Number of micro-units in one whole USDC (or USD).
pub const MICRO_PER_UNIT: i64 = 1_000_000;
/// Number of micro-units in one cent.
pub const MICRO_PER_CENT: i64 = 10_000;

//--------------------------------------     MicroUsdc       ---------------------------------------------------------
/// A fixed-point USDC amount, stored as an integer number of micro-units (6 decimal places).
///
/// Fiat order totals use the same representation; they are always a whole number of cents.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct MicroUsdc(i64);

op!(binary MicroUsdc, Add, add);
op!(binary MicroUsdc, Sub, sub);
op!(inplace MicroUsdc, AddAssign, add_assign);
op!(inplace MicroUsdc, SubAssign, sub_assign);
op!(unary MicroUsdc, Neg, neg);

impl Mul<i64> for MicroUsdc {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for MicroUsdc {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value cannot be represented in micro-USDC: {0}")]
pub struct MicroUsdcConversionError(String);

impl From<i64> for MicroUsdc {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for MicroUsdc {
    type Error = MicroUsdcConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MicroUsdcConversionError(format!("Value {value} is too large to convert to MicroUsdc")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for MicroUsdc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        #[allow(clippy::cast_sign_loss)]
        let unit = MICRO_PER_UNIT as u64;
        write!(f, "{sign}{}.{:06}", abs / unit, abs % unit)
    }
}

impl FromStr for MicroUsdc {
    type Err = MicroUsdcConversionError;

    /// Parses a plain decimal string such as `"2.000123"`, `"0.5"` or `"-3"`. At most 6 decimal places are
    /// accepted, so the conversion is always exact.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MicroUsdcConversionError(format!("'{s}' is not a valid decimal amount"));
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(err());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        if frac.len() > 6 {
            return Err(MicroUsdcConversionError(format!("'{s}' has more than 6 decimal places")));
        }
        let whole = if whole.is_empty() { 0 } else { whole.parse::<i64>().map_err(|_| err())? };
        let frac = if frac.is_empty() { 0 } else { format!("{frac:0<6}").parse::<i64>().map_err(|_| err())? };
        let value = whole.checked_mul(MICRO_PER_UNIT).and_then(|w| w.checked_add(frac)).ok_or_else(err)?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl MicroUsdc {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_units(units: i64) -> Self {
        Self(units * MICRO_PER_UNIT)
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(cents * MICRO_PER_CENT)
    }

    /// Converts a floating point amount (as found in provider JSON payloads) to the nearest micro-unit.
    pub fn from_f64(value: f64) -> Result<Self, MicroUsdcConversionError> {
        if !value.is_finite() {
            return Err(MicroUsdcConversionError(format!("{value} is not a finite number")));
        }
        let micro = (value * MICRO_PER_UNIT as f64).round();
        if micro.abs() >= i64::MAX as f64 {
            return Err(MicroUsdcConversionError(format!("{value} is out of range")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(micro as i64))
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / MICRO_PER_UNIT as f64
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Rounds to the nearest cent, with halves rounded away from zero. Returns `None` if the rounded amount does not
    /// fit.
    pub fn checked_round_to_cents(&self) -> Option<Self> {
        let half = MICRO_PER_CENT / 2;
        let abs = self.0.checked_abs()?.checked_add(half)? / MICRO_PER_CENT * MICRO_PER_CENT;
        Some(Self(if self.0 < 0 { -abs } else { abs }))
    }

    /// Drops everything below one cent. The result is never further from zero than `self`.
    pub fn truncate_to_cents(&self) -> Self {
        Self(self.0 - self.0 % MICRO_PER_CENT)
    }

    pub fn is_whole_cents(&self) -> bool {
        self.0 % MICRO_PER_CENT == 0
    }

    /// Formats the amount with two decimal places, truncating any sub-cent remainder. e.g. `2.00`
    pub fn format_cents(&self) -> String {
        let cents = self.truncate_to_cents().0 / MICRO_PER_CENT;
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}
