use std::{
    fmt::Display,
    ops::{Add, Neg, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// The number of decimal places carried by every monetary value.
pub const MONEY_SCALE: u32 = 2;
const CENTS_PER_UNIT: i64 = 100;

//--------------------------------------        Money         ---------------------------------------------------------
/// An exact monetary amount with a fixed two-digit scale, held as an integer number of cents.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(unary Money, Neg, neg);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value cannot be represented as money: {0}")]
pub struct MoneyConversionError(String);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_units(units: i64) -> Self {
        Self(units * CENTS_PER_UNIT)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Sums the amounts, returning `None` on overflow rather than wrapping.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts.into_iter().try_fold(Self::ZERO, Self::checked_add)
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    /// Parses a plain decimal amount such as `29.99`, `-5.00`, `100` or `0.5`. At most two fractional digits are
    /// accepted; anything finer is rejected rather than rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(frac) {
            return Err(MoneyConversionError(format!("'{s}' is not a decimal amount")));
        }
        if frac.len() > MONEY_SCALE as usize {
            return Err(MoneyConversionError(format!("'{s}' has more than {MONEY_SCALE} decimal places")));
        }
        let overflow = || MoneyConversionError(format!("'{s}' is too large"));
        let units = whole.parse::<i64>().map_err(|_| overflow())?;
        let cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| overflow())? * 10,
            _ => frac.parse::<i64>().map_err(|_| overflow())?,
        };
        let total = units.checked_mul(CENTS_PER_UNIT).and_then(|u| u.checked_add(cents)).ok_or_else(overflow)?;
        Ok(Self(if negative { -total } else { total }))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_unit = CENTS_PER_UNIT.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per_unit, abs % per_unit)
    }
}
