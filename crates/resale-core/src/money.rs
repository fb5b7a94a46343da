//! # Money Module
//!
//! Currency-typed amounts for the two currencies a cross-border sale touches.
//!
//! ## Why Typed Currencies?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE UNIT-MIXING PROBLEM                                                │
//! │                                                                         │
//! │  With bare numbers:                                                     │
//! │    profit = 45.0 (USD price) - 5_400.0 (JPY cost)  = -5_355  ❌ WRONG! │
//! │                                                                         │
//! │  OUR SOLUTION: one newtype per currency                                 │
//! │    Usd(45.0) - Jpy(5_400.0)          → does not compile                │
//! │    rate.to_jpy(Usd(45.0)) - Jpy(5_400.0) = Jpy(1_350.0)  ✅            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are `f64` because the exchange rate and percentage fees produce
//! fractional yen and cents. Rounding only happens for display.
//!
//! ## Usage
//! ```rust
//! use resale_core::money::{ExchangeRate, Jpy, Usd};
//!
//! let rate = ExchangeRate::new(150.0).unwrap();
//! let price = rate.to_jpy(Usd::new(40.0));
//! assert_eq!(price, Jpy::new(6_000.0));
//!
//! let profit = price - Jpy::new(4_200.0);
//! assert_eq!(profit.round_yen(), 1_800);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CalcError, CalcResult};

// =============================================================================
// Currency Trait
// =============================================================================

/// Common surface of [`Jpy`] and [`Usd`].
///
/// Functions that only make sense when both operands share a currency
/// (gross profit, margin) are generic over `C: Currency`, so the compiler
/// rejects a USD price paired with a JPY cost.
pub trait Currency:
    Copy + PartialEq + PartialOrd + Add<Output = Self> + Sub<Output = Self>
{
    /// Raw amount in major units (yen, dollars).
    fn amount(self) -> f64;

    /// Wraps a raw amount.
    fn from_amount(amount: f64) -> Self;

    /// Zero in this currency.
    fn zero() -> Self {
        Self::from_amount(0.0)
    }

    /// True unless the amount is NaN or infinite.
    fn is_finite(self) -> bool {
        self.amount().is_finite()
    }
}

// =============================================================================
// Jpy / Usd
// =============================================================================

/// An amount in Japanese yen.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Jpy(f64);

/// An amount in US dollars.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Usd(f64);

impl Jpy {
    /// Creates a yen amount.
    #[inline]
    pub const fn new(yen: f64) -> Self {
        Jpy(yen)
    }

    /// Returns the raw yen value.
    #[inline]
    pub const fn yen(&self) -> f64 {
        self.0
    }

    /// Rounds to whole yen for display (half away from zero).
    ///
    /// ```rust
    /// use resale_core::money::Jpy;
    ///
    /// assert_eq!(Jpy::new(6_749.5).round_yen(), 6_750);
    /// ```
    #[inline]
    pub fn round_yen(&self) -> i64 {
        self.0.round() as i64
    }
}

impl Usd {
    /// Creates a dollar amount.
    #[inline]
    pub const fn new(dollars: f64) -> Self {
        Usd(dollars)
    }

    /// Returns the raw dollar value.
    #[inline]
    pub const fn dollars(&self) -> f64 {
        self.0
    }

    /// Rounds to whole cents (half away from zero).
    #[inline]
    pub fn round_cents(&self) -> i64 {
        (self.0 * 100.0).round() as i64
    }
}

impl Currency for Jpy {
    #[inline]
    fn amount(self) -> f64 {
        self.0
    }

    #[inline]
    fn from_amount(amount: f64) -> Self {
        Jpy(amount)
    }
}

impl Currency for Usd {
    #[inline]
    fn amount(self) -> f64 {
        self.0
    }

    #[inline]
    fn from_amount(amount: f64) -> Self {
        Usd(amount)
    }
}

/// Same-currency arithmetic. Cross-currency operators are intentionally absent.
macro_rules! currency_ops {
    ($ty:ident) => {
        impl Add for $ty {
            type Output = Self;

            #[inline]
            fn add(self, other: Self) -> Self {
                $ty(self.0 + other.0)
            }
        }

        impl AddAssign for $ty {
            #[inline]
            fn add_assign(&mut self, other: Self) {
                self.0 += other.0;
            }
        }

        impl Sub for $ty {
            type Output = Self;

            #[inline]
            fn sub(self, other: Self) -> Self {
                $ty(self.0 - other.0)
            }
        }

        impl SubAssign for $ty {
            #[inline]
            fn sub_assign(&mut self, other: Self) {
                self.0 -= other.0;
            }
        }

        impl Neg for $ty {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                $ty(-self.0)
            }
        }

        impl Mul<f64> for $ty {
            type Output = Self;

            #[inline]
            fn mul(self, factor: f64) -> Self {
                $ty(self.0 * factor)
            }
        }

        impl Div<f64> for $ty {
            type Output = Self;

            #[inline]
            fn div(self, divisor: f64) -> Self {
                $ty(self.0 / divisor)
            }
        }

        impl Sum for $ty {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold($ty(0.0), |acc, x| acc + x)
            }
        }
    };
}

currency_ops!(Jpy);
currency_ops!(Usd);

/// Shows whole yen with thousands separators, e.g. `¥12,345`.
impl fmt::Display for Jpy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yen = self.round_yen();
        let sign = if yen < 0 { "-" } else { "" };
        write!(f, "{}¥{}", sign, group_thousands(yen.unsigned_abs()))
    }
}

/// Shows dollars with two decimals, e.g. `$45.99`.
impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.round_cents();
        let sign = if cents < 0 { "-" } else { "" };
        let cents = cents.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, cents / 100, cents % 100)
    }
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if value < 1000 {
            groups.push(value.to_string());
            break;
        }
        groups.push(format!("{:03}", value % 1000));
        value /= 1000;
    }
    groups.reverse();
    groups.join(",")
}

// =============================================================================
// Exchange Rate
// =============================================================================

/// A JPY-per-USD conversion rate, always finite and strictly positive.
///
/// ## Where the Rate Comes From
/// ```text
/// Rate provider (external, refreshes on its own schedule)
///      │
///      ▼
/// ExchangeRate::new(156.42) ← THIS TYPE (rejects 0, negatives, NaN)
///      │
///      ▼
/// Break-even / profit / final detail calculations
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ExchangeRate(f64);

impl ExchangeRate {
    /// Validates and wraps a JPY-per-USD rate.
    ///
    /// ```rust
    /// use resale_core::money::ExchangeRate;
    ///
    /// assert!(ExchangeRate::new(150.0).is_ok());
    /// assert!(ExchangeRate::new(0.0).is_err());
    /// assert!(ExchangeRate::new(f64::NAN).is_err());
    /// ```
    pub fn new(jpy_per_usd: f64) -> CalcResult<Self> {
        if jpy_per_usd.is_finite() && jpy_per_usd > 0.0 {
            Ok(ExchangeRate(jpy_per_usd))
        } else {
            Err(CalcError::InvalidExchangeRate { rate: jpy_per_usd })
        }
    }

    /// Yen received per dollar.
    #[inline]
    pub const fn jpy_per_usd(&self) -> f64 {
        self.0
    }

    /// Converts dollars to yen.
    #[inline]
    pub fn to_jpy(&self, usd: Usd) -> Jpy {
        Jpy(usd.0 * self.0)
    }

    /// Converts yen to dollars.
    #[inline]
    pub fn to_usd(&self, jpy: Jpy) -> Usd {
        Usd(jpy.0 / self.0)
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "¥{:.2}/USD", self.0)
    }
}

/// A rate captured from the external provider at a known instant.
///
/// The core never reads the clock; the caller stamps the snapshot when it
/// receives the rate so results can say which rate they were computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RateSnapshot {
    pub rate: ExchangeRate,
    #[ts(as = "String")]
    pub captured_at: DateTime<Utc>,
}

impl RateSnapshot {
    /// Validates `jpy_per_usd` and stamps it with `captured_at`.
    pub fn new(jpy_per_usd: f64, captured_at: DateTime<Utc>) -> CalcResult<Self> {
        Ok(RateSnapshot {
            rate: ExchangeRate::new(jpy_per_usd)?,
            captured_at,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
