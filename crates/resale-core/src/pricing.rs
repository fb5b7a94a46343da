//! # Pricing Primitives
//!
//! Small building blocks shared by the break-even solver, the final-detail
//! solver and the quote composer.
//!
//! ```text
//! selling price (JPY) ──► category_fee ──┐
//! purchase cost ─────────────────────────┼──► actual_cost ──► gross_profit ──► profit_margin
//! shipping ──────────────────────────────┘
//! ```
//!
//! Gross profit and margin are generic over [`Currency`], so price and cost
//! must already be in the same currency when they meet here.

use crate::money::{Currency, Jpy, Usd};
use crate::types::Percent;

/// Marketplace fee on a JPY selling price.
///
/// ```rust
/// use resale_core::money::Jpy;
/// use resale_core::pricing::category_fee;
/// use resale_core::Percent;
///
/// assert_eq!(category_fee(Jpy::new(6_000.0), Percent::new(10.0)), Jpy::new(600.0));
/// ```
///
/// Percent outside `[0, 100]` is accepted arithmetically; master data is
/// validated on load.
#[inline]
pub fn category_fee(selling_price: Jpy, fee: Percent) -> Jpy {
    selling_price * fee.fraction()
}

/// Purchase cost + shipping + category fee.
#[inline]
pub fn actual_cost(cost: Jpy, shipping: Jpy, category_fee: Jpy) -> Jpy {
    cost + shipping + category_fee
}

/// Selling price minus actual cost, both in currency `C`.
#[inline]
pub fn gross_profit<C: Currency>(selling_price: C, actual_cost: C) -> C {
    selling_price - actual_cost
}

/// Gross profit as a percentage of the selling price.
///
/// A zero selling price yields `0.0` rather than NaN.
///
/// ```rust
/// use resale_core::money::Jpy;
/// use resale_core::pricing::profit_margin;
///
/// assert_eq!(profit_margin(Jpy::new(1_500.0), Jpy::new(6_000.0)), 25.0);
/// assert_eq!(profit_margin(Jpy::new(-100.0), Jpy::new(0.0)), 0.0);
/// ```
#[inline]
pub fn profit_margin<C: Currency>(gross_profit: C, selling_price: C) -> f64 {
    if selling_price.amount() == 0.0 {
        return 0.0;
    }
    gross_profit.amount() / selling_price.amount() * 100.0
}

/// Currency-conversion fee: a fixed number of yen per dollar converted.
#[inline]
pub fn conversion_fee(selling_price: Usd, fee_per_usd: Jpy) -> Jpy {
    fee_per_usd * selling_price.dollars()
}

// =============================================================================
// Unit Tests
// =============================================================================
