//! # resale-core: Pure Pricing Logic for Cross-Border Resale
//!
//! This crate is the **heart** of the resale pricing tool. It answers one
//! question: "at what USD price does this item make money?" Everything in it
//! is a pure function with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Resale Pricing Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Caller (resale-quote CLI / web UI)              │   │
//! │  │   form fields ──► QuoteInput     rate provider ──► RateSnapshot │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ resale-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │ shipping  │  │  pricing  │  │ break_even │  │   quote   │  │   │
//! │  │   │ cheapest  │  │ fees/cost │  │ duty/insur │  │ evaluate  │  │   │
//! │  │   │   rule    │  │  margin   │  │ final_det. │  │ everything│  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO LOGGING • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │                 resale-data (Master Data Layer)                 │   │
//! │  │         shipping.json, categoryFees.json, pricing.toml          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - `Jpy` / `Usd` newtypes and the exchange rate
//! - [`types`] - Shipping rules, dimensions, category fees
//! - [`shipping`] - Cheapest eligible shipping rule
//! - [`pricing`] - Category fee, actual cost, gross profit, margin
//! - [`break_even`] - Break-even, tariff and insurance prices
//! - [`final_detail`] - Full fee breakdown and target-margin price
//! - [`quote`] - One input snapshot in, every figure out
//! - [`error`] - Calculation and validation errors
//! - [`validation`] - Master data and input checks
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same inputs give bit-identical outputs
//! 2. **No I/O**: files, network, clock and logging belong to the callers
//! 3. **Typed Currencies**: a USD price and a JPY cost cannot be mixed
//! 4. **No Silent Zeros**: an empty field is an error, never a default
//!
//! ## Example Usage
//!
//! ```rust
//! use resale_core::break_even::{calc_break_even_usd, BreakEvenInput, DisplayMode};
//! use resale_core::money::{ExchangeRate, Jpy};
//! use resale_core::Percent;
//!
//! let result = calc_break_even_usd(&BreakEvenInput {
//!     cost_jpy: Jpy::new(3_000.0),
//!     shipping_jpy: Jpy::new(1_200.0),
//!     rate_jpy_per_usd: 150.0,
//!     category_fee_percent: Percent::new(10.0),
//!     exchange_fee_jpy_per_usd: Jpy::new(3.3),
//! })
//! .unwrap();
//!
//! // 4200 / (150 × 0.9 − 3.3) ≈ $31.89
//! assert_eq!(result.break_even_usd.round_cents(), 3_189);
//!
//! let rate = ExchangeRate::new(150.0).unwrap();
//! assert_eq!(result.jpy_for(DisplayMode::BreakEven, rate), 4_784);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod break_even;
pub mod error;
pub mod final_detail;
pub mod money;
pub mod pricing;
pub mod quote;
pub mod shipping;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use break_even::{BreakEvenInput, BreakEvenResult, DisplayMode};
pub use error::{CalcError, CalcResult, ValidationError};
pub use money::{ExchangeRate, Jpy, RateSnapshot, Usd};
pub use quote::{evaluate, PricingPolicy, Quote, QuoteInput, ShippingInput};
pub use types::*;

// =============================================================================
// Policy Defaults
// =============================================================================

/// Yen lost per dollar when the marketplace converts proceeds.
pub const DEFAULT_EXCHANGE_FEE_JPY_PER_USD: f64 = 3.3;

/// Payment-processing fee on the selling price.
pub const DEFAULT_PAYMENT_FEE_PERCENT: f64 = 1.35;

/// Margin the required-price solver aims for (fraction).
pub const DEFAULT_TARGET_MARGIN: f64 = 0.30;

/// Flat import duty applied to the break-even price.
///
/// ## Business Reason
/// Buyers see duty on top of the listed price; quoting the duty-inclusive
/// total shows what they effectively pay.
pub const DEFAULT_DUTY_PERCENT: f64 = 15.0;

/// Shipping-insurance loading applied to the break-even price.
pub const DEFAULT_INSURANCE_LOADING_PERCENT: f64 = 30.0;

/// Average US sales tax added to the listed price at checkout.
pub const DEFAULT_US_SALES_TAX_PERCENT: f64 = 6.71;
