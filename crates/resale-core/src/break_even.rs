//! # Break-Even Calculator
//!
//! Solves for the lowest USD price at which a sale makes exactly zero profit,
//! then derives the tariff-inclusive and insurance-loaded figures from it.
//!
//! ## The Fixed Point
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The category fee is a percentage of the price we are solving for,     │
//! │  and the conversion fee is charged per dollar of that price:           │
//! │                                                                         │
//! │    P·rate  =  cost + shipping + P·rate·fee%  +  P·convFee               │
//! │                                                                         │
//! │  Collecting the P terms:                                               │
//! │                                                                         │
//! │    P  =  (cost + shipping) / (rate·(1 − fee%) − convFee)                │
//! │                                                                         │
//! │  The denominator is the yen kept per dollar of price. When it is ≤ 0   │
//! │  fees eat the whole sale and no price breaks even.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use resale_core::break_even::{calc_break_even_usd, margin_at_price, BreakEvenInput};
//! use resale_core::money::Jpy;
//! use resale_core::Percent;
//!
//! let input = BreakEvenInput {
//!     cost_jpy: Jpy::new(3_000.0),
//!     shipping_jpy: Jpy::new(1_200.0),
//!     rate_jpy_per_usd: 150.0,
//!     category_fee_percent: Percent::new(10.0),
//!     exchange_fee_jpy_per_usd: Jpy::new(3.3),
//! };
//!
//! let result = calc_break_even_usd(&input).unwrap();
//! assert!(result.break_even_usd.dollars() > 0.0);
//!
//! let margin = margin_at_price(&input, result.break_even_usd).unwrap();
//! assert!(margin.abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CalcError, CalcResult, ValidationError};
use crate::money::{Currency, ExchangeRate, Jpy, Usd};
use crate::pricing::{actual_cost, category_fee, conversion_fee, gross_profit, profit_margin};
use crate::types::Percent;
use crate::{DEFAULT_DUTY_PERCENT, DEFAULT_INSURANCE_LOADING_PERCENT};

// =============================================================================
// Inputs
// =============================================================================

/// One snapshot of the inputs to the break-even solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BreakEvenInput {
    /// Purchase cost.
    #[serde(rename = "costJPY")]
    pub cost_jpy: Jpy,

    /// Shipping cost (auto-selected or entered manually).
    #[serde(rename = "shippingJPY")]
    pub shipping_jpy: Jpy,

    /// Current JPY per USD. Must be > 0.
    #[serde(rename = "rateJPYperUSD")]
    pub rate_jpy_per_usd: f64,

    /// Marketplace category fee, 0–100.
    pub category_fee_percent: Percent,

    /// Yen lost per dollar when converting proceeds.
    #[serde(rename = "exchangeFeeJPYPerUSD")]
    pub exchange_fee_jpy_per_usd: Jpy,
}

/// Policy percentages layered on top of the break-even price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Surcharges {
    /// Flat import-duty rate applied to the break-even price.
    pub duty_percent: Percent,

    /// Shipping-insurance loading applied to the break-even price.
    pub insurance_percent: Percent,
}

impl Default for Surcharges {
    fn default() -> Self {
        Surcharges {
            duty_percent: Percent::new(DEFAULT_DUTY_PERCENT),
            insurance_percent: Percent::new(DEFAULT_INSURANCE_LOADING_PERCENT),
        }
    }
}

// =============================================================================
// Result
// =============================================================================

/// All break-even figures, computed together from one input snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct BreakEvenResult {
    #[serde(rename = "breakEvenUSD")]
    pub break_even_usd: Usd,

    /// `break_even_usd` at the input rate.
    #[serde(rename = "breakEvenJPY")]
    pub break_even_jpy: Jpy,

    /// Break-even price plus import duty.
    #[serde(rename = "dutyTotalUSD")]
    pub duty_total_usd: Usd,

    /// The insurance loading on its own.
    #[serde(rename = "insuranceUSD")]
    pub insurance_usd: Usd,

    /// Break-even price plus the insurance loading.
    #[serde(rename = "insuranceTotalUSD")]
    pub insurance_total_usd: Usd,
}

impl BreakEvenResult {
    /// The USD figure a display mode shows.
    pub fn usd_for(&self, mode: DisplayMode) -> Usd {
        match mode {
            DisplayMode::BreakEven => self.break_even_usd,
            DisplayMode::Tariff => self.duty_total_usd,
            DisplayMode::Insurance => self.insurance_total_usd,
        }
    }

    /// The same figure in whole yen.
    pub fn jpy_for(&self, mode: DisplayMode, rate: ExchangeRate) -> i64 {
        rate.to_jpy(self.usd_for(mode)).round_yen()
    }
}

// =============================================================================
// Display Mode
// =============================================================================

/// Which break-even figure the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum DisplayMode {
    /// Plain break-even price.
    #[default]
    BreakEven,
    /// Break-even plus import duty.
    Tariff,
    /// Break-even plus insurance loading.
    Insurance,
}

impl DisplayMode {
    /// Every mode, in switch order.
    pub const ALL: [DisplayMode; 3] = [
        DisplayMode::BreakEven,
        DisplayMode::Tariff,
        DisplayMode::Insurance,
    ];

    /// Heading for the figure.
    pub fn label(&self) -> &'static str {
        match self {
            DisplayMode::BreakEven => "Break-even (USD)",
            DisplayMode::Tariff => "Total incl. duty (USD)",
            DisplayMode::Insurance => "Total incl. insurance (USD)",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::BreakEven => write!(f, "breakeven"),
            DisplayMode::Tariff => write!(f, "tariff"),
            DisplayMode::Insurance => write!(f, "insurance"),
        }
    }
}

impl FromStr for DisplayMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakeven" | "break-even" | "break_even" | "be" => Ok(DisplayMode::BreakEven),
            "tariff" | "duty" => Ok(DisplayMode::Tariff),
            "insurance" => Ok(DisplayMode::Insurance),
            other => {
                let valid: Vec<String> = DisplayMode::ALL.iter().map(|m| m.to_string()).collect();
                Err(ValidationError::InvalidFormat {
                    field: "mode".to_string(),
                    reason: format!("unknown mode '{}'. Valid options: {}", other, valid.join(", ")),
                })
            }
        }
    }
}

// =============================================================================
// Solver
// =============================================================================

/// Break-even with the default duty and insurance percentages.
pub fn calc_break_even_usd(input: &BreakEvenInput) -> CalcResult<BreakEvenResult> {
    calc_break_even_usd_with(input, &Surcharges::default())
}

/// Break-even with explicit duty and insurance percentages.
///
/// ## Errors
/// - `InvalidExchangeRate` for a rate ≤ 0 or non-finite
/// - `FeesExceedRevenue` when fees leave nothing per dollar of price
/// - `NonFinite` when any figure overflows or an input was NaN
pub fn calc_break_even_usd_with(
    input: &BreakEvenInput,
    surcharges: &Surcharges,
) -> CalcResult<BreakEvenResult> {
    let rate = ExchangeRate::new(input.rate_jpy_per_usd)?;
    let kept_per_usd = net_yen_per_usd(rate, input.category_fee_percent, input.exchange_fee_jpy_per_usd)?;

    let break_even_usd = Usd::new((input.cost_jpy + input.shipping_jpy).yen() / kept_per_usd);
    let break_even_jpy = rate.to_jpy(break_even_usd);
    let duty_total_usd = break_even_usd * (1.0 + surcharges.duty_percent.fraction());
    let insurance_usd = break_even_usd * surcharges.insurance_percent.fraction();
    let insurance_total_usd = break_even_usd + insurance_usd;

    ensure_finite("breakEvenUSD", break_even_usd)?;
    ensure_finite("breakEvenJPY", break_even_jpy)?;
    ensure_finite("dutyTotalUSD", duty_total_usd)?;
    ensure_finite("insuranceUSD", insurance_usd)?;
    ensure_finite("insuranceTotalUSD", insurance_total_usd)?;

    Ok(BreakEvenResult {
        break_even_usd,
        break_even_jpy,
        duty_total_usd,
        insurance_usd,
        insurance_total_usd,
    })
}

/// Margin (percent, JPY basis) of selling at `price` under the same landed
/// cost model the solver uses. Zero at the break-even price.
pub fn margin_at_price(input: &BreakEvenInput, price: Usd) -> CalcResult<f64> {
    let rate = ExchangeRate::new(input.rate_jpy_per_usd)?;
    let selling_jpy = rate.to_jpy(price);
    let fees = category_fee(selling_jpy, input.category_fee_percent)
        + conversion_fee(price, input.exchange_fee_jpy_per_usd);
    let landed = actual_cost(input.cost_jpy, input.shipping_jpy, fees);

    let margin = profit_margin(gross_profit(selling_jpy, landed), selling_jpy);
    if !margin.is_finite() {
        return Err(CalcError::NonFinite {
            quantity: "margin".to_string(),
        });
    }
    Ok(margin)
}

/// Yen the seller keeps per dollar of price once the percentage fees and the
/// per-dollar conversion fee are taken out. Shared with the final-detail
/// solver so both use one fee order.
pub(crate) fn net_yen_per_usd(
    rate: ExchangeRate,
    percent_fees: Percent,
    conversion_fee_per_usd: Jpy,
) -> CalcResult<f64> {
    let rate = rate.jpy_per_usd();
    let kept = rate * (1.0 - percent_fees.fraction()) - conversion_fee_per_usd.yen();

    if !kept.is_finite() {
        return Err(CalcError::NonFinite {
            quantity: "net yen per USD".to_string(),
        });
    }
    if kept <= 0.0 {
        let fee_share = percent_fees.fraction() + conversion_fee_per_usd.yen() / rate;
        return Err(CalcError::FeesExceedRevenue {
            fee_share_percent: fee_share * 100.0,
        });
    }
    Ok(kept)
}

pub(crate) fn ensure_finite<C: Currency>(quantity: &str, value: C) -> CalcResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalcError::NonFinite {
            quantity: quantity.to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
