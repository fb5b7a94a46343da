//! # Final Profit Detail
//!
//! Full cost breakdown at the price the seller entered, plus the price that
//! would hit a target margin.
//!
//! ## Fee Order
//! ```text
//! gross selling price (USD)
//!      │  × rate
//!      ▼
//! gross selling price (JPY)
//!      ├── category fee  = JPY × category%   ┐ both on the gross JPY price,
//!      ├── payment fee   = JPY × payment%    ┘ never on each other
//!      └── conversion fee = USD × yen-per-dollar
//! ```
//!
//! This is the same order the break-even solver uses, so with a zero payment
//! fee and a zero target margin the required price equals the break-even
//! price for identical inputs.
//!
//! ## Solving for a Target Margin `m`
//! ```text
//! P·rate·m = P·rate − cost − shipping − P·rate·(cat% + pay%) − P·convFee
//!
//! P = (cost + shipping) / (rate·(1 − cat% − pay% − m) − convFee)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::break_even::{ensure_finite, net_yen_per_usd};
use crate::error::{CalcError, CalcResult};
use crate::money::{ExchangeRate, Jpy, Usd};
use crate::pricing::{actual_cost, category_fee, conversion_fee, gross_profit, profit_margin};
use crate::types::Percent;
use crate::validation::{validate_amount, validate_percent, validate_target_margin};

/// Inputs for one final-detail calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FinalDetailInput {
    #[serde(rename = "costJPY")]
    pub cost_jpy: Jpy,

    #[serde(rename = "shippingJPY")]
    pub shipping_jpy: Jpy,

    /// Price the seller intends to list at.
    #[serde(rename = "sellingPriceUSD")]
    pub selling_price_usd: Usd,

    #[serde(rename = "rateJPYperUSD")]
    pub rate_jpy_per_usd: f64,

    pub category_fee_percent: Percent,

    /// Payment-processing fee, 0–100.
    pub payment_fee_percent: Percent,

    #[serde(rename = "exchangeFeeJPYPerUSD")]
    pub exchange_fee_jpy_per_usd: Jpy,

    /// Desired margin as a fraction in `[0, 1)`, e.g. `0.30`.
    pub target_margin: f64,
}

/// Every cost line at one selling price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct FeeBreakdown {
    #[serde(rename = "sellingPriceUSD")]
    pub selling_price_usd: Usd,
    #[serde(rename = "sellingPriceJPY")]
    pub selling_price_jpy: Jpy,
    #[serde(rename = "costJPY")]
    pub cost_jpy: Jpy,
    #[serde(rename = "shippingJPY")]
    pub shipping_jpy: Jpy,
    #[serde(rename = "categoryFeeJPY")]
    pub category_fee_jpy: Jpy,
    #[serde(rename = "paymentFeeJPY")]
    pub payment_fee_jpy: Jpy,
    #[serde(rename = "conversionFeeJPY")]
    pub conversion_fee_jpy: Jpy,
    /// Cost + shipping + all three fees.
    #[serde(rename = "totalCostJPY")]
    pub total_cost_jpy: Jpy,
    #[serde(rename = "profitJPY")]
    pub profit_jpy: Jpy,
    #[serde(rename = "profitUSD")]
    pub profit_usd: Usd,
    #[serde(rename = "marginPercent")]
    pub margin_percent: f64,
}

impl FeeBreakdown {
    fn at(input: &FinalDetailInput, rate: ExchangeRate, price: Usd) -> CalcResult<Self> {
        let selling_price_jpy = rate.to_jpy(price);
        let category_fee_jpy = category_fee(selling_price_jpy, input.category_fee_percent);
        let payment_fee_jpy = selling_price_jpy * input.payment_fee_percent.fraction();
        let conversion_fee_jpy = conversion_fee(price, input.exchange_fee_jpy_per_usd);

        let total_cost_jpy = actual_cost(input.cost_jpy, input.shipping_jpy, category_fee_jpy)
            + payment_fee_jpy
            + conversion_fee_jpy;
        let profit_jpy = gross_profit(selling_price_jpy, total_cost_jpy);
        let margin_percent = profit_margin(profit_jpy, selling_price_jpy);

        ensure_finite("totalCostJPY", total_cost_jpy)?;
        ensure_finite("profitJPY", profit_jpy)?;
        if !margin_percent.is_finite() {
            return Err(CalcError::NonFinite {
                quantity: "marginPercent".to_string(),
            });
        }

        Ok(FeeBreakdown {
            selling_price_usd: price,
            selling_price_jpy,
            cost_jpy: input.cost_jpy,
            shipping_jpy: input.shipping_jpy,
            category_fee_jpy,
            payment_fee_jpy,
            conversion_fee_jpy,
            total_cost_jpy,
            profit_jpy,
            profit_usd: rate.to_usd(profit_jpy),
            margin_percent,
        })
    }
}

/// Price that reaches the target margin, with its breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct RequiredPrice {
    #[serde(rename = "priceUSD")]
    pub price_usd: Usd,

    #[serde(rename = "priceJPY")]
    pub price_jpy: Jpy,

    /// Its margin equals the target.
    pub breakdown: FeeBreakdown,
}

/// Breakdown at the entered price and at the price that reaches the target.
///
/// `required` is `None` when fees plus the target margin leave nothing per
/// dollar; the breakdown at the entered price is still reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct FinalProfitDetail {
    #[serde(rename = "atSellingPrice")]
    pub at_selling_price: FeeBreakdown,

    pub required: Option<RequiredPrice>,

    #[serde(rename = "targetMarginPercent")]
    pub target_margin_percent: f64,
}

impl FinalProfitDetail {
    /// True when the entered price already meets the target margin.
    pub fn meets_target(&self) -> bool {
        self.at_selling_price.margin_percent >= self.target_margin_percent
    }
}

/// Computes the achieved margin at the entered price and the price required
/// for the target margin.
///
/// ## Errors
/// - `Validation` for a target margin outside `[0, 1)`, a negative selling
///   price, or a payment fee outside `[0, 100]`
/// - `InvalidExchangeRate` for a rate ≤ 0
/// - `NonFinite` when the breakdown at the entered price overflows
///
/// An unreachable target is not an error: `required` comes back `None`.
///
/// ## Example
/// ```rust
/// use resale_core::final_detail::{calculate_final_profit_detail_us, FinalDetailInput};
/// use resale_core::money::{Jpy, Usd};
/// use resale_core::Percent;
///
/// let detail = calculate_final_profit_detail_us(&FinalDetailInput {
///     cost_jpy: Jpy::new(3_000.0),
///     shipping_jpy: Jpy::new(1_200.0),
///     selling_price_usd: Usd::new(60.0),
///     rate_jpy_per_usd: 150.0,
///     category_fee_percent: Percent::new(10.0),
///     payment_fee_percent: Percent::new(1.35),
///     exchange_fee_jpy_per_usd: Jpy::new(3.3),
///     target_margin: 0.30,
/// })
/// .unwrap();
///
/// let required = detail.required.unwrap();
/// assert!((required.breakdown.margin_percent - 30.0).abs() < 1e-6);
/// assert!(detail.meets_target());
/// assert!(required.price_usd < Usd::new(60.0));
/// ```
pub fn calculate_final_profit_detail_us(input: &FinalDetailInput) -> CalcResult<FinalProfitDetail> {
    validate_target_margin(input.target_margin)?;
    validate_percent("payment fee percent", input.payment_fee_percent.value())?;
    validate_amount("selling price", input.selling_price_usd.dollars())?;
    let rate = ExchangeRate::new(input.rate_jpy_per_usd)?;

    let at_selling_price = FeeBreakdown::at(input, rate, input.selling_price_usd)?;

    let required = match required_price(input, rate) {
        Ok(required) => Some(required),
        Err(CalcError::FeesExceedRevenue { .. }) | Err(CalcError::NonFinite { .. }) => None,
        Err(e) => return Err(e),
    };

    Ok(FinalProfitDetail {
        at_selling_price,
        required,
        target_margin_percent: input.target_margin * 100.0,
    })
}

fn required_price(input: &FinalDetailInput, rate: ExchangeRate) -> CalcResult<RequiredPrice> {
    let withheld = Percent::new(
        input.category_fee_percent.value()
            + input.payment_fee_percent.value()
            + input.target_margin * 100.0,
    );
    let kept_per_usd = net_yen_per_usd(rate, withheld, input.exchange_fee_jpy_per_usd)?;

    let price_usd = Usd::new((input.cost_jpy + input.shipping_jpy).yen() / kept_per_usd);
    ensure_finite("requiredPriceUSD", price_usd)?;

    Ok(RequiredPrice {
        price_usd,
        price_jpy: rate.to_jpy(price_usd),
        breakdown: FeeBreakdown::at(input, rate, price_usd)?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
