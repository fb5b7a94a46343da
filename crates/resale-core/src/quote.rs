//! # Quote Composer
//!
//! Turns one snapshot of everything the user has typed into every figure the
//! pricing screen shows.
//!
//! ## Recompute, Never Patch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Any field changes                                                     │
//! │       │                                                                │
//! │       ▼                                                                │
//! │  QuoteInput (immutable snapshot, Option = not entered yet)             │
//! │       │                                                                │
//! │       ▼                                                                │
//! │  evaluate(input, table, policy)                                        │
//! │       ├── shipping      : Option<ShippingSelection>                    │
//! │       ├── break_even    : CalcResult<BreakEvenResult>                  │
//! │       ├── profit        : CalcResult<ProfitResult>                     │
//! │       ├── final_detail  : CalcResult<FinalProfitDetail>                │
//! │       └── price incl. US sales tax                                     │
//! │                                                                         │
//! │  Every surface comes from the same snapshot, so no figure can lag      │
//! │  behind another. A missing field is MissingInput, never a silent 0.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::break_even::{calc_break_even_usd_with, BreakEvenInput, BreakEvenResult, Surcharges};
use crate::error::{CalcError, CalcResult};
use crate::final_detail::{calculate_final_profit_detail_us, FinalDetailInput, FinalProfitDetail};
use crate::money::{ExchangeRate, Jpy, RateSnapshot, Usd};
use crate::pricing::{actual_cost, category_fee, conversion_fee, gross_profit, profit_margin};
use crate::shipping::select_cheapest;
use crate::types::{Dimensions, Percent, ShippingSelection, ShippingTable};
use crate::validation::{
    validate_amount, validate_package, validate_percent, validate_target_margin, ValidationResult,
};
use crate::{
    DEFAULT_DUTY_PERCENT, DEFAULT_EXCHANGE_FEE_JPY_PER_USD, DEFAULT_INSURANCE_LOADING_PERCENT,
    DEFAULT_PAYMENT_FEE_PERCENT, DEFAULT_TARGET_MARGIN, DEFAULT_US_SALES_TAX_PERCENT,
};

/// Method label for a shipping cost typed in by hand.
pub const MANUAL_SHIPPING_METHOD: &str = "manual";

// =============================================================================
// Inputs
// =============================================================================

/// How the shipping cost is determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "mode", rename_all = "camelCase")]
#[ts(export)]
pub enum ShippingInput {
    /// Look the cost up in the rate table.
    #[serde(rename_all = "camelCase")]
    Auto {
        weight_grams: Option<f64>,
        #[serde(default)]
        dimensions: Dimensions,
    },
    /// Use a cost the seller typed in.
    #[serde(rename_all = "camelCase")]
    Manual {
        #[serde(rename = "priceJPY")]
        price_jpy: Option<f64>,
    },
}

impl Default for ShippingInput {
    fn default() -> Self {
        ShippingInput::Auto {
            weight_grams: None,
            dimensions: Dimensions::default(),
        }
    }
}

/// Every user-entered field. `None` means the field is still empty.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteInput {
    #[serde(rename = "costJPY")]
    pub cost_jpy: Option<f64>,

    #[serde(rename = "sellingPriceUSD")]
    pub selling_price_usd: Option<f64>,

    /// Injected by the caller from the rate provider.
    pub rate: Option<RateSnapshot>,

    /// Resolved from the category-fee master by the caller.
    pub category_fee_percent: Option<Percent>,

    pub shipping: ShippingInput,
}

/// Business constants applied to every quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingPolicy {
    /// Yen lost per dollar converted.
    #[serde(rename = "exchangeFeeJPYPerUSD")]
    pub exchange_fee_jpy_per_usd: Jpy,

    pub payment_fee_percent: Percent,

    /// Fraction in `[0, 1)`.
    pub target_margin: f64,

    pub duty_percent: Percent,

    pub insurance_percent: Percent,

    /// US sales tax added on top of the listed price.
    pub sales_tax_percent: Percent,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            exchange_fee_jpy_per_usd: Jpy::new(DEFAULT_EXCHANGE_FEE_JPY_PER_USD),
            payment_fee_percent: Percent::new(DEFAULT_PAYMENT_FEE_PERCENT),
            target_margin: DEFAULT_TARGET_MARGIN,
            duty_percent: Percent::new(DEFAULT_DUTY_PERCENT),
            insurance_percent: Percent::new(DEFAULT_INSURANCE_LOADING_PERCENT),
            sales_tax_percent: Percent::new(DEFAULT_US_SALES_TAX_PERCENT),
        }
    }
}

impl PricingPolicy {
    /// Duty and insurance percentages for the break-even solver.
    pub fn surcharges(&self) -> Surcharges {
        Surcharges {
            duty_percent: self.duty_percent,
            insurance_percent: self.insurance_percent,
        }
    }

    /// Checks every field is in range.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_amount("exchange fee", self.exchange_fee_jpy_per_usd.yen())?;
        validate_percent("payment fee percent", self.payment_fee_percent.value())?;
        validate_target_margin(self.target_margin)?;
        validate_percent("duty percent", self.duty_percent.value())?;
        validate_percent("insurance percent", self.insurance_percent.value())?;
        validate_percent("sales tax percent", self.sales_tax_percent.value())
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// Profit at the entered selling price.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ProfitResult {
    #[serde(rename = "sellingPriceJPY")]
    pub selling_price_jpy: Jpy,
    #[serde(rename = "shippingJPY")]
    pub shipping_jpy: Jpy,
    #[serde(rename = "categoryFeeJPY")]
    pub category_fee_jpy: Jpy,
    #[serde(rename = "conversionFeeJPY")]
    pub conversion_fee_jpy: Jpy,
    /// Cost + shipping + category fee + conversion fee.
    #[serde(rename = "actualCostJPY")]
    pub actual_cost_jpy: Jpy,
    #[serde(rename = "grossProfitJPY")]
    pub gross_profit_jpy: Jpy,
    #[serde(rename = "grossProfitUSD")]
    pub gross_profit_usd: Usd,
    /// JPY profit over JPY selling price.
    #[serde(rename = "profitMarginPercent")]
    pub profit_margin_percent: f64,
    /// Shipping method name, or `"manual"`.
    pub method: String,
    pub rate: ExchangeRate,
}

/// Everything derived from one [`QuoteInput`].
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// `None` when no lookup ran (manual mode or no weight yet).
    pub shipping: Option<ShippingSelection>,
    pub break_even: CalcResult<BreakEvenResult>,
    pub profit: CalcResult<ProfitResult>,
    pub final_detail: CalcResult<FinalProfitDetail>,
    pub price_incl_sales_tax_usd: CalcResult<Usd>,
}

impl Quote {
    /// True when any figure is held back only because a field is empty.
    pub fn needs_input(&self) -> bool {
        [
            self.break_even.as_ref().err(),
            self.profit.as_ref().err(),
            self.final_detail.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .any(CalcError::is_missing_input)
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Inputs every calculation needs, once all fields are present.
struct Landed {
    cost: Jpy,
    shipping: Jpy,
    method: String,
    rate: ExchangeRate,
    category_fee: Percent,
}

/// Recomputes every figure from scratch.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use resale_core::money::{Jpy, RateSnapshot};
/// use resale_core::quote::{evaluate, PricingPolicy, QuoteInput, ShippingInput};
/// use resale_core::{Dimensions, Percent, ShippingRule, ShippingTable};
///
/// let table = ShippingTable::new(vec![ShippingRule {
///     method: "EMS".into(),
///     max_weight_grams: 1000.0,
///     max_dimensions: None,
///     price_jpy: Jpy::new(1_200.0),
/// }]);
///
/// let mut input = QuoteInput {
///     cost_jpy: Some(3_000.0),
///     selling_price_usd: Some(60.0),
///     rate: Some(RateSnapshot::new(150.0, Utc::now()).unwrap()),
///     category_fee_percent: Some(Percent::new(10.0)),
///     shipping: ShippingInput::Auto { weight_grams: Some(600.0), dimensions: Dimensions::default() },
/// };
///
/// let quote = evaluate(&input, &table, &PricingPolicy::default());
/// assert_eq!(quote.profit.unwrap().method, "EMS");
///
/// input.cost_jpy = None;
/// let quote = evaluate(&input, &table, &PricingPolicy::default());
/// assert!(quote.break_even.is_err());
/// assert!(quote.needs_input());
/// ```
pub fn evaluate(input: &QuoteInput, table: &ShippingTable, policy: &PricingPolicy) -> Quote {
    let shipping = match input.shipping {
        ShippingInput::Auto {
            weight_grams: Some(weight),
            dimensions,
        } if validate_package(weight, &dimensions).is_ok() => {
            select_cheapest(table, weight, &dimensions)
        }
        _ => None,
    };

    let landed = resolve(input, shipping.as_ref());
    let selling_price = required_amount(input.selling_price_usd, "selling price").map(Usd::new);

    let break_even = landed
        .as_ref()
        .map_err(CalcError::clone)
        .and_then(|landed| break_even_for(landed, policy));

    let profit = landed.as_ref().map_err(CalcError::clone).and_then(|landed| {
        let price = selling_price.clone()?;
        profit_for(landed, price, policy)
    });

    let final_detail = landed.as_ref().map_err(CalcError::clone).and_then(|landed| {
        let price = selling_price.clone()?;
        calculate_final_profit_detail_us(&FinalDetailInput {
            cost_jpy: landed.cost,
            shipping_jpy: landed.shipping,
            selling_price_usd: price,
            rate_jpy_per_usd: landed.rate.jpy_per_usd(),
            category_fee_percent: landed.category_fee,
            payment_fee_percent: policy.payment_fee_percent,
            exchange_fee_jpy_per_usd: policy.exchange_fee_jpy_per_usd,
            target_margin: policy.target_margin,
        })
    });

    let price_incl_sales_tax_usd = selling_price.map(|price| price_incl_sales_tax(price, policy));

    Quote {
        shipping,
        break_even,
        profit,
        final_detail,
        price_incl_sales_tax_usd,
    }
}

/// Listed price plus US sales tax, the amount the buyer actually pays.
pub fn price_incl_sales_tax(price: Usd, policy: &PricingPolicy) -> Usd {
    price * (1.0 + policy.sales_tax_percent.fraction())
}

fn required_amount(value: Option<f64>, field: &str) -> CalcResult<f64> {
    let value = value.ok_or_else(|| CalcError::missing(field))?;
    validate_amount(field, value)?;
    Ok(value)
}

fn resolve(input: &QuoteInput, selection: Option<&ShippingSelection>) -> CalcResult<Landed> {
    let cost = Jpy::new(required_amount(input.cost_jpy, "cost")?);

    let (shipping, method) = match input.shipping {
        ShippingInput::Manual { price_jpy } => (
            Jpy::new(required_amount(price_jpy, "shipping")?),
            MANUAL_SHIPPING_METHOD.to_string(),
        ),
        ShippingInput::Auto {
            weight_grams,
            dimensions,
        } => {
            let weight = weight_grams.ok_or_else(|| CalcError::missing("weight"))?;
            validate_package(weight, &dimensions)?;
            match selection {
                Some(ShippingSelection::Selected {
                    method, price_jpy, ..
                }) => (*price_jpy, method.clone()),
                Some(ShippingSelection::NoEligibleMethod) => {
                    return Err(CalcError::missing("shipping method"))
                }
                None => return Err(CalcError::missing("weight")),
            }
        }
    };

    let rate = input.rate.ok_or_else(|| CalcError::missing("exchange rate"))?.rate;
    let category_fee = input
        .category_fee_percent
        .ok_or_else(|| CalcError::missing("category fee"))?;

    Ok(Landed {
        cost,
        shipping,
        method,
        rate,
        category_fee,
    })
}

fn break_even_for(landed: &Landed, policy: &PricingPolicy) -> CalcResult<BreakEvenResult> {
    let input = BreakEvenInput {
        cost_jpy: landed.cost,
        shipping_jpy: landed.shipping,
        rate_jpy_per_usd: landed.rate.jpy_per_usd(),
        category_fee_percent: landed.category_fee,
        exchange_fee_jpy_per_usd: policy.exchange_fee_jpy_per_usd,
    };
    calc_break_even_usd_with(&input, &policy.surcharges())
}

fn profit_for(landed: &Landed, price: Usd, policy: &PricingPolicy) -> CalcResult<ProfitResult> {
    let selling_price_jpy = landed.rate.to_jpy(price);
    let category_fee_jpy = category_fee(selling_price_jpy, landed.category_fee);
    let conversion_fee_jpy = conversion_fee(price, policy.exchange_fee_jpy_per_usd);
    let actual_cost_jpy =
        actual_cost(landed.cost, landed.shipping, category_fee_jpy) + conversion_fee_jpy;

    let gross_profit_jpy = gross_profit(selling_price_jpy, actual_cost_jpy);
    let gross_profit_usd = gross_profit(price, landed.rate.to_usd(actual_cost_jpy));
    let profit_margin_percent = profit_margin(gross_profit_jpy, selling_price_jpy);

    if !profit_margin_percent.is_finite() || !gross_profit_jpy.yen().is_finite() {
        return Err(CalcError::NonFinite {
            quantity: "profit".to_string(),
        });
    }

    Ok(ProfitResult {
        selling_price_jpy,
        shipping_jpy: landed.shipping,
        category_fee_jpy,
        conversion_fee_jpy,
        actual_cost_jpy,
        gross_profit_jpy,
        gross_profit_usd,
        profit_margin_percent,
        method: landed.method.clone(),
        rate: landed.rate,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::ShippingRule;
    use chrono::{TimeZone, Utc};

    const TOLERANCE: f64 = 1e-6;

    fn table() -> ShippingTable {
        ShippingTable::new(vec![
            ShippingRule {
                method: "Airmail".to_string(),
                max_weight_grams: 500.0,
                max_dimensions: None,
                price_jpy: Jpy::new(700.0),
            },
            ShippingRule {
                method: "EMS".to_string(),
                max_weight_grams: 2000.0,
                max_dimensions: None,
                price_jpy: Jpy::new(1_200.0),
            },
        ])
    }

    fn snapshot() -> RateSnapshot {
        let at = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();
        RateSnapshot::new(150.0, at).unwrap()
    }

    fn complete_input() -> QuoteInput {
        QuoteInput {
            cost_jpy: Some(3_000.0),
            selling_price_usd: Some(60.0),
            rate: Some(snapshot()),
            category_fee_percent: Some(Percent::new(10.0)),
            shipping: ShippingInput::Auto {
                weight_grams: Some(600.0),
                dimensions: Dimensions::default(),
            },
        }
    }

    #[test]
    fn test_complete_input_produces_every_figure() {
        let quote = evaluate(&complete_input(), &table(), &PricingPolicy::default());

        assert_eq!(quote.shipping.as_ref().unwrap().method(), Some("EMS"));
        let profit = quote.profit.as_ref().unwrap();
        assert_eq!(profit.shipping_jpy, Jpy::new(1_200.0));
        assert_eq!(profit.selling_price_jpy, Jpy::new(9_000.0));
        // 3000 + 1200 + 900 + 198
        assert!((profit.actual_cost_jpy.yen() - 5_298.0).abs() < TOLERANCE);
        assert!((profit.gross_profit_jpy.yen() - 3_702.0).abs() < TOLERANCE);
        assert!((profit.gross_profit_usd.dollars() - 3_702.0 / 150.0).abs() < TOLERANCE);
        assert!((profit.profit_margin_percent - 3_702.0 / 9_000.0 * 100.0).abs() < TOLERANCE);

        assert!(quote.break_even.is_ok());
        assert!(quote.final_detail.is_ok());
        let taxed = quote.price_incl_sales_tax_usd.as_ref().unwrap();
        assert!((taxed.dollars() - 60.0 * 1.0671).abs() < TOLERANCE);
        assert!(!quote.needs_input());
    }

    #[test]
    fn test_margin_at_break_even_price_is_zero() {
        let first = evaluate(&complete_input(), &table(), &PricingPolicy::default());
        let break_even = first.break_even.unwrap().break_even_usd;

        let at_break_even = QuoteInput {
            selling_price_usd: Some(break_even.dollars()),
            ..complete_input()
        };
        let quote = evaluate(&at_break_even, &table(), &PricingPolicy::default());
        assert!(quote.profit.unwrap().profit_margin_percent.abs() < TOLERANCE);
    }

    #[test]
    fn test_missing_fields_are_never_defaulted_to_zero() {
        let cases: [(QuoteInput, &str); 4] = [
            (QuoteInput { cost_jpy: None, ..complete_input() }, "cost"),
            (QuoteInput { rate: None, ..complete_input() }, "exchange rate"),
            (
                QuoteInput {
                    category_fee_percent: None,
                    ..complete_input()
                },
                "category fee",
            ),
            (
                QuoteInput {
                    shipping: ShippingInput::default(),
                    ..complete_input()
                },
                "weight",
            ),
        ];

        for (input, field) in cases {
            let quote = evaluate(&input, &table(), &PricingPolicy::default());
            assert_eq!(quote.break_even, Err(CalcError::missing(field)));
            assert_eq!(quote.profit, Err(CalcError::missing(field)));
            assert!(quote.final_detail.is_err());
            assert!(quote.needs_input());
        }
    }

    #[test]
    fn test_missing_selling_price_still_gives_break_even() {
        let input = QuoteInput {
            selling_price_usd: None,
            ..complete_input()
        };
        let quote = evaluate(&input, &table(), &PricingPolicy::default());
        assert!(quote.break_even.is_ok());
        assert_eq!(quote.profit, Err(CalcError::missing("selling price")));
        assert_eq!(quote.price_incl_sales_tax_usd, Err(CalcError::missing("selling price")));
    }

    #[test]
    fn test_manual_shipping_skips_lookup() {
        let input = QuoteInput {
            shipping: ShippingInput::Manual {
                price_jpy: Some(1_500.0),
            },
            ..complete_input()
        };
        let quote = evaluate(&input, &table(), &PricingPolicy::default());
        assert_eq!(quote.shipping, None);

        let profit = quote.profit.unwrap();
        assert_eq!(profit.method, MANUAL_SHIPPING_METHOD);
        assert_eq!(profit.shipping_jpy, Jpy::new(1_500.0));

        let empty = QuoteInput {
            shipping: ShippingInput::Manual { price_jpy: None },
            ..complete_input()
        };
        let quote = evaluate(&empty, &table(), &PricingPolicy::default());
        assert_eq!(quote.break_even, Err(CalcError::missing("shipping")));
    }

    #[test]
    fn test_no_eligible_method_suppresses_figures() {
        let input = QuoteInput {
            shipping: ShippingInput::Auto {
                weight_grams: Some(5_000.0),
                dimensions: Dimensions::default(),
            },
            ..complete_input()
        };
        let quote = evaluate(&input, &table(), &PricingPolicy::default());
        assert_eq!(quote.shipping, Some(ShippingSelection::NoEligibleMethod));
        assert!(quote.break_even.is_err());
        assert!(quote.profit.is_err());
    }

    #[test]
    fn test_negative_input_is_rejected() {
        let input = QuoteInput {
            cost_jpy: Some(-1.0),
            ..complete_input()
        };
        let quote = evaluate(&input, &table(), &PricingPolicy::default());
        assert!(matches!(
            quote.break_even,
            Err(CalcError::Validation(ValidationError::MustNotBeNegative { .. }))
        ));
        assert!(!quote.needs_input());
    }

    #[test]
    fn test_invalid_package_is_rejected_not_missing() {
        let negative_weight = QuoteInput {
            shipping: ShippingInput::Auto {
                weight_grams: Some(-5.0),
                dimensions: Dimensions::default(),
            },
            ..complete_input()
        };
        let quote = evaluate(&negative_weight, &table(), &PricingPolicy::default());
        assert_eq!(quote.shipping, None);
        assert!(matches!(
            quote.break_even,
            Err(CalcError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(!quote.needs_input());

        let negative_axis = QuoteInput {
            shipping: ShippingInput::Auto {
                weight_grams: Some(600.0),
                dimensions: Dimensions::new(-3.0, 0.0, 0.0),
            },
            ..complete_input()
        };
        let quote = evaluate(&negative_axis, &table(), &PricingPolicy::default());
        assert_eq!(quote.shipping, None);
        assert!(matches!(
            quote.profit,
            Err(CalcError::Validation(ValidationError::MustNotBeNegative { .. }))
        ));
    }

    #[test]
    fn test_policy_defaults_and_validation() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.exchange_fee_jpy_per_usd, Jpy::new(3.3));
        assert_eq!(policy.payment_fee_percent, Percent::new(1.35));
        assert_eq!(policy.target_margin, 0.30);
        assert!(policy.validate().is_ok());

        let bad = PricingPolicy {
            target_margin: 1.2,
            ..policy
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_shipping_input_json_shape() {
        let auto: ShippingInput =
            serde_json::from_str(r#"{"mode": "auto", "weightGrams": 600}"#).unwrap();
        assert_eq!(
            auto,
            ShippingInput::Auto {
                weight_grams: Some(600.0),
                dimensions: Dimensions::default(),
            }
        );

        let manual: ShippingInput =
            serde_json::from_str(r#"{"mode": "manual", "priceJPY": 1500}"#).unwrap();
        assert_eq!(manual, ShippingInput::Manual { price_jpy: Some(1_500.0) });
    }
}
