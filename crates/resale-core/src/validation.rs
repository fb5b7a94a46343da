//! # Validation Module
//!
//! Checks for master data and user-entered numbers.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end / CLI                                              │
//! │  ├── Empty fields stay unset (never coerced to 0)                      │
//! │  └── Negative inputs rejected                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Master data load (resale-data)                               │
//! │  └── THIS MODULE: rate table and category-fee checks                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Calculations                                                 │
//! │  └── Non-finite outputs reported as "not computable"                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use resale_core::validation::{validate_category_fee_percent, validate_exchange_rate};
//!
//! assert!(validate_category_fee_percent(12.9).is_ok());
//! assert!(validate_category_fee_percent(120.0).is_err());
//! assert!(validate_exchange_rate(0.0).is_err());
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{CategoryFeeTable, Dimensions, ShippingRule, ShippingTable};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

fn require_finite(field: &str, value: f64) -> ValidationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite {
            field: field.to_string(),
        })
    }
}

fn require_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> ValidationResult<()> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    require_finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
            value,
        });
    }
    Ok(())
}

/// A percentage must be a plain number in `[0, 100]`.
pub fn validate_category_fee_percent(percent: f64) -> ValidationResult<()> {
    require_range("category fee percent", percent, 0.0, 100.0)
}

/// Any other fee percentage (payment, duty, insurance, sales tax).
pub fn validate_percent(field: &str, percent: f64) -> ValidationResult<()> {
    require_range(field, percent, 0.0, 100.0)
}

/// JPY per USD must be finite and strictly positive.
pub fn validate_exchange_rate(rate: f64) -> ValidationResult<()> {
    require_positive("exchange rate", rate)
}

/// A target margin is a fraction in `[0, 1)`; `1` would need an infinite price.
pub fn validate_target_margin(margin: f64) -> ValidationResult<()> {
    require_finite("target margin", margin)?;
    if !(0.0..1.0).contains(&margin) {
        return Err(ValidationError::OutOfRange {
            field: "target margin".to_string(),
            min: 0.0,
            max: 1.0,
            value: margin,
        });
    }
    Ok(())
}

/// Money amounts typed by the user (cost, manual shipping, selling price).
pub fn validate_amount(field: &str, amount: f64) -> ValidationResult<()> {
    require_non_negative(field, amount)
}

/// Package weight must be positive before a shipping lookup runs.
pub fn validate_weight_grams(weight: f64) -> ValidationResult<()> {
    require_positive("weight", weight)
}

/// Weight and size of the package to ship. A zero axis means "not measured".
///
/// ```rust
/// use resale_core::validation::validate_package;
/// use resale_core::Dimensions;
///
/// assert!(validate_package(600.0, &Dimensions::new(30.0, 0.0, 10.0)).is_ok());
/// assert!(validate_package(-5.0, &Dimensions::default()).is_err());
/// assert!(validate_package(600.0, &Dimensions::new(-3.0, 0.0, 0.0)).is_err());
/// ```
pub fn validate_package(weight_grams: f64, dims: &Dimensions) -> ValidationResult<()> {
    validate_weight_grams(weight_grams)?;
    validate_amount("length", dims.length)?;
    validate_amount("width", dims.width)?;
    validate_amount("height", dims.height)
}

// =============================================================================
// Master Data Validators
// =============================================================================

fn validate_dimensions(field: &str, dims: &Dimensions) -> ValidationResult<()> {
    require_non_negative(field, dims.length)?;
    require_non_negative(field, dims.width)?;
    require_non_negative(field, dims.height)
}

/// Validates a single shipping rule.
///
/// ## Rules
/// - Method name must not be empty
/// - Weight bound must be positive
/// - Price and any dimension bounds must be non-negative
pub fn validate_shipping_rule(rule: &ShippingRule) -> ValidationResult<()> {
    if rule.method.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "method".to_string(),
        });
    }

    require_positive("maxWeightGrams", rule.max_weight_grams)?;
    require_non_negative("priceJPY", rule.price_jpy.yen())?;

    if let Some(dims) = &rule.max_dimensions {
        validate_dimensions("maxDimensions", dims)?;
    }

    Ok(())
}

/// Validates every rule in table order, reporting the first failure.
pub fn validate_shipping_table(table: &ShippingTable) -> ValidationResult<()> {
    table.rules().iter().try_for_each(validate_shipping_rule)
}

/// Validates the category-fee master list.
///
/// ## Rules
/// - Labels must be non-empty and unique
/// - Percent must be within `[0, 100]`
pub fn validate_category_fees(table: &CategoryFeeTable) -> ValidationResult<()> {
    let mut seen = HashSet::new();

    for fee in table.fees() {
        let label = fee.label.trim();
        if label.is_empty() {
            return Err(ValidationError::Required {
                field: "label".to_string(),
            });
        }
        if !seen.insert(label) {
            return Err(ValidationError::Duplicate {
                field: "label".to_string(),
                value: label.to_string(),
            });
        }
        validate_category_fee_percent(fee.percent.value())?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Jpy;
    use crate::types::{CategoryFee, Percent};

    fn rule(method: &str, weight: f64, price: f64) -> ShippingRule {
        ShippingRule {
            method: method.to_string(),
            max_weight_grams: weight,
            max_dimensions: None,
            price_jpy: Jpy::new(price),
        }
    }

    fn fee(label: &str, percent: f64) -> CategoryFee {
        CategoryFee {
            label: label.to_string(),
            percent: Percent::new(percent),
            categories: Vec::new(),
        }
    }

    #[test]
    fn test_validate_category_fee_percent() {
        assert!(validate_category_fee_percent(0.0).is_ok());
        assert!(validate_category_fee_percent(100.0).is_ok());
        assert!(validate_category_fee_percent(-0.1).is_err());
        assert!(validate_category_fee_percent(100.1).is_err());
        assert!(validate_category_fee_percent(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_target_margin() {
        assert!(validate_target_margin(0.0).is_ok());
        assert!(validate_target_margin(0.3).is_ok());
        assert!(validate_target_margin(1.0).is_err());
        assert!(validate_target_margin(-0.1).is_err());
    }

    #[test]
    fn test_validate_exchange_rate_and_amounts() {
        assert!(validate_exchange_rate(150.0).is_ok());
        assert!(validate_exchange_rate(0.0).is_err());
        assert!(validate_amount("cost", 0.0).is_ok());
        assert!(validate_amount("cost", -1.0).is_err());
        assert!(validate_weight_grams(0.0).is_err());
        assert!(validate_weight_grams(1.0).is_ok());
    }

    #[test]
    fn test_validate_shipping_table() {
        let good = ShippingTable::new(vec![rule("Airmail", 500.0, 700.0)]);
        assert!(validate_shipping_table(&good).is_ok());

        let unnamed = ShippingTable::new(vec![rule(" ", 500.0, 700.0)]);
        assert!(matches!(
            validate_shipping_table(&unnamed),
            Err(ValidationError::Required { .. })
        ));

        let zero_weight = ShippingTable::new(vec![rule("Airmail", 0.0, 700.0)]);
        assert!(matches!(
            validate_shipping_table(&zero_weight),
            Err(ValidationError::MustBePositive { .. })
        ));

        let mut bad_dims = rule("EMS", 1000.0, 900.0);
        bad_dims.max_dimensions = Some(Dimensions::new(10.0, -1.0, 10.0));
        assert!(validate_shipping_table(&ShippingTable::new(vec![bad_dims])).is_err());
    }

    #[test]
    fn test_validate_category_fees() {
        let good = CategoryFeeTable::new(vec![fee("Books", 15.0), fee("Toys", 13.25)]);
        assert!(validate_category_fees(&good).is_ok());

        let duplicate = CategoryFeeTable::new(vec![fee("Books", 15.0), fee("Books", 10.0)]);
        assert!(matches!(
            validate_category_fees(&duplicate),
            Err(ValidationError::Duplicate { .. })
        ));

        let out_of_range = CategoryFeeTable::new(vec![fee("Books", 150.0)]);
        assert!(matches!(
            validate_category_fees(&out_of_range),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
