//! # Shipping Selector
//!
//! Picks the cheapest shipping rule that accepts a package.
//!
//! ## Selection Rules
//! ```text
//! weight = 600 g, dims = 30×20×10
//!
//!   #0 Airmail  ≤ 500 g              ¥700   ✗ too heavy
//!   #1 EMS      ≤ 1000 g  150³ cm    ¥900   ✓
//!   #2 eParcel  ≤ 1000 g             ¥900   ✓ (same price, later in table)
//!   #3 Courier  ≤ 2000 g  20³ cm     ¥800   ✗ too long
//!
//!   → Selected { method: "EMS", price: ¥900, rule_index: 1 }
//! ```
//!
//! - A rule is eligible when its weight bound and every bound of its
//!   optional size limit are ≥ the package (unmeasured axes are ignored).
//! - Among eligible rules the lowest price wins; ties go to the rule that
//!   appears first in the table.
//! - A non-positive or non-finite weight performs no lookup at all.

use crate::types::{Dimensions, ShippingRule, ShippingSelection, ShippingTable};

/// Returns the cheapest eligible rule for a package.
///
/// - `None`: the weight is not a positive finite number, so no lookup ran.
/// - `Some(NoEligibleMethod)`: no rule accepts the package ("unknown").
/// - `Some(Selected { .. })`: the chosen rule, traceable via `rule_index`.
///
/// ## Example
/// ```rust
/// use resale_core::money::Jpy;
/// use resale_core::shipping::select_cheapest;
/// use resale_core::{Dimensions, ShippingRule, ShippingSelection, ShippingTable};
///
/// let table = ShippingTable::new(vec![
///     ShippingRule { method: "Small".into(), max_weight_grams: 500.0, max_dimensions: None, price_jpy: Jpy::new(700.0) },
///     ShippingRule { method: "Medium".into(), max_weight_grams: 1000.0, max_dimensions: None, price_jpy: Jpy::new(900.0) },
/// ]);
///
/// let selection = select_cheapest(&table, 600.0, &Dimensions::default()).unwrap();
/// assert_eq!(selection.method(), Some("Medium"));
/// assert_eq!(selection.price_jpy(), Some(Jpy::new(900.0)));
///
/// assert_eq!(select_cheapest(&table, 0.0, &Dimensions::default()), None);
/// ```
pub fn select_cheapest(
    table: &ShippingTable,
    weight_grams: f64,
    dimensions: &Dimensions,
) -> Option<ShippingSelection> {
    if !weight_grams.is_finite() || weight_grams <= 0.0 {
        return None;
    }

    // Only a strictly cheaper rule replaces the current best, so ties keep the earliest.
    let mut best: Option<(usize, &ShippingRule)> = None;
    for (index, rule) in eligible(table, weight_grams, *dimensions) {
        match best {
            Some((_, current)) if rule.price_jpy >= current.price_jpy => {}
            _ => best = Some((index, rule)),
        }
    }

    Some(match best {
        Some((rule_index, rule)) => ShippingSelection::Selected {
            method: rule.method.clone(),
            price_jpy: rule.price_jpy,
            rule_index,
        },
        None => ShippingSelection::NoEligibleMethod,
    })
}

/// All rules that accept the package, in table order.
///
/// Returns an empty list for a non-positive or non-finite weight.
pub fn eligible_rules<'a>(
    table: &'a ShippingTable,
    weight_grams: f64,
    dimensions: &Dimensions,
) -> Vec<&'a ShippingRule> {
    if !weight_grams.is_finite() || weight_grams <= 0.0 {
        return Vec::new();
    }
    eligible(table, weight_grams, *dimensions)
        .map(|(_, rule)| rule)
        .collect()
}

fn eligible(
    table: &ShippingTable,
    weight_grams: f64,
    dimensions: Dimensions,
) -> impl Iterator<Item = (usize, &ShippingRule)> {
    table
        .rules()
        .iter()
        .enumerate()
        .filter(move |(_, rule)| rule.accepts(weight_grams, &dimensions))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Jpy;

    fn rule(method: &str, weight: f64, dims: Option<Dimensions>, price: f64) -> ShippingRule {
        ShippingRule {
            method: method.to_string(),
            max_weight_grams: weight,
            max_dimensions: dims,
            price_jpy: Jpy::new(price),
        }
    }

    fn sample_table() -> ShippingTable {
        ShippingTable::new(vec![
            rule("Airmail", 500.0, None, 700.0),
            rule("EMS", 1000.0, Some(Dimensions::new(150.0, 150.0, 150.0)), 900.0),
            rule("eParcel", 1000.0, None, 900.0),
            rule("Courier", 2000.0, Some(Dimensions::new(20.0, 20.0, 20.0)), 800.0),
            rule("Freight", 30000.0, None, 5000.0),
        ])
    }

    #[test]
    fn test_heavier_package_skips_lighter_rule() {
        let table = ShippingTable::new(vec![
            rule("Up to 500g", 500.0, None, 700.0),
            rule("Up to 1000g", 1000.0, None, 900.0),
        ]);
        let selection = select_cheapest(&table, 600.0, &Dimensions::default()).unwrap();
        assert_eq!(
            selection,
            ShippingSelection::Selected {
                method: "Up to 1000g".to_string(),
                price_jpy: Jpy::new(900.0),
                rule_index: 1,
            }
        );
    }

    #[test]
    fn test_weight_bound_is_inclusive() {
        let table = sample_table();
        let selection = select_cheapest(&table, 500.0, &Dimensions::default()).unwrap();
        assert_eq!(selection.method(), Some("Airmail"));
    }

    #[test]
    fn test_tie_goes_to_first_rule_in_table_order() {
        let table = sample_table();
        let selection = select_cheapest(&table, 600.0, &Dimensions::new(30.0, 20.0, 10.0)).unwrap();
        // Courier (800) rejects the 30 cm length; EMS and eParcel tie at 900.
        assert_eq!(selection.method(), Some("EMS"));

        let reversed = ShippingTable::new(vec![
            rule("eParcel", 1000.0, None, 900.0),
            rule("EMS", 1000.0, None, 900.0),
        ]);
        let selection = select_cheapest(&reversed, 600.0, &Dimensions::default()).unwrap();
        assert_eq!(selection.method(), Some("eParcel"));
    }

    #[test]
    fn test_unmeasured_package_is_not_constrained_by_size() {
        let table = sample_table();
        let selection = select_cheapest(&table, 600.0, &Dimensions::default()).unwrap();
        assert_eq!(selection.method(), Some("Courier"));
        assert_eq!(selection.price_jpy(), Some(Jpy::new(800.0)));
    }

    #[test]
    fn test_no_eligible_rule_is_distinct_outcome() {
        let table = sample_table();
        let selection = select_cheapest(&table, 50_000.0, &Dimensions::default());
        assert_eq!(selection, Some(ShippingSelection::NoEligibleMethod));

        let empty = ShippingTable::default();
        assert_eq!(
            select_cheapest(&empty, 100.0, &Dimensions::default()),
            Some(ShippingSelection::NoEligibleMethod)
        );
    }

    #[test]
    fn test_invalid_weight_performs_no_selection() {
        let table = sample_table();
        for weight in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert_eq!(select_cheapest(&table, weight, &Dimensions::default()), None);
            assert!(eligible_rules(&table, weight, &Dimensions::default()).is_empty());
        }
    }

    /// Every selection is eligible, traceable to its rule, and no eligible
    /// rule is strictly cheaper.
    #[test]
    fn test_selection_is_eligible_and_minimal() {
        let table = sample_table();
        let weights = [1.0, 250.0, 500.0, 501.0, 999.0, 1000.0, 1500.0, 2000.0, 2500.0, 30000.0];
        let sizes = [
            Dimensions::default(),
            Dimensions::new(10.0, 10.0, 10.0),
            Dimensions::new(20.0, 0.0, 0.0),
            Dimensions::new(21.0, 5.0, 5.0),
            Dimensions::new(150.0, 150.0, 150.0),
            Dimensions::new(151.0, 1.0, 1.0),
        ];

        for weight in weights {
            for dims in &sizes {
                let selection = select_cheapest(&table, weight, dims).unwrap();
                let eligible = eligible_rules(&table, weight, dims);

                match selection {
                    ShippingSelection::Selected {
                        method,
                        price_jpy,
                        rule_index,
                    } => {
                        let chosen = table.get(rule_index).unwrap();
                        assert_eq!(chosen.method, method);
                        assert_eq!(chosen.price_jpy, price_jpy);
                        assert!(chosen.accepts(weight, dims));
                        assert!(eligible.iter().all(|r| r.price_jpy >= price_jpy));
                    }
                    ShippingSelection::NoEligibleMethod => assert!(eligible.is_empty()),
                }
            }
        }
    }

    #[test]
    fn test_repeated_selection_is_identical() {
        let table = sample_table();
        let dims = Dimensions::new(30.0, 20.0, 10.0);
        assert_eq!(
            select_cheapest(&table, 750.0, &dims),
            select_cheapest(&table, 750.0, &dims)
        );
    }
}
