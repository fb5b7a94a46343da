//! # Domain Types
//!
//! Value objects shared by the shipping selector and the profit calculators.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ShippingRule   │   │   Dimensions    │   │  CategoryFee    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  method         │   │  length (cm)    │   │  label          │       │
//! │  │  maxWeightGrams │   │  width  (cm)    │   │  percent        │       │
//! │  │  maxDimensions? │   │  height (cm)    │   │  categories[]   │       │
//! │  │  priceJPY       │   │  0 = unmeasured │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐                          │
//! │  │  ShippingTable  │   │  ShippingSelection  │                          │
//! │  │  ordered rules  │   │  Selected | NoEligi │                          │
//! │  └─────────────────┘   └─────────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these carry identity beyond their fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Jpy;

// =============================================================================
// Percent
// =============================================================================

/// A percentage stored as a plain 0–100 number (`10.0` = 10 %).
///
/// Only calculation functions turn it into a fraction; callers never divide
/// by 100 themselves.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Percent(f64);

impl Percent {
    /// 0 %.
    pub const ZERO: Percent = Percent(0.0);

    /// Wraps a 0–100 value. Range checks live in [`crate::validation`].
    #[inline]
    pub const fn new(percent: f64) -> Self {
        Percent(percent)
    }

    /// The plain 0–100 number.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    #[inline]
    pub(crate) fn fraction(&self) -> f64 {
        self.0 / 100.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// =============================================================================
// Dimensions
// =============================================================================

/// Package size in centimetres. An axis of `0` means "not measured" and
/// never disqualifies a shipping rule.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub const fn new(length: f64, width: f64, height: f64) -> Self {
        Dimensions {
            length,
            width,
            height,
        }
    }

    /// True when every measured axis is within `bound`.
    ///
    /// ```rust
    /// use resale_core::Dimensions;
    ///
    /// let limit = Dimensions::new(60.0, 40.0, 30.0);
    /// assert!(Dimensions::new(50.0, 0.0, 10.0).fits_within(&limit));
    /// assert!(!Dimensions::new(61.0, 10.0, 10.0).fits_within(&limit));
    /// ```
    pub fn fits_within(&self, bound: &Dimensions) -> bool {
        fn axis_fits(supplied: f64, limit: f64) -> bool {
            supplied == 0.0 || limit >= supplied
        }

        axis_fits(self.length, bound.length)
            && axis_fits(self.width, bound.width)
            && axis_fits(self.height, bound.height)
    }

    /// Parses `"LxWxH"` (also accepts `*` or `,` as separators).
    ///
    /// ```rust
    /// use resale_core::Dimensions;
    ///
    /// let dims = Dimensions::parse("30x20x10").unwrap();
    /// assert_eq!(dims, Dimensions::new(30.0, 20.0, 10.0));
    /// assert!(Dimensions::parse("30x20").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "dimensions".to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = raw
            .split(|c: char| c == 'x' || c == 'X' || c == '*' || c == ',')
            .map(str::trim)
            .collect();
        if parts.len() != 3 {
            return Err(invalid("expected LxWxH"));
        }

        let mut axes = [0.0_f64; 3];
        for (slot, part) in axes.iter_mut().zip(&parts) {
            let value: f64 = part.parse().map_err(|_| invalid("axis is not a number"))?;
            if !value.is_finite() || value < 0.0 {
                return Err(invalid("axis must be a non-negative number"));
            }
            *slot = value;
        }

        Ok(Dimensions::new(axes[0], axes[1], axes[2]))
    }
}

// =============================================================================
// Shipping Rules
// =============================================================================

/// One row of a carrier rate table.
///
/// JSON shape:
/// ```json
/// { "method": "EMS", "maxWeightGrams": 500, "maxDimensions": { "length": 150, "width": 150, "height": 150 }, "priceJPY": 1450 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShippingRule {
    /// Carrier / service name shown to the user.
    pub method: String,

    /// Upper weight limit in grams (inclusive).
    pub max_weight_grams: f64,

    /// Optional size limits in cm (each inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub max_dimensions: Option<Dimensions>,

    /// Price in yen.
    #[serde(rename = "priceJPY")]
    pub price_jpy: Jpy,
}

impl ShippingRule {
    /// True when a package of `weight_grams` and `dimensions` may use this rule.
    pub fn accepts(&self, weight_grams: f64, dimensions: &Dimensions) -> bool {
        if self.max_weight_grams < weight_grams {
            return false;
        }

        match &self.max_dimensions {
            Some(bound) => dimensions.fits_within(bound),
            None => true,
        }
    }
}

/// One weight step inside a grouped rate table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateStep {
    max_weight_grams: f64,
    #[serde(rename = "priceJPY")]
    price_jpy: Jpy,
}

/// A carrier service with a shared size limit and a list of weight steps.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShippingGroup {
    method: String,
    #[serde(default)]
    max_dimensions: Option<Dimensions>,
    rates: Vec<RateStep>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ShippingTableDocument {
    Flat(Vec<ShippingRule>),
    Grouped(Vec<ShippingGroup>),
}

/// Ordered, read-only list of shipping rules.
///
/// Order is significant: when two eligible rules cost the same, the one that
/// appears first wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShippingTable {
    rules: Vec<ShippingRule>,
}

impl ShippingTable {
    pub fn new(rules: Vec<ShippingRule>) -> Self {
        ShippingTable { rules }
    }

    /// Parses a flat (`[rule, ...]`) or grouped
    /// (`[{ method, maxDimensions?, rates: [...] }, ...]`) JSON document.
    /// Grouped tables are flattened in document order.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let document: ShippingTableDocument = serde_json::from_str(json)?;
        Ok(match document {
            ShippingTableDocument::Flat(rules) => ShippingTable::new(rules),
            ShippingTableDocument::Grouped(groups) => ShippingTable::from_groups(groups),
        })
    }

    fn from_groups(groups: Vec<ShippingGroup>) -> Self {
        let rules = groups
            .into_iter()
            .flat_map(|group| {
                let ShippingGroup {
                    method,
                    max_dimensions,
                    rates,
                } = group;
                rates.into_iter().map(move |step| ShippingRule {
                    method: method.clone(),
                    max_weight_grams: step.max_weight_grams,
                    max_dimensions,
                    price_jpy: step.price_jpy,
                })
            })
            .collect();
        ShippingTable { rules }
    }

    pub fn rules(&self) -> &[ShippingRule] {
        &self.rules
    }

    pub fn get(&self, index: usize) -> Option<&ShippingRule> {
        self.rules.get(index)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Outcome of a shipping lookup that was actually performed.
///
/// "Lookup not performed" (no weight yet) is modelled by the caller as
/// `None`, so it never collides with [`ShippingSelection::NoEligibleMethod`].
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum ShippingSelection {
    /// Cheapest eligible rule.
    Selected {
        method: String,
        #[serde(rename = "priceJPY")]
        price_jpy: Jpy,
        /// Position of the chosen rule in its table.
        #[serde(rename = "ruleIndex")]
        rule_index: usize,
    },
    /// No rule accepts the package; shown as "unknown".
    NoEligibleMethod,
}

impl ShippingSelection {
    pub fn method(&self) -> Option<&str> {
        match self {
            ShippingSelection::Selected { method, .. } => Some(method),
            ShippingSelection::NoEligibleMethod => None,
        }
    }

    pub fn price_jpy(&self) -> Option<Jpy> {
        match self {
            ShippingSelection::Selected { price_jpy, .. } => Some(*price_jpy),
            ShippingSelection::NoEligibleMethod => None,
        }
    }
}

// =============================================================================
// Category Fees
// =============================================================================

/// Marketplace fee for a family of product categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryFee {
    pub label: String,

    /// Fee on the selling price, 0–100. Older master files call it `value`.
    #[serde(alias = "value")]
    pub percent: Percent,

    #[serde(default)]
    pub categories: Vec<String>,
}

/// The category-fee master list, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFeeTable {
    fees: Vec<CategoryFee>,
}

impl CategoryFeeTable {
    pub fn new(fees: Vec<CategoryFee>) -> Self {
        CategoryFeeTable { fees }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(CategoryFeeTable::new(serde_json::from_str(json)?))
    }

    pub fn fees(&self) -> &[CategoryFee] {
        &self.fees
    }

    pub fn len(&self) -> usize {
        self.fees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }

    /// Exact label match.
    pub fn find_by_label(&self, label: &str) -> Option<&CategoryFee> {
        self.fees.iter().find(|fee| fee.label == label)
    }

    /// First entry whose category list names `category` (case-insensitive).
    pub fn for_category(&self, category: &str) -> Option<&CategoryFee> {
        self.fees.iter().find(|fee| {
            fee.categories
                .iter()
                .any(|name| name.eq_ignore_ascii_case(category))
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
