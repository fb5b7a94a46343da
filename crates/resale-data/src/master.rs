//! # Master Data Loading
//!
//! Reads the shipping rate table and the category-fee list from JSON,
//! validates them, and hands them to the engine as read-only tables.
//!
//! ## Load Flow
//! ```text
//! data/shipping.json ──► ShippingTable::from_json ──► validate_shipping_table ─┐
//!                                                                               ├──► MasterData
//! data/categoryFees.json ──► CategoryFeeTable::from_json ──► validate_category_fees ┘
//! ```
//!
//! Master data is loaded once at startup and never mutated afterwards.

use std::path::Path;
use tracing::{debug, info};

use resale_core::validation::{validate_category_fees, validate_shipping_table};
use resale_core::{CategoryFee, CategoryFeeTable, ShippingTable};

use crate::config::DataSettings;
use crate::error::{DataError, DataResult};

/// Both master tables, loaded and validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterData {
    pub shipping: ShippingTable,
    pub category_fees: CategoryFeeTable,
}

impl MasterData {
    /// Loads both files named by the `[data]` config section.
    pub fn load(settings: &DataSettings) -> DataResult<Self> {
        let shipping = load_shipping_table(&settings.shipping_path())?;
        let category_fees = load_category_fees(&settings.category_fee_path())?;
        Ok(MasterData {
            shipping,
            category_fees,
        })
    }

    /// Resolves a user's category choice to a fee entry.
    ///
    /// Tries an exact label first, then the per-entry category lists
    /// (case-insensitive).
    pub fn category_fee(&self, choice: &str) -> Option<&CategoryFee> {
        self.category_fees
            .find_by_label(choice)
            .or_else(|| self.category_fees.for_category(choice))
    }
}

/// Reads and validates a shipping rate table (flat or grouped JSON).
pub fn load_shipping_table(path: &Path) -> DataResult<ShippingTable> {
    let json = read(path)?;
    let table = ShippingTable::from_json(&json).map_err(|e| DataError::json(path, e))?;
    validate_shipping_table(&table).map_err(|e| DataError::validation(path, e))?;

    info!(?path, rules = table.len(), "Loaded shipping rate table");
    Ok(table)
}

/// Reads and validates the category-fee master list.
pub fn load_category_fees(path: &Path) -> DataResult<CategoryFeeTable> {
    let json = read(path)?;
    let table = CategoryFeeTable::from_json(&json).map_err(|e| DataError::json(path, e))?;
    validate_category_fees(&table).map_err(|e| DataError::validation(path, e))?;

    info!(?path, entries = table.len(), "Loaded category fees");
    Ok(table)
}

fn read(path: &Path) -> DataResult<String> {
    debug!(?path, "Reading master data file");
    std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use resale_core::{Jpy, Percent};
    use std::path::PathBuf;

    const SHIPPING: &str = r#"[
        {"method": "Airmail", "rates": [
            {"maxWeightGrams": 500, "priceJPY": 700},
            {"maxWeightGrams": 1000, "priceJPY": 1100}
        ]},
        {"method": "EMS", "maxDimensions": {"length": 150, "width": 150, "height": 150}, "rates": [
            {"maxWeightGrams": 1000, "priceJPY": 1400}
        ]}
    ]"#;

    const FEES: &str = r#"[
        {"label": "Books", "percent": 15, "categories": ["books", "magazines"]},
        {"label": "Cameras", "value": 9, "categories": ["cameras", "lenses"]}
    ]"#;

    fn write_data(dir: &Path, shipping: &str, fees: &str) -> DataSettings {
        std::fs::write(dir.join("shipping.json"), shipping).unwrap();
        std::fs::write(dir.join("categoryFees.json"), fees).unwrap();
        DataSettings {
            dir: dir.to_path_buf(),
            ..DataSettings::default()
        }
    }

    #[test]
    fn test_load_master_data() {
        let dir = tempfile::tempdir().unwrap();
        let settings = write_data(dir.path(), SHIPPING, FEES);

        let master = MasterData::load(&settings).unwrap();
        assert_eq!(master.shipping.len(), 3);
        assert_eq!(master.shipping.rules()[1].price_jpy, Jpy::new(1_100.0));
        assert_eq!(master.category_fees.len(), 2);
    }

    #[test]
    fn test_category_fee_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let master = MasterData::load(&write_data(dir.path(), SHIPPING, FEES)).unwrap();

        assert_eq!(master.category_fee("Books").unwrap().percent, Percent::new(15.0));
        assert_eq!(master.category_fee("Lenses").unwrap().label, "Cameras");
        assert!(master.category_fee("furniture").is_none());
    }

    #[test]
    fn test_missing_file() {
        let settings = DataSettings {
            dir: PathBuf::from("/definitely/not/here"),
            ..DataSettings::default()
        };
        let err = MasterData::load(&settings).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = write_data(dir.path(), "[{\"method\": ", FEES);
        let err = MasterData::load(&settings).unwrap_err();
        assert!(matches!(err, DataError::Json { ref path, .. } if path.ends_with("shipping.json")));
    }

    #[test]
    fn test_invalid_master_data_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fees = r#"[{"label": "Books", "percent": 150}]"#;
        let settings = write_data(dir.path(), SHIPPING, fees);
        let err = MasterData::load(&settings).unwrap_err();
        assert!(matches!(err, DataError::Validation { .. }));
    }

    #[test]
    fn test_bundled_sample_data_is_valid() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let settings = DataSettings {
            dir: root,
            ..DataSettings::default()
        };
        let master = MasterData::load(&settings).unwrap();
        assert!(!master.shipping.is_empty());
        assert!(!master.category_fees.is_empty());
    }
}
