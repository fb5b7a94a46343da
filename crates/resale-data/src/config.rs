//! # Pricing Configuration
//!
//! Business constants, master data locations and an optional fixed rate.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RESALE_PAYMENT_FEE=1.35                                            │
//! │     RESALE_RATE=147.2                                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/pricing/pricing.toml (Linux)                             │
//! │     ~/Library/Application Support/com.resale.pricing/pricing.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     resale_core::DEFAULT_* constants                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pricing.toml
//! [policy]
//! exchange_fee_jpy_per_usd = 3.3
//! payment_fee_percent = 1.35
//! target_margin = 0.30
//! duty_percent = 15.0
//! insurance_percent = 30.0
//! sales_tax_percent = 6.71
//!
//! [data]
//! dir = "data"
//! shipping_file = "shipping.json"
//! category_fee_file = "categoryFees.json"
//!
//! [rate]
//! jpy_per_usd = 147.2
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use resale_core::money::Jpy;
use resale_core::validation::validate_exchange_rate;
use resale_core::{
    Percent, PricingPolicy, DEFAULT_DUTY_PERCENT, DEFAULT_EXCHANGE_FEE_JPY_PER_USD,
    DEFAULT_INSURANCE_LOADING_PERCENT, DEFAULT_PAYMENT_FEE_PERCENT, DEFAULT_TARGET_MARGIN,
    DEFAULT_US_SALES_TAX_PERCENT,
};

use crate::error::{DataError, DataResult};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "pricing.toml";

// =============================================================================
// Policy Settings
// =============================================================================

/// The `[policy]` section. Percentages are plain 0–100 numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySettings {
    #[serde(default = "default_exchange_fee")]
    pub exchange_fee_jpy_per_usd: f64,

    #[serde(default = "default_payment_fee")]
    pub payment_fee_percent: f64,

    /// Fraction, not percent: `0.30` = 30 %.
    #[serde(default = "default_target_margin")]
    pub target_margin: f64,

    #[serde(default = "default_duty")]
    pub duty_percent: f64,

    #[serde(default = "default_insurance")]
    pub insurance_percent: f64,

    #[serde(default = "default_sales_tax")]
    pub sales_tax_percent: f64,
}

fn default_exchange_fee() -> f64 {
    DEFAULT_EXCHANGE_FEE_JPY_PER_USD
}
fn default_payment_fee() -> f64 {
    DEFAULT_PAYMENT_FEE_PERCENT
}
fn default_target_margin() -> f64 {
    DEFAULT_TARGET_MARGIN
}
fn default_duty() -> f64 {
    DEFAULT_DUTY_PERCENT
}
fn default_insurance() -> f64 {
    DEFAULT_INSURANCE_LOADING_PERCENT
}
fn default_sales_tax() -> f64 {
    DEFAULT_US_SALES_TAX_PERCENT
}

impl Default for PolicySettings {
    fn default() -> Self {
        PolicySettings {
            exchange_fee_jpy_per_usd: default_exchange_fee(),
            payment_fee_percent: default_payment_fee(),
            target_margin: default_target_margin(),
            duty_percent: default_duty(),
            insurance_percent: default_insurance(),
            sales_tax_percent: default_sales_tax(),
        }
    }
}

impl PolicySettings {
    /// Converts to the engine's typed policy.
    pub fn to_policy(&self) -> PricingPolicy {
        PricingPolicy {
            exchange_fee_jpy_per_usd: Jpy::new(self.exchange_fee_jpy_per_usd),
            payment_fee_percent: Percent::new(self.payment_fee_percent),
            target_margin: self.target_margin,
            duty_percent: Percent::new(self.duty_percent),
            insurance_percent: Percent::new(self.insurance_percent),
            sales_tax_percent: Percent::new(self.sales_tax_percent),
        }
    }
}

// =============================================================================
// Data Settings
// =============================================================================

/// The `[data]` section: where the master data files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    /// Directory holding both master files. Relative paths resolve against
    /// the working directory.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_shipping_file")]
    pub shipping_file: String,

    #[serde(default = "default_category_fee_file")]
    pub category_fee_file: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_shipping_file() -> String {
    "shipping.json".to_string()
}

fn default_category_fee_file() -> String {
    "categoryFees.json".to_string()
}

impl Default for DataSettings {
    fn default() -> Self {
        DataSettings {
            dir: default_data_dir(),
            shipping_file: default_shipping_file(),
            category_fee_file: default_category_fee_file(),
        }
    }
}

impl DataSettings {
    pub fn shipping_path(&self) -> PathBuf {
        self.dir.join(&self.shipping_file)
    }

    pub fn category_fee_path(&self) -> PathBuf {
        self.dir.join(&self.category_fee_file)
    }
}

// =============================================================================
// Rate Settings
// =============================================================================

/// The `[rate]` section.
///
/// The live rate normally comes from an external provider. A fixed rate here
/// (or `RESALE_RATE`) stands in for it, e.g. for offline quoting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jpy_per_usd: Option<f64>,
}

// =============================================================================
// Main Pricing Configuration
// =============================================================================

/// Complete pricing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub policy: PolicySettings,

    #[serde(default)]
    pub data: DataSettings,

    #[serde(default)]
    pub rate: RateSettings,
}

impl PricingConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform config dir)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DataResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading pricing config from file");
                config = Self::from_file(&path)?;
            } else if explicit {
                // A path the user named must exist.
                return Err(DataError::io(
                    &path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                ));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load pricing config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML file without applying overrides.
    pub fn from_file(path: &Path) -> DataResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> DataResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(DataError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| DataError::io(&path, e))?;

        info!(?path, "Pricing config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DataResult<()> {
        self.policy
            .to_policy()
            .validate()
            .map_err(|e| DataError::InvalidConfig(e.to_string()))?;

        if let Some(rate) = self.rate.jpy_per_usd {
            validate_exchange_rate(rate).map_err(|e| DataError::InvalidConfig(e.to_string()))?;
        }

        if self.data.shipping_file.trim().is_empty() || self.data.category_fee_file.trim().is_empty() {
            return Err(DataError::InvalidConfig(
                "master data file names must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies `RESALE_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable numbers are logged
    /// and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str| -> Option<f64> {
            let raw = lookup(key)?;
            match raw.trim().parse::<f64>() {
                Ok(value) => {
                    debug!(key, value, "Overriding pricing config from environment");
                    Some(value)
                }
                Err(_) => {
                    warn!(key, value = %raw, "Ignoring non-numeric environment override");
                    None
                }
            }
        };

        if let Some(v) = number("RESALE_EXCHANGE_FEE") {
            self.policy.exchange_fee_jpy_per_usd = v;
        }
        if let Some(v) = number("RESALE_PAYMENT_FEE") {
            self.policy.payment_fee_percent = v;
        }
        if let Some(v) = number("RESALE_TARGET_MARGIN") {
            self.policy.target_margin = v;
        }
        if let Some(v) = number("RESALE_DUTY_PERCENT") {
            self.policy.duty_percent = v;
        }
        if let Some(v) = number("RESALE_INSURANCE_PERCENT") {
            self.policy.insurance_percent = v;
        }
        if let Some(v) = number("RESALE_SALES_TAX") {
            self.policy.sales_tax_percent = v;
        }
        if let Some(v) = number("RESALE_RATE") {
            self.rate.jpy_per_usd = Some(v);
        }

        if let Some(dir) = lookup("RESALE_DATA_DIR") {
            debug!(dir = %dir, "Overriding data directory from environment");
            self.data.dir = PathBuf::from(dir);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "resale", "pricing")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The typed policy for `resale_core::evaluate`.
    pub fn policy(&self) -> PricingPolicy {
        self.policy.to_policy()
    }

    /// The configured fixed rate, if any.
    pub fn fixed_rate(&self) -> Option<f64> {
        self.rate.jpy_per_usd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = PricingConfig::default();
        assert_eq!(config.policy(), PricingPolicy::default());
        assert_eq!(config.data.shipping_path(), PathBuf::from("data/shipping.json"));
        assert_eq!(config.data.category_fee_path(), PathBuf::from("data/categoryFees.json"));
        assert_eq!(config.fixed_rate(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: PricingConfig = toml::from_str(
            r#"
            [policy]
            payment_fee_percent = 2.9

            [rate]
            jpy_per_usd = 147.2
            "#,
        )
        .unwrap();

        assert_eq!(config.policy.payment_fee_percent, 2.9);
        assert_eq!(config.policy.exchange_fee_jpy_per_usd, 3.3);
        assert_eq!(config.policy.target_margin, 0.30);
        assert_eq!(config.data, DataSettings::default());
        assert_eq!(config.fixed_rate(), Some(147.2));
    }

    #[test]
    fn test_config_validation() {
        let mut config = PricingConfig::default();
        assert!(config.validate().is_ok());

        config.policy.target_margin = 1.0;
        assert!(matches!(config.validate(), Err(DataError::InvalidConfig(_))));

        config.policy.target_margin = 0.3;
        config.policy.duty_percent = 120.0;
        assert!(config.validate().is_err());

        config.policy.duty_percent = 15.0;
        config.rate.jpy_per_usd = Some(0.0);
        assert!(config.validate().is_err());

        config.rate.jpy_per_usd = Some(150.0);
        config.data.shipping_file = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = PricingConfig::default();
        config.apply_overrides_from(env(&[
            ("RESALE_PAYMENT_FEE", "2.5"),
            ("RESALE_TARGET_MARGIN", " 0.25 "),
            ("RESALE_RATE", "151.3"),
            ("RESALE_DATA_DIR", "/srv/pricing"),
            ("RESALE_DUTY_PERCENT", "not-a-number"),
        ]));

        assert_eq!(config.policy.payment_fee_percent, 2.5);
        assert_eq!(config.policy.target_margin, 0.25);
        assert_eq!(config.fixed_rate(), Some(151.3));
        assert_eq!(config.data.dir, PathBuf::from("/srv/pricing"));
        // Unparseable value leaves the default in place.
        assert_eq!(config.policy.duty_percent, 15.0);
    }

    #[test]
    fn test_save_and_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = PricingConfig::default();
        config.policy.sales_tax_percent = 8.0;
        config.rate.jpy_per_usd = Some(149.0);
        config.save(Some(path.clone())).unwrap();

        let loaded = PricingConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PricingConfig::load(Some(dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ref e) if e.is_not_found()));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[policy\npayment_fee_percent = ").unwrap();
        assert!(matches!(
            PricingConfig::from_file(&path),
            Err(DataError::TomlDe(_))
        ));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&PricingConfig::default()).unwrap();
        assert!(toml_str.contains("[policy]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("exchange_fee_jpy_per_usd"));
        assert!(!toml_str.lines().any(|l| l.trim_start().starts_with("jpy_per_usd")));

        let value: toml::Value = toml::from_str(&toml_str).unwrap();
        let rate = value["rate"].as_table().unwrap();
        assert!(rate.is_empty());
    }
}
