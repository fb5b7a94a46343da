//! # resale-data: Master Data and Configuration
//!
//! The only layer that touches the file system and the environment. It turns
//! JSON master files and `pricing.toml` into the typed, validated values
//! `resale-core` computes with.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Data Layer Architecture                          │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────────┐    │
//! │  │  PricingConfig (config)  │      │  MasterData (master)         │    │
//! │  │                          │      │                              │    │
//! │  │  defaults                │      │  shipping.json               │    │
//! │  │   → pricing.toml         │─────►│  categoryFees.json           │    │
//! │  │   → RESALE_* env         │ dir  │   → parse → validate         │    │
//! │  └────────────┬─────────────┘      └──────────────┬───────────────┘    │
//! │               │ PricingPolicy                     │ ShippingTable      │
//! │               ▼                                   ▼                    │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 resale_core::evaluate (pure)                     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`] - `PricingConfig` (TOML + environment)
//! - [`master`] - Shipping table and category-fee loading
//! - [`error`] - Data error types

pub mod config;
pub mod error;
pub mod master;

pub use config::{DataSettings, PolicySettings, PricingConfig, RateSettings};
pub use error::{DataError, DataResult};
pub use master::{load_category_fees, load_shipping_table, MasterData};
