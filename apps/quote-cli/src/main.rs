//! # resale-quote
//!
//! Prints a full pricing quote for one item.
//!
//! ## Usage
//! ```bash
//! # Auto shipping from the rate table, category from the fee master
//! resale-quote --cost 3000 --price 45 --rate 150 --weight 600 --dims 30x20x10 --category books
//!
//! # Manual shipping, explicit fee, JSON output
//! resale-quote --cost 3000 --price 45 --rate 150 --shipping 1200 --fee 13.25 --json
//!
//! # Show the tariff-inclusive figure instead of plain break-even
//! resale-quote --cost 3000 --rate 150 --weight 600 --fee 10 --mode tariff
//! ```
//!
//! ## Flow
//! ```text
//! flags ──► Args ──┬──► QuoteInput ──► resale_core::evaluate ──► text / JSON
//!                  │         ▲
//! pricing.toml ────┴─► rate, policy, data dir
//! data/*.json ──────► ShippingTable, category fee
//! ```
//!
//! Logs go to stderr (`RUST_LOG` overrides the default `warn,resale=info`),
//! so stdout carries only the quote.

mod args;
mod render;

use std::error::Error;
use std::process::ExitCode;

use chrono::Utc;
use resale_core::validation::validate_category_fee_percent;
use resale_core::{evaluate, Percent, QuoteInput, RateSnapshot};
use resale_data::{MasterData, PricingConfig};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, USAGE};

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse(std::env::args())?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => PricingConfig::load(Some(path.clone()))?,
        None => PricingConfig::load_or_default(None),
    };
    if let Some(dir) = &args.data {
        config.data.dir = dir.clone();
    }

    let master = load_master_data(&config, &args)?;
    let category_fee_percent = resolve_category_fee(&args, &master)?;

    let rate = args.rate.or_else(|| config.fixed_rate());
    let snapshot = rate
        .map(|jpy_per_usd| RateSnapshot::new(jpy_per_usd, Utc::now()))
        .transpose()?;

    let input = QuoteInput {
        cost_jpy: args.cost,
        selling_price_usd: args.price,
        rate: snapshot,
        category_fee_percent,
        shipping: args.shipping_input(),
    };
    debug!(?input, "Evaluating quote");

    let quote = evaluate(&input, &master.shipping, &config.policy());

    if args.json {
        let value = render::json(&quote, args.mode)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render::text(&quote, args.mode, snapshot.map(|s| s.rate)));
    }

    Ok(())
}

/// Loads master data. A failure only matters when the flags actually need
/// the rate table or the fee master.
fn load_master_data(config: &PricingConfig, args: &Args) -> Result<MasterData, Box<dyn Error>> {
    match MasterData::load(&config.data) {
        Ok(master) => Ok(master),
        Err(e) if !args.needs_master_data() => {
            warn!("Master data unavailable: {}. Continuing without it.", e);
            Ok(MasterData::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// `--fee` wins; otherwise `--category` is looked up in the fee master.
fn resolve_category_fee(args: &Args, master: &MasterData) -> Result<Option<Percent>, Box<dyn Error>> {
    if let Some(fee) = args.fee {
        validate_category_fee_percent(fee)?;
        return Ok(Some(Percent::new(fee)));
    }

    match &args.category {
        Some(choice) => {
            let entry = master
                .category_fee(choice)
                .ok_or_else(|| format!("unknown category '{}'", choice))?;
            debug!(label = %entry.label, percent = %entry.percent, "Resolved category fee");
            Ok(Some(entry.percent))
        }
        None => Ok(None),
    }
}

/// Installs the stderr subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,resale=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
