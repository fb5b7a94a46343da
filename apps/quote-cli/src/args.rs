//! Command-line flags.
//!
//! Every value flag stays `None` until given. An empty or unparseable value
//! is an error, never a silent zero.

use std::path::PathBuf;

use resale_core::{Dimensions, DisplayMode, ShippingInput, ValidationError};
use thiserror::Error;

pub const USAGE: &str = "\
Resale Pricing Quote

Usage: resale-quote [OPTIONS]

Options:
      --cost <JPY>        Purchase cost in yen
      --price <USD>       Planned selling price in dollars
      --rate <JPY/USD>    Exchange rate (default: [rate] in pricing.toml or RESALE_RATE)
      --weight <g>        Package weight; looks up the cheapest shipping rule
      --dims <LxWxH>      Package size in cm (0 = not measured)
      --shipping <JPY>    Manual shipping cost (skips the rate table)
      --category <NAME>   Category label or category name from categoryFees.json
      --fee <PERCENT>     Category fee percent (overrides --category)
      --mode <MODE>       breakeven | tariff | insurance (default: breakeven)
      --config <PATH>     pricing.toml to load
      --data <DIR>        Directory with shipping.json and categoryFees.json
      --json              Print the quote as JSON
  -h, --help              Show this help message";

#[derive(Debug, Error, PartialEq)]
pub enum ArgError {
    #[error("{0} needs a value")]
    MissingValue(String),

    #[error("{flag} expects a number, got '{value}'")]
    InvalidNumber { flag: String, value: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Unknown option '{0}'. Run with --help for usage.")]
    Unknown(String),
}

/// Parsed flags.
#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub cost: Option<f64>,
    pub price: Option<f64>,
    pub rate: Option<f64>,
    pub weight: Option<f64>,
    pub dims: Dimensions,
    pub shipping: Option<f64>,
    pub category: Option<String>,
    pub fee: Option<f64>,
    pub mode: DisplayMode,
    pub config: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub json: bool,
    pub help: bool,
}

impl Args {
    /// Parses flags, skipping the program name.
    pub fn parse<I>(args: I) -> Result<Self, ArgError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Args::default();
        let mut iter = args.into_iter().skip(1);

        while let Some(flag) = iter.next() {
            let mut value = || iter.next().ok_or_else(|| ArgError::MissingValue(flag.clone()));

            match flag.as_str() {
                "--cost" => parsed.cost = Some(number(&flag, value()?)?),
                "--price" => parsed.price = Some(number(&flag, value()?)?),
                "--rate" => parsed.rate = Some(number(&flag, value()?)?),
                "--weight" => parsed.weight = Some(number(&flag, value()?)?),
                "--dims" => parsed.dims = Dimensions::parse(&value()?)?,
                "--shipping" => parsed.shipping = Some(number(&flag, value()?)?),
                "--category" => parsed.category = Some(value()?),
                "--fee" => parsed.fee = Some(number(&flag, value()?)?),
                "--mode" => parsed.mode = value()?.parse()?,
                "--config" => parsed.config = Some(PathBuf::from(value()?)),
                "--data" => parsed.data = Some(PathBuf::from(value()?)),
                "--json" => parsed.json = true,
                "--help" | "-h" => parsed.help = true,
                _ => return Err(ArgError::Unknown(flag)),
            }
        }

        Ok(parsed)
    }

    /// Manual shipping wins over the rate-table lookup.
    pub fn shipping_input(&self) -> ShippingInput {
        match self.shipping {
            Some(price) => ShippingInput::Manual {
                price_jpy: Some(price),
            },
            None => ShippingInput::Auto {
                weight_grams: self.weight,
                dimensions: self.dims,
            },
        }
    }

    /// True when master data is needed to answer at all.
    pub fn needs_master_data(&self) -> bool {
        (self.shipping.is_none() && self.weight.is_some())
            || (self.fee.is_none() && self.category.is_some())
    }
}

fn number(flag: &str, raw: String) -> Result<f64, ArgError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ArgError::InvalidNumber {
            flag: flag.to_string(),
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Args, ArgError> {
        Args::parse(
            std::iter::once("resale-quote".to_string())
                .chain(line.split_whitespace().map(str::to_string)),
        )
    }

    #[test]
    fn test_parse_full_line() {
        let args = parse(
            "--cost 3000 --price 45.5 --rate 150 --weight 600 --dims 30x20x10 \
             --category Books --mode tariff --data ./data --json",
        )
        .unwrap();

        assert_eq!(args.cost, Some(3_000.0));
        assert_eq!(args.price, Some(45.5));
        assert_eq!(args.rate, Some(150.0));
        assert_eq!(args.dims, Dimensions::new(30.0, 20.0, 10.0));
        assert_eq!(args.category.as_deref(), Some("Books"));
        assert_eq!(args.mode, DisplayMode::Tariff);
        assert_eq!(args.data, Some(PathBuf::from("./data")));
        assert!(args.json);
        assert!(args.needs_master_data());
    }

    #[test]
    fn test_unset_flags_stay_none() {
        let args = parse("").unwrap();
        assert_eq!(args, Args::default());
        assert_eq!(args.shipping_input(), ShippingInput::default());
        assert!(!args.needs_master_data());
    }

    #[test]
    fn test_manual_shipping_wins() {
        let args = parse("--weight 600 --shipping 1500 --fee 10").unwrap();
        assert_eq!(
            args.shipping_input(),
            ShippingInput::Manual {
                price_jpy: Some(1_500.0)
            }
        );
        assert!(!args.needs_master_data());
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert_eq!(parse("--cost").unwrap_err(), ArgError::MissingValue("--cost".into()));
        assert!(matches!(parse("--cost abc"), Err(ArgError::InvalidNumber { .. })));
        assert!(matches!(parse("--rate NaN"), Err(ArgError::InvalidNumber { .. })));
        assert!(matches!(parse("--dims 30x20"), Err(ArgError::Invalid(_))));
        assert!(matches!(parse("--mode profit"), Err(ArgError::Invalid(_))));
        assert_eq!(parse("--verbose").unwrap_err(), ArgError::Unknown("--verbose".into()));
    }

    #[test]
    fn test_help() {
        assert!(parse("-h").unwrap().help);
        assert!(USAGE.contains("--shipping"));
    }
}
