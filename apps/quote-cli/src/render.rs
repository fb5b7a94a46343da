//! Text and JSON rendering of a [`Quote`].

use std::fmt::Write;

use resale_core::{CalcError, CalcResult, DisplayMode, ExchangeRate, Quote, ShippingSelection};
use serde::Serialize;
use serde_json::{json, Value};

/// Human-readable quote for the terminal.
pub fn text(quote: &Quote, mode: DisplayMode, rate: Option<ExchangeRate>) -> String {
    let mut out = String::new();

    let shipping = match (&quote.shipping, &quote.profit) {
        (Some(ShippingSelection::Selected { method, price_jpy, .. }), _) => {
            format!("{} ({})", method, price_jpy)
        }
        (Some(ShippingSelection::NoEligibleMethod), _) => "unknown".to_string(),
        (None, Ok(profit)) => format!("{} ({})", profit.method, profit.shipping_jpy),
        (None, Err(_)) => "-".to_string(),
    };
    line(&mut out, "Shipping", shipping);
    line(
        &mut out,
        "Exchange rate",
        rate.map_or_else(|| "-".to_string(), |r| r.to_string()),
    );

    match &quote.break_even {
        Ok(result) => {
            let usd = result.usd_for(mode);
            let figure = match rate {
                Some(rate) => format!("{} (¥{})", usd, result.jpy_for(mode, rate)),
                None => usd.to_string(),
            };
            line(&mut out, mode.label(), figure);
        }
        Err(err) => line(&mut out, mode.label(), prompt(err)),
    }

    match &quote.profit {
        Ok(profit) => {
            line(&mut out, "Category fee", profit.category_fee_jpy.to_string());
            line(&mut out, "Conversion fee", profit.conversion_fee_jpy.to_string());
            line(&mut out, "Actual cost", profit.actual_cost_jpy.to_string());
            line(
                &mut out,
                "Gross profit",
                format!("{} ({})", profit.gross_profit_jpy, profit.gross_profit_usd),
            );
            line(
                &mut out,
                "Margin",
                format!("{:.2}%", profit.profit_margin_percent),
            );
        }
        Err(err) => line(&mut out, "Profit", prompt(err)),
    }

    match &quote.final_detail {
        Ok(detail) => {
            let required = match &detail.required {
                Some(required) => format!("{} ({})", required.price_usd, required.price_jpy),
                None => "not reachable: fees plus margin exceed revenue".to_string(),
            };
            line(
                &mut out,
                &format!("Price for {:.0}% margin", detail.target_margin_percent),
                required,
            );
            let at = &detail.at_selling_price;
            line(&mut out, "Payment fee", at.payment_fee_jpy.to_string());
            line(
                &mut out,
                "Net after all fees",
                format!("{} ({:.2}%)", at.profit_jpy, at.margin_percent),
            );
        }
        Err(err) if !err.is_missing_input() => line(&mut out, "Final detail", prompt(err)),
        Err(_) => {}
    }

    if let Ok(price) = &quote.price_incl_sales_tax_usd {
        line(&mut out, "Buyer pays incl. tax", price.to_string());
    }

    out
}

/// Machine-readable quote. Figures that could not be computed become
/// `{"error": ..., "missingInput": bool}`.
pub fn json(quote: &Quote, mode: DisplayMode) -> serde_json::Result<Value> {
    Ok(json!({
        "mode": mode,
        "shipping": quote.shipping,
        "breakEven": figure(&quote.break_even)?,
        "profit": figure(&quote.profit)?,
        "finalDetail": figure(&quote.final_detail)?,
        "priceInclSalesTaxUSD": figure(&quote.price_incl_sales_tax_usd)?,
    }))
}

fn figure<T: Serialize>(result: &CalcResult<T>) -> serde_json::Result<Value> {
    match result {
        Ok(value) => serde_json::to_value(value),
        Err(err) => Ok(json!({
            "error": err.to_string(),
            "missingInput": err.is_missing_input(),
        })),
    }
}

fn prompt(err: &CalcError) -> String {
    if err.is_missing_input() {
        format!("complete the input ({})", err)
    } else {
        format!("not computable: {}", err)
    }
}

fn line(out: &mut String, label: &str, value: String) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{:<24}{}", label, value);
}
