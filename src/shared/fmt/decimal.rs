//! Decimal formatting for the market views.
//!
//! Rounding is always half-away-from-zero, matching what a browser's
//! `Intl.NumberFormat` renders, so values shown here agree with the web UI.

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;

const TRILLION: i64 = 1_000_000_000_000;
const BILLION: i64 = 1_000_000_000;
const MILLION: i64 = 1_000_000;

fn rounded(value: &Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed number of fraction digits with thousands separators.
pub fn fixed(value: &Decimal, dp: u32) -> String {
    let text = format!("{:.*}", dp as usize, rounded(value, dp));
    super::num::group_thousands(&text)
}

/// Compact USD for market totals: `$1.23T`, `$4.50B`, `$7.00M`, `$12.34`.
pub fn usd_compact(value: &Decimal) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = value.abs();

    let (scaled, suffix) = if abs >= Decimal::from(TRILLION) {
        (abs / Decimal::from(TRILLION), "T")
    } else if abs >= Decimal::from(BILLION) {
        (abs / Decimal::from(BILLION), "B")
    } else if abs >= Decimal::from(MILLION) {
        (abs / Decimal::from(MILLION), "M")
    } else {
        (abs, "")
    };

    format!("{}${:.2}{}", sign, rounded(&scaled, 2), suffix)
}

/// Asset price in USD: 4 fraction digits below one dollar, 2 otherwise.
pub fn usd_price(value: &Decimal) -> String {
    let dp = if value.abs() < Decimal::ONE { 4 } else { 2 };
    if value.is_sign_negative() && !value.is_zero() {
        format!("-${}", fixed(&value.abs(), dp))
    } else {
        format!("${}", fixed(value, dp))
    }
}

/// Signed percentage with two fraction digits: `+1.23%`, `-4.00%`, `0.00%`.
pub fn percent(value: &Decimal) -> String {
    let shown = rounded(value, 2);
    let sign = if *value > Decimal::ZERO { "+" } else { "" };
    format!("{}{:.2}%", sign, shown)
}

/// Converted amount: 6 fraction digits below one unit, 2 otherwise.
pub fn conversion_value(value: &Decimal) -> String {
    let dp = if value.abs() < Decimal::ONE { 6 } else { 2 };
    fixed(value, dp)
}
