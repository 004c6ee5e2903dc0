//! Display formatting for prices, percentages and market totals.

pub mod decimal;
pub mod num;

pub use decimal::{conversion_value, percent, usd_compact, usd_price};
