//! Overview domain — market-wide aggregates over one asset collection.

use crate::domain::asset::Asset;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Default number of entries on each side of [`top_movers`].
pub const DEFAULT_MOVERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    Bullish,
    Bearish,
}

/// Aggregate figures for a market summary header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketOverview {
    pub total_market_cap: Decimal,
    pub total_volume_24h: Decimal,
    /// BTC share of total market cap in percent, one decimal.
    pub btc_dominance: Option<Decimal>,
    /// Rounded percent of assets whose 24h change is non-negative.
    pub positive_share: u32,
    pub sentiment: Sentiment,
    pub top_gainer: Option<Asset>,
    pub top_loser: Option<Asset>,
}

impl MarketOverview {
    pub fn from_assets(assets: &[Asset]) -> Self {
        let total_market_cap = saturating_total(assets.iter().map(|a| a.market_cap));
        let total_volume_24h = saturating_total(assets.iter().map(|a| a.volume_24h));

        let btc_dominance = assets
            .iter()
            .find(|a| a.symbol == "BTC")
            .filter(|_| !total_market_cap.is_zero())
            .and_then(|btc| btc.market_cap.checked_div(total_market_cap))
            .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero));

        let positive_share = if assets.is_empty() {
            0
        } else {
            let up = assets
                .iter()
                .filter(|a| a.percent_change_24h >= Decimal::ZERO)
                .count();
            ((up as f64 / assets.len() as f64) * 100.0).round() as u32
        };
        let sentiment = if positive_share >= 50 {
            Sentiment::Bullish
        } else {
            Sentiment::Bearish
        };

        // max_by_key returns the last maximum; keep the first instead.
        let top_gainer = assets
            .iter()
            .reduce(|best, a| if a.percent_change_24h > best.percent_change_24h { a } else { best })
            .cloned();
        let top_loser = assets
            .iter()
            .reduce(|worst, a| if a.percent_change_24h < worst.percent_change_24h { a } else { worst })
            .cloned();

        Self {
            total_market_cap,
            total_volume_24h,
            btc_dominance,
            positive_share,
            sentiment,
            top_gainer,
            top_loser,
        }
    }
}

/// Non-negative sum clamped at `Decimal::MAX`.
fn saturating_total(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, |acc, v| acc.checked_add(v).unwrap_or(Decimal::MAX))
}

/// Biggest 24h movers: `n` gainers (largest first) and `n` losers (smallest first).
pub fn top_movers(assets: &[Asset], n: usize) -> (Vec<Asset>, Vec<Asset>) {
    let mut by_change: Vec<&Asset> = assets.iter().collect();
    by_change.sort_by(|a, b| b.percent_change_24h.cmp(&a.percent_change_24h));
    let gainers = by_change.iter().take(n).map(|a| (*a).clone()).collect();

    by_change.sort_by(|a, b| a.percent_change_24h.cmp(&b.percent_change_24h));
    let losers = by_change.iter().take(n).map(|a| (*a).clone()).collect();

    (gainers, losers)
}
