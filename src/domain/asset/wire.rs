//! Wire types for the asset listing (REST).

use crate::shared::serde_util::null_as_zero;
use crate::shared::AssetId;
use serde::{Deserialize, Serialize};

/// `GET /cryptocurrencies` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CryptocurrenciesResponse {
    pub data: Vec<CryptocurrencyRecord>,
}

/// One listed asset as the quote service reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CryptocurrencyRecord {
    pub id: AssetId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default, deserialize_with = "null_as_zero::deserialize")]
    pub circulating_supply: f64,
    pub quote: QuoteMap,
}

/// Quotes keyed by fiat currency. Only USD is requested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteMap {
    #[serde(rename = "USD")]
    pub usd: UsdQuote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsdQuote {
    #[serde(default, deserialize_with = "null_as_zero::deserialize")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_zero::deserialize")]
    pub percent_change_24h: f64,
    #[serde(default, deserialize_with = "null_as_zero::deserialize")]
    pub percent_change_7d: f64,
    #[serde(default, deserialize_with = "null_as_zero::deserialize")]
    pub market_cap: f64,
    #[serde(default, deserialize_with = "null_as_zero::deserialize")]
    pub volume_24h: f64,
}
