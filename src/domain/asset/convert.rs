//! Conversion: CryptocurrencyRecord → Asset (TryFrom + validation).

use super::wire;
use super::{Asset, ValidationError};
use crate::shared::Symbol;
use rust_decimal::Decimal;
use std::collections::HashSet;

fn decimal(symbol: &Symbol, field: &'static str, value: f64) -> Result<Decimal, ValidationError> {
    Decimal::try_from(value).map_err(|_| ValidationError::NonFinite {
        symbol: symbol.clone(),
        field,
    })
}

fn non_negative(
    symbol: &Symbol,
    field: &'static str,
    value: f64,
) -> Result<Decimal, ValidationError> {
    let d = decimal(symbol, field, value)?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err(ValidationError::Negative {
            symbol: symbol.clone(),
            field,
        });
    }
    Ok(d)
}

impl TryFrom<wire::CryptocurrencyRecord> for Asset {
    type Error = ValidationError;

    fn try_from(source: wire::CryptocurrencyRecord) -> Result<Self, Self::Error> {
        if source.symbol.trim().is_empty() {
            return Err(ValidationError::MissingSymbol(source.id));
        }
        if source.name.trim().is_empty() {
            return Err(ValidationError::MissingName(source.id));
        }

        let symbol = Symbol::from(source.symbol);
        let usd = source.quote.usd;

        if !(usd.price.is_finite() && usd.price > 0.0) {
            return Err(ValidationError::InvalidPrice {
                symbol,
                price: usd.price,
            });
        }

        Ok(Asset {
            price: decimal(&symbol, "price", usd.price)?,
            percent_change_24h: decimal(&symbol, "percent_change_24h", usd.percent_change_24h)?,
            percent_change_7d: decimal(&symbol, "percent_change_7d", usd.percent_change_7d)?,
            market_cap: non_negative(&symbol, "market_cap", usd.market_cap)?,
            volume_24h: non_negative(&symbol, "volume_24h", usd.volume_24h)?,
            circulating_supply: non_negative(
                &symbol,
                "circulating_supply",
                source.circulating_supply,
            )?,
            id: source.id,
            name: source.name,
            symbol,
        })
    }
}

/// Map a whole listing into assets, preserving the service's order.
///
/// Every record is validated; symbols must be unique within the listing.
pub fn assets_from_response(
    resp: wire::CryptocurrenciesResponse,
) -> Result<Vec<Asset>, ValidationError> {
    let mut errors = Vec::new();
    let mut assets = Vec::with_capacity(resp.data.len());
    let mut seen: HashSet<Symbol> = HashSet::new();

    for record in resp.data {
        match Asset::try_from(record) {
            Ok(asset) => {
                if !seen.insert(asset.symbol.clone()) {
                    errors.push(ValidationError::DuplicateSymbol(asset.symbol));
                    continue;
                }
                assets.push(asset);
            }
            Err(err) => errors.push(err),
        }
    }

    if !errors.is_empty() {
        return Err(ValidationError::Multiple(errors));
    }
    Ok(assets)
}
