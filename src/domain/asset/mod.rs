//! Asset domain — quote snapshots, validation, the polling repository.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod state;
pub mod wire;

use crate::shared::{AssetId, Symbol};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub use convert::assets_from_response;
pub use state::{AssetRepository, AssetSnapshot, FetchStatus, PollGuard};

// ─── Asset ───────────────────────────────────────────────────────────────────

/// Immutable snapshot of one tradable instrument for a given fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    pub symbol: Symbol,
    /// USD price, always > 0.
    pub price: Decimal,
    pub percent_change_24h: Decimal,
    pub percent_change_7d: Decimal,
    pub market_cap: Decimal,
    pub volume_24h: Decimal,
    pub circulating_supply: Decimal,
}

/// Full replacement collection produced by one successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetCollection {
    pub assets: Arc<[Asset]>,
    pub fetched_at: DateTime<Utc>,
}

impl AssetCollection {
    pub fn new(assets: Vec<Asset>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            assets: assets.into(),
            fetched_at,
        }
    }

    pub fn find(&self, symbol: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ValidationError {
    Multiple(Vec<ValidationError>),
    MissingName(AssetId),
    MissingSymbol(AssetId),
    InvalidPrice { symbol: Symbol, price: f64 },
    NonFinite { symbol: Symbol, field: &'static str },
    Negative { symbol: Symbol, field: &'static str },
    DuplicateSymbol(Symbol),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Multiple(errors) => {
                writeln!(f, "Asset validation errors:")?;
                for err in errors {
                    writeln!(f, "  - {}", err)?;
                }
                Ok(())
            }
            ValidationError::MissingName(id) => write!(f, "Missing name for asset {}", id),
            ValidationError::MissingSymbol(id) => write!(f, "Missing symbol for asset {}", id),
            ValidationError::InvalidPrice { symbol, price } => {
                write!(f, "{}: price must be positive, got {}", symbol, price)
            }
            ValidationError::NonFinite { symbol, field } => {
                write!(f, "{}: {} is not a finite number", symbol, field)
            }
            ValidationError::Negative { symbol, field } => {
                write!(f, "{}: {} must not be negative", symbol, field)
            }
            ValidationError::DuplicateSymbol(symbol) => {
                write!(f, "Duplicate symbol {}", symbol)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
