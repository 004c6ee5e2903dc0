//! Conversion domain — requests, results, bounded history, the orchestrator.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod state;
pub mod wire;

use crate::shared::Symbol;
use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use state::{ConversionHistory, ConversionOrchestrator, CurrencyChoice};

/// A validated conversion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub source: Symbol,
    pub amount: Decimal,
    pub target: Symbol,
}

/// The service's answer to a [`ConversionRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub source: Symbol,
    pub target: Symbol,
    pub amount: Decimal,
    /// Amount of `target` that `amount` of `source` is worth.
    pub value: Decimal,
    /// Server-side last-updated time of the quote used.
    pub computed_at: DateTime<Utc>,
}

/// A successful conversion as kept in the history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub result: ConversionResult,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(result: ConversionResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            result,
            recorded_at: Utc::now(),
        }
    }

    /// Wall-clock time of recording, `HH:MM:SS` in local time.
    pub fn display_time(&self) -> String {
        self.recorded_at
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
    }
}

/// Lifecycle of the current submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConversionStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded(ConversionResult),
    Failed(String),
}

impl ConversionStatus {
    pub fn is_submitting(&self) -> bool {
        matches!(self, ConversionStatus::Submitting)
    }

    pub fn result(&self) -> Option<&ConversionResult> {
        match self {
            ConversionStatus::Succeeded(r) => Some(r),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ConversionStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}
