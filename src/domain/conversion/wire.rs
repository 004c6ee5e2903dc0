//! Wire types for conversion responses (REST).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `GET /convert` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConvertResponse {
    pub data: ConvertData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConvertData {
    /// Quotes keyed by target symbol.
    #[serde(default)]
    pub quote: HashMap<String, TargetQuote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetQuote {
    pub price: Option<f64>,
}
