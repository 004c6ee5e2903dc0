//! Conversion: ConvertResponse → ConversionResult.

use super::wire::ConvertResponse;
use super::{ConversionRequest, ConversionResult};
use crate::error::SdkError;
use chrono::Utc;
use rust_decimal::Decimal;

impl ConversionResult {
    /// Pick the target quote out of a response to `request`.
    pub fn from_response(
        request: &ConversionRequest,
        resp: ConvertResponse,
    ) -> Result<Self, SdkError> {
        let price = resp
            .data
            .quote
            .get(request.target.as_str())
            .and_then(|q| q.price)
            .ok_or_else(|| {
                SdkError::Validation(format!("Missing {} quote in response", request.target))
            })?;

        let value = Decimal::try_from(price).map_err(|_| {
            SdkError::Validation(format!("{} quote is not a finite number", request.target))
        })?;
        if value <= Decimal::ZERO {
            return Err(SdkError::Validation(format!(
                "{} quote must be positive, got {}",
                request.target, value
            )));
        }

        Ok(ConversionResult {
            source: request.source.clone(),
            target: request.target.clone(),
            amount: request.amount,
            value,
            computed_at: resp.data.last_updated.unwrap_or_else(Utc::now),
        })
    }
}
