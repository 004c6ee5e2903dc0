//! Conversions sub-client — point-in-time price conversion.

use crate::client::CryptoSphereClient;
use crate::domain::conversion::{ConversionRequest, ConversionResult};
use crate::error::SdkError;

/// Sub-client for conversion requests.
pub struct Conversions<'a> {
    pub(crate) client: &'a CryptoSphereClient,
}

impl<'a> Conversions<'a> {
    /// Send an already-validated request.
    pub async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult, SdkError> {
        let amount = request.amount.normalize().to_string();
        let resp = self
            .client
            .http
            .get_conversion(request.source.as_str(), &amount, request.target.as_str())
            .await?;
        ConversionResult::from_response(request, resp)
    }
}
