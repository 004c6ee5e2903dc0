//! Assets sub-client — the full listing.

use crate::client::CryptoSphereClient;
use crate::domain::asset::{self, Asset};
use crate::error::SdkError;

/// Sub-client for asset listing.
pub struct Assets<'a> {
    pub(crate) client: &'a CryptoSphereClient,
}

impl<'a> Assets<'a> {
    /// Fetch and validate the full listing, in the service's order.
    pub async fn list(&self) -> Result<Vec<Asset>, SdkError> {
        let resp = self.client.http.get_cryptocurrencies().await?;
        asset::assets_from_response(resp)
            .map_err(|e: asset::ValidationError| SdkError::Validation(e.to_string()))
    }

    /// Fetch the listing and look up one symbol.
    pub async fn by_symbol(&self, symbol: &str) -> Result<Option<Asset>, SdkError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|a| a.symbol == symbol))
    }
}
