//! The quote service seam.
//!
//! The repository and the conversion orchestrator talk to the remote service
//! only through [`QuoteService`]. `CryptoSphereClient` implements it over HTTP;
//! tests substitute scripted implementations.

use crate::domain::asset::Asset;
use crate::domain::conversion::{ConversionRequest, ConversionResult};
use crate::error::SdkError;
use async_trait::async_trait;
use std::sync::Arc;

/// Remote quote collaborator: one listing call, one conversion call.
#[async_trait]
pub trait QuoteService: Send + Sync {
    /// Fetch the full asset listing, in the service's order.
    async fn list_assets(&self) -> Result<Vec<Asset>, SdkError>;

    /// Convert `request.amount` of `request.source` into `request.target`.
    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult, SdkError>;
}

#[async_trait]
impl<T: QuoteService + ?Sized> QuoteService for Arc<T> {
    async fn list_assets(&self) -> Result<Vec<Asset>, SdkError> {
        (**self).list_assets().await
    }

    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult, SdkError> {
        (**self).convert(request).await
    }
}
