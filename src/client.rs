//! High-level client — `CryptoSphereClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the accessors and the [`QuoteService`] impl.

use crate::domain::asset::client::Assets;
use crate::domain::asset::Asset;
use crate::domain::conversion::client::Conversions;
use crate::domain::conversion::{ConversionRequest, ConversionResult};
use crate::error::SdkError;
use crate::http::{QuoteHttp, RetryPolicy};
use crate::quote::QuoteService;

use async_trait::async_trait;
use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::domain::asset::client::Assets as AssetsClient;
pub use crate::domain::conversion::client::Conversions as ConversionsClient;

/// The primary entry point for talking to the quote service.
///
/// Provides nested sub-client accessors for each domain:
/// `client.assets()`, `client.conversions()`.
#[derive(Clone)]
pub struct CryptoSphereClient {
    pub(crate) http: QuoteHttp,
}

impl CryptoSphereClient {
    pub fn builder() -> CryptoSphereClientBuilder {
        CryptoSphereClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn assets(&self) -> Assets<'_> {
        Assets { client: self }
    }

    pub fn conversions(&self) -> Conversions<'_> {
        Conversions { client: self }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl QuoteService for CryptoSphereClient {
    async fn list_assets(&self) -> Result<Vec<Asset>, SdkError> {
        self.assets().list().await
    }

    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult, SdkError> {
        self.conversions().convert(request).await
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct CryptoSphereClientBuilder {
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Default for CryptoSphereClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::None,
        }
    }
}

impl CryptoSphereClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Opt into automatic retries for both endpoints.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<CryptoSphereClient, SdkError> {
        Ok(CryptoSphereClient {
            http: QuoteHttp::new(&self.base_url, self.timeout, self.retry)?,
        })
    }
}
