//! # CryptoSphere SDK
//!
//! Client-side market-data view-model for the CryptoSphere quote service.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Asset, view, favorites, conversion and overview domains (always available)
//! 2. **Quote seam** — `QuoteService`, the async trait the state containers are generic over
//! 3. **HTTP API** — `QuoteHttp` with per-endpoint retry policies
//! 4. **High-Level Client** — `CryptoSphereClient` with nested sub-clients
//! 5. **Session** — `MarketSession`, the owned view-model state
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cryptosphere_sdk::prelude::*;
//!
//! let client = Arc::new(CryptoSphereClient::builder().build()?);
//! let mut session = MarketSession::new(client, FileStore::open("prefs")?, SessionConfig::default());
//! let _poll = session.start();
//!
//! session.request_sort(SortKey::Price);
//! let page = session.view();
//! let result = session.converter().await.submit("BTC", 0.5, "ETH").await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and display formatting.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL constants and default timings.
pub mod network;

// ── Layer 2: Quote seam ──────────────────────────────────────────────────────

/// `QuoteService` — the remote collaborator trait.
pub mod quote;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `CryptoSphereClient` — the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Layer 5: Session ─────────────────────────────────────────────────────────

/// `MarketSession` — repository, view, favorites and converter in one owner.
pub mod session;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes + formatting
    pub use crate::shared::fmt;
    pub use crate::shared::{AssetId, Symbol};

    // Domain types — asset
    pub use crate::domain::asset::{
        Asset, AssetCollection, AssetRepository, AssetSnapshot, FetchStatus, PollGuard,
    };

    // Domain types — view
    pub use crate::domain::view::{
        PageLink, PageView, SortDirection, SortKey, ViewParameters, ViewportClass,
    };

    // Domain types — favorites
    pub use crate::domain::favorites::{FavoritesStore, FileStore, KeyValueStore, MemoryStore};

    // Domain types — conversion, overview
    pub use crate::domain::conversion::{
        ConversionOrchestrator, ConversionRequest, ConversionResult, ConversionStatus,
        HistoryEntry,
    };
    pub use crate::domain::overview::{top_movers, MarketOverview, Sentiment};

    // Errors
    pub use crate::error::{FormError, HttpError, SdkError, StorageError};

    // Network
    pub use crate::network::DEFAULT_API_URL;

    // Quote seam + session
    pub use crate::quote::QuoteService;
    pub use crate::session::{MarketSession, SessionConfig};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        AssetsClient, ConversionsClient, CryptoSphereClient, CryptoSphereClientBuilder,
    };
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    pub use std::sync::Arc;
}
