//! Market session — the owned view-model state.
//!
//! A [`MarketSession`] owns one [`AssetRepository`], one [`FavoritesStore`],
//! the [`ViewParameters`] with their derivation memo, the search
//! [`Debouncer`] and one [`ConversionOrchestrator`]. Presentation code holds
//! the session, renders [`MarketSession::view`] and forwards user commands.
//!
//! ```ignore
//! let client = Arc::new(CryptoSphereClient::builder().build()?);
//! let storage = FileStore::open(data_dir)?;
//! let mut session = MarketSession::new(client, storage, SessionConfig::default());
//! let _poll = session.start();
//!
//! session.type_search("bit");
//! session.settle_search().await;
//! for asset in session.view().current_page_items() {
//!     println!("{} {}", asset.symbol, fmt::usd_price(&asset.price));
//! }
//! ```

use crate::domain::asset::{AssetRepository, AssetSnapshot, FetchStatus, PollGuard};
use crate::domain::conversion::ConversionOrchestrator;
use crate::domain::favorites::{FavoritesStore, KeyValueStore};
use crate::domain::overview::{self, MarketOverview};
use crate::domain::view::{
    Debouncer, PageView, SortDirection, SortKey, ViewDerivation, ViewParameters, ViewportClass,
};
use crate::domain::asset::Asset;
use crate::error::SdkError;
use crate::network;
use crate::quote::QuoteService;
use crate::shared::AssetId;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

// ─── SessionConfig ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub refresh_interval: Duration,
    pub search_debounce: Duration,
    pub history_capacity: usize,
    pub viewport: ViewportClass,
    pub favorites_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval: network::REFRESH_INTERVAL,
            search_debounce: network::SEARCH_DEBOUNCE,
            history_capacity: network::HISTORY_CAPACITY,
            viewport: ViewportClass::default(),
            favorites_key: network::FAVORITES_KEY.to_string(),
        }
    }
}

// ─── MarketSession ───────────────────────────────────────────────────────────

pub struct MarketSession<S> {
    config: SessionConfig,
    repository: AssetRepository<S>,
    favorites: FavoritesStore,
    params: ViewParameters,
    derivation: ViewDerivation,
    search: Debouncer<String>,
    converter: ConversionOrchestrator<S>,
}

impl<S: QuoteService + 'static> MarketSession<S> {
    pub fn new(
        service: Arc<S>,
        storage: impl KeyValueStore + 'static,
        config: SessionConfig,
    ) -> Self {
        let favorites = FavoritesStore::load(storage, &config.favorites_key);
        Self {
            repository: AssetRepository::new(service.clone()),
            converter: ConversionOrchestrator::new(service, config.history_capacity),
            favorites,
            params: ViewParameters::for_viewport(config.viewport),
            derivation: ViewDerivation::new(),
            search: Debouncer::new(config.search_debounce),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ── Repository ───────────────────────────────────────────────────────

    /// Start periodic refresh at the configured interval.
    pub fn start(&self) -> PollGuard {
        self.repository.start(self.config.refresh_interval)
    }

    pub async fn fetch_now(&self) -> AssetSnapshot {
        let snapshot = self.repository.fetch_now().await;
        self.converter.sync_choices(snapshot.status.assets()).await;
        snapshot
    }

    pub async fn retry(&self) -> AssetSnapshot {
        self.fetch_now().await
    }

    pub fn repository(&self) -> &AssetRepository<S> {
        &self.repository
    }

    pub fn status(&self) -> FetchStatus {
        self.repository.status()
    }

    // ── View ─────────────────────────────────────────────────────────────

    /// The current page for the latest snapshot, favorites and parameters.
    pub fn view(&mut self) -> &PageView {
        let snapshot = self.repository.snapshot();
        self.derivation.view(
            snapshot.status.assets(),
            snapshot.revision,
            &self.params,
            self.favorites.ids(),
            self.favorites.revision(),
        )
    }

    /// Number of times the derivation pipeline has run.
    pub fn view_computations(&self) -> u64 {
        self.derivation.computations()
    }

    pub fn params(&self) -> &ViewParameters {
        &self.params
    }

    /// Record a keystroke. The term reaches the view only once input has
    /// been quiet for the debounce window.
    pub fn type_search(&mut self, term: impl Into<String>) {
        self.search.push(term.into(), Instant::now());
    }

    /// Apply the pending search term if its window has elapsed.
    pub fn poll_search(&mut self) -> bool {
        match self.search.fire(Instant::now()) {
            Some(term) => {
                self.apply_search(term);
                true
            }
            None => false,
        }
    }

    /// Wait for the pending search term to settle, then apply it.
    pub async fn settle_search(&mut self) -> bool {
        match self.search.settle().await {
            Some(term) => {
                self.apply_search(term);
                true
            }
            None => false,
        }
    }

    /// Apply a term immediately, cancelling any pending keystroke.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search.cancel();
        self.apply_search(term.into());
    }

    pub fn pending_search(&self) -> Option<&str> {
        self.search.peek().map(String::as_str)
    }

    fn apply_search(&mut self, term: String) {
        tracing::debug!(term = %term, "Search term settled");
        self.params.set_search_term(term);
    }

    pub fn set_favorites_only(&mut self, on: bool) {
        self.params.set_favorites_only(on);
    }

    pub fn request_sort(&mut self, key: SortKey) {
        self.params.request_sort(key);
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.params.set_sort(key, direction);
    }

    pub fn set_page(&mut self, page: usize) {
        self.params.set_page(page);
    }

    pub fn next_page(&mut self) {
        let total = self.view().total_pages();
        self.params.next_page(total);
    }

    pub fn prev_page(&mut self) {
        self.params.prev_page();
    }

    pub fn set_viewport_width(&mut self, px: u32) {
        self.params.set_viewport(ViewportClass::from_width(px));
    }

    // ── Favorites ────────────────────────────────────────────────────────

    pub fn is_favorite(&self, id: &AssetId) -> bool {
        self.favorites.is_favorite(id)
    }

    /// Toggle and persist. Returns the new membership.
    pub fn toggle_favorite(&mut self, id: &AssetId) -> Result<bool, SdkError> {
        Ok(self.favorites.toggle(id)?)
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    // ── Conversion ───────────────────────────────────────────────────────

    /// The conversion orchestrator, with its choices synced to the current
    /// asset collection.
    pub async fn converter(&self) -> &ConversionOrchestrator<S> {
        let snapshot = self.repository.snapshot();
        self.converter.sync_choices(snapshot.status.assets()).await;
        &self.converter
    }

    // ── Overview ─────────────────────────────────────────────────────────

    pub fn overview(&self) -> MarketOverview {
        MarketOverview::from_assets(self.repository.snapshot().status.assets())
    }

    pub fn top_movers(&self, n: usize) -> (Vec<Asset>, Vec<Asset>) {
        overview::top_movers(self.repository.snapshot().status.assets(), n)
    }
}
