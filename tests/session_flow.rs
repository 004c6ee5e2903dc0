//! End-to-end session scenarios against a scripted quote service.
//!
//! No network access: the service is an in-process mock that serves a fixed
//! listing and converts at fixed USD prices.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use rust_decimal::Decimal;
use temp_dir::TempDir;

use cryptosphere_sdk::domain::asset::Asset;
use cryptosphere_sdk::domain::conversion::{ConversionRequest, ConversionResult, ConversionStatus};
use cryptosphere_sdk::domain::favorites::{FileStore, KeyValueStore, MemoryStore};
use cryptosphere_sdk::domain::view::SortKey;
use cryptosphere_sdk::error::{FormError, HttpError, SdkError};
use cryptosphere_sdk::network::FAVORITES_KEY;
use cryptosphere_sdk::quote::QuoteService;
use cryptosphere_sdk::session::{MarketSession, SessionConfig};
use cryptosphere_sdk::shared::AssetId;

struct MockMarket {
    assets: Vec<Asset>,
    fail_listing_with: Option<u16>,
    listings: AtomicUsize,
}

impl MockMarket {
    fn new(assets: Vec<Asset>) -> Self {
        Self {
            assets,
            fail_listing_with: None,
            listings: AtomicUsize::new(0),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            fail_listing_with: Some(status),
            ..Self::new(Vec::new())
        }
    }

    fn prices(&self) -> HashMap<&str, Decimal> {
        self.assets.iter().map(|a| (a.symbol.as_str(), a.price)).collect()
    }
}

#[async_trait]
impl QuoteService for MockMarket {
    async fn list_assets(&self) -> Result<Vec<Asset>, SdkError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        match self.fail_listing_with {
            Some(403) => Err(HttpError::Forbidden(String::new()).into()),
            Some(429) => Err(HttpError::RateLimited { retry_after_ms: None }.into()),
            Some(status) => Err(HttpError::ServerError { status, body: String::new() }.into()),
            None => Ok(self.assets.clone()),
        }
    }

    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult, SdkError> {
        let prices = self.prices();
        let (Some(from), Some(to)) = (
            prices.get(request.source.as_str()),
            prices.get(request.target.as_str()),
        ) else {
            return Err(HttpError::BadRequest { status: 400, detail: Some("Unknown symbol".into()) }.into());
        };
        Ok(ConversionResult {
            source: request.source.clone(),
            target: request.target.clone(),
            amount: request.amount,
            value: request.amount * *from / *to,
            computed_at: Utc::now(),
        })
    }
}

fn asset(id: i64, name: &str, symbol: &str, price: i64, market_cap: i64) -> Asset {
    Asset {
        id: AssetId::Num(id),
        name: name.to_string(),
        symbol: symbol.into(),
        price: Decimal::from(price),
        percent_change_24h: Decimal::ZERO,
        percent_change_7d: Decimal::ZERO,
        market_cap: Decimal::from(market_cap),
        volume_24h: Decimal::ZERO,
        circulating_supply: Decimal::ZERO,
    }
}

fn btc_eth() -> Vec<Asset> {
    vec![
        asset(1, "Bitcoin", "BTC", 60000, 900),
        asset(2, "Ethereum", "ETH", 3000, 400),
    ]
}

fn symbols(items: &[Asset]) -> Vec<String> {
    items.iter().map(|a| a.symbol.to_string()).collect()
}

fn session_with(service: MockMarket, storage: impl KeyValueStore + 'static) -> MarketSession<MockMarket> {
    MarketSession::new(Arc::new(service), storage, SessionConfig::default())
}

#[tokio::test]
async fn test_market_cap_then_favorites_only() {
    let mut session = session_with(MockMarket::new(btc_eth()), MemoryStore::new());
    session.fetch_now().await;

    assert_eq!(session.params().sort_key, SortKey::MarketCap);
    assert_eq!(symbols(session.view().current_page_items()), ["BTC", "ETH"]);

    session.toggle_favorite(&AssetId::Num(2)).unwrap();
    session.set_favorites_only(true);
    assert_eq!(symbols(session.view().current_page_items()), ["ETH"]);

    session.set_favorites_only(false);
    session.request_sort(SortKey::MarketCap);
    assert_eq!(symbols(session.view().current_page_items()), ["ETH", "BTC"]);
}

#[tokio::test]
async fn test_failed_fetch_hides_collection_and_retry_recovers() {
    let session = session_with(MockMarket::failing(500), MemoryStore::new());
    let snapshot = session.fetch_now().await;
    assert_eq!(snapshot.status.error(), Some("server error, try again later"));
    assert!(snapshot.status.assets().is_empty());

    let snapshot = session.retry().await;
    assert_eq!(snapshot.revision, 2);
    assert_eq!(session.repository().snapshot(), snapshot);
}

#[tokio::test]
async fn test_conversion_flow_and_history_cap() {
    let session = session_with(MockMarket::new(btc_eth()), MemoryStore::new());
    session.fetch_now().await;
    let converter = session.converter().await;

    assert_eq!(converter.selection().await.0, "BTC");
    let result = converter.convert_selected(0.5).await.unwrap();
    assert_eq!(result.value, Decimal::from(10));
    assert!(matches!(converter.status().await, ConversionStatus::Succeeded(_)));

    for n in 1..=6 {
        converter.submit("ETH", n as f64, "BTC").await.unwrap();
    }
    let history = converter.history().await;
    assert_eq!(history.len(), 5);
    assert_eq!(history[0].result.amount, Decimal::from(6));
    assert_eq!(history[4].result.amount, Decimal::from(2));

    converter.swap().await;
    assert_eq!(converter.selection().await.0, "ETH");
}

#[tokio::test]
async fn test_conversion_validation_order() {
    let session = session_with(MockMarket::new(btc_eth()), MemoryStore::new());
    session.fetch_now().await;
    let converter = session.converter().await;

    let err = converter.submit("", -1.0, "").await.unwrap_err();
    assert!(matches!(err, SdkError::Form(FormError::MissingCurrency)));
    let err = converter.submit("BTC", f64::NAN, "BTC").await.unwrap_err();
    assert!(matches!(err, SdkError::Form(FormError::InvalidAmount)));
    let err = converter.submit("BTC", 1.0, "BTC").await.unwrap_err();
    assert_eq!(err.user_message(), "Cannot convert the same currency");

    assert_eq!(converter.status().await, ConversionStatus::Idle);
    assert!(converter.history().await.is_empty());
}

#[test]
fn test_favorites_survive_restart() {
    let dir = TempDir::new().unwrap();
    tokio_test::block_on(async {
        let mut session = session_with(MockMarket::new(btc_eth()), FileStore::open(dir.path()).unwrap());
        session.fetch_now().await;
        assert_eq!(session.view().total_count(), 2);
        session.toggle_favorite(&AssetId::Num(1)).unwrap();
        session.toggle_favorite(&AssetId::Num(2)).unwrap();
        session.toggle_favorite(&AssetId::Num(2)).unwrap();
    });

    let storage = FileStore::open(dir.path()).unwrap();
    assert_eq!(storage.get(FAVORITES_KEY).unwrap().as_deref(), Some("[1]"));

    let session = session_with(MockMarket::new(btc_eth()), storage);
    assert!(session.is_favorite(&AssetId::Num(1)));
    assert!(!session.is_favorite(&AssetId::Num(2)));
}

#[tokio::test(start_paused = true)]
async fn test_polling_lifecycle() {
    let service = Arc::new(MockMarket::new(btc_eth()));
    let session = MarketSession::new(service.clone(), MemoryStore::new(), SessionConfig::default());
    let updates = session.repository().updates();
    tokio::pin!(updates);

    let guard = session.start();
    // Initial snapshot, then Loading and Ready for the immediate fetch.
    let ready = updates
        .by_ref()
        .filter(|s| std::future::ready(s.status.collection().is_some()))
        .next()
        .await
        .unwrap();
    assert_eq!(ready.status.assets().len(), 2);
    assert_eq!(service.listings.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(120 * 2 + 1)).await;
    assert_eq!(service.listings.load(Ordering::SeqCst), 3);

    drop(guard);
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(service.listings.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_overview_from_session() {
    let session = session_with(MockMarket::new(btc_eth()), MemoryStore::new());
    session.fetch_now().await;
    let overview = session.overview();
    assert_eq!(overview.total_market_cap, Decimal::from(1300));
    assert_eq!(overview.btc_dominance, Some(Decimal::new(692, 1)));
}
