//! Asset repository — the authoritative fetch status and its refresh loop.

use super::{Asset, AssetCollection};
use crate::quote::QuoteService;
use chrono::Utc;
use futures_util::Stream;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

// ─── FetchStatus ─────────────────────────────────────────────────────────────

/// Repository status. Exactly one is active at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Ready(AssetCollection),
    Failed(String),
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }

    /// The current collection. Only `Ready` exposes one.
    pub fn collection(&self) -> Option<&AssetCollection> {
        match self {
            FetchStatus::Ready(c) => Some(c),
            _ => None,
        }
    }

    /// Current assets, empty unless `Ready`.
    pub fn assets(&self) -> &[Asset] {
        self.collection().map(|c| &c.assets[..]).unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Published read-only view of the repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetSnapshot {
    pub status: FetchStatus,
    /// Sequence number of the fetch whose outcome is applied (0 before any).
    pub revision: u64,
}

// ─── AssetRepository ─────────────────────────────────────────────────────────

/// Owns the asset collection, its fetch lifecycle and periodic refresh.
///
/// Cloning yields another handle onto the same repository. Consumers read
/// snapshots through [`AssetRepository::snapshot`], [`AssetRepository::subscribe`]
/// or [`AssetRepository::updates`]; only the repository writes them.
pub struct AssetRepository<S> {
    service: Arc<S>,
    next_seq: Arc<AtomicU64>,
    in_flight: Arc<AtomicUsize>,
    tx: Arc<watch::Sender<AssetSnapshot>>,
}

impl<S> Clone for AssetRepository<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            next_seq: self.next_seq.clone(),
            in_flight: self.in_flight.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<S: QuoteService> AssetRepository<S> {
    pub fn new(service: Arc<S>) -> Self {
        let (tx, _rx) = watch::channel(AssetSnapshot::default());
        Self {
            service,
            next_seq: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            tx: Arc::new(tx),
        }
    }

    pub fn snapshot(&self) -> AssetSnapshot {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.tx.borrow().status.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AssetSnapshot> {
        self.tx.subscribe()
    }

    /// Stream of snapshots: the current one first, then every change.
    pub fn updates(&self) -> impl Stream<Item = AssetSnapshot> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async_stream::stream! {
            let current = rx.borrow_and_update().clone();
            yield current;
            while rx.changed().await.is_ok() {
                let next = rx.borrow_and_update().clone();
                yield next;
            }
        }
    }

    /// Fetch the listing now and apply the outcome.
    ///
    /// Overlapping calls all proceed; an outcome older than the one already
    /// applied is dropped.
    pub async fn fetch_now(&self) -> AssetSnapshot {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let mut previous = FetchStatus::Idle;
        self.tx.send_modify(|snap| {
            previous = std::mem::replace(&mut snap.status, FetchStatus::Loading);
        });
        let mut in_flight = InFlight::enter(&self.tx, &self.in_flight, previous);
        tracing::debug!(seq, "Fetching asset listing");

        let status = match self.service.list_assets().await {
            Ok(assets) => {
                tracing::debug!(seq, count = assets.len(), "Asset listing received");
                FetchStatus::Ready(AssetCollection::new(assets, Utc::now()))
            }
            Err(err) => {
                tracing::warn!(seq, error = %err, "Asset fetch failed");
                FetchStatus::Failed(err.user_message())
            }
        };

        in_flight.complete();
        self.apply(seq, status);
        self.snapshot()
    }

    /// User-triggered refetch from the error surface.
    pub async fn retry(&self) -> AssetSnapshot {
        self.fetch_now().await
    }

    fn apply(&self, seq: u64, status: FetchStatus) -> bool {
        self.tx.send_if_modified(|snap| {
            if seq < snap.revision {
                tracing::warn!(seq, applied = snap.revision, "Discarding stale asset listing");
                return false;
            }
            snap.status = status;
            snap.revision = seq;
            true
        })
    }
}

impl<S: QuoteService + 'static> AssetRepository<S> {
    /// Start periodic refresh: one fetch immediately, then one per `interval`.
    ///
    /// Ticks never wait on an in-flight fetch. The timer and any in-flight
    /// fetches are released when the returned guard is dropped.
    pub fn start(&self, interval: Duration) -> PollGuard {
        let repo = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut in_flight = JoinSet::new();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let repo = repo.clone();
                        in_flight.spawn(async move {
                            repo.fetch_now().await;
                        });
                    }
                    Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                }
            }
        });

        tracing::info!(interval_secs = interval.as_secs(), "Asset polling started");
        PollGuard {
            handle: Some(handle),
        }
    }
}

// ─── InFlight ────────────────────────────────────────────────────────────────

/// Tracks one running fetch. If the last running fetch is dropped before it
/// completes, the `Loading` it published is rolled back to the status it
/// replaced.
struct InFlight<'a> {
    tx: &'a watch::Sender<AssetSnapshot>,
    count: &'a AtomicUsize,
    previous: Option<FetchStatus>,
}

impl<'a> InFlight<'a> {
    fn enter(
        tx: &'a watch::Sender<AssetSnapshot>,
        count: &'a AtomicUsize,
        previous: FetchStatus,
    ) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self {
            tx,
            count,
            previous: Some(previous),
        }
    }

    fn complete(&mut self) {
        self.previous = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let last = self.count.fetch_sub(1, Ordering::SeqCst) == 1;
        let Some(previous) = self.previous.take() else {
            return;
        };
        if !last {
            return;
        }
        self.tx.send_if_modified(|snap| {
            if !snap.status.is_loading() {
                return false;
            }
            snap.status = if previous.is_loading() {
                FetchStatus::Idle
            } else {
                previous
            };
            tracing::debug!(revision = snap.revision, "Cancelled fetch rolled back Loading");
            true
        });
    }
}

// ─── PollGuard ───────────────────────────────────────────────────────────────

/// Scoped ownership of the refresh timer. Dropping it stops polling.
pub struct PollGuard {
    handle: Option<JoinHandle<()>>,
}

impl PollGuard {
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop polling now.
    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::info!("Asset polling stopped");
        }
    }
}

impl Drop for PollGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversion::{ConversionRequest, ConversionResult};
    use crate::error::{HttpError, SdkError};
    use crate::shared::AssetId;
    use async_lock::Mutex;
    use async_trait::async_trait;
    use futures_util::StreamExt;
    use rust_decimal::Decimal;
    use std::collections::VecDeque;

    fn asset(id: i64, symbol: &str, market_cap: i64) -> Asset {
        Asset {
            id: AssetId::Num(id),
            name: symbol.to_lowercase(),
            symbol: symbol.into(),
            price: Decimal::ONE,
            percent_change_24h: Decimal::ZERO,
            percent_change_7d: Decimal::ZERO,
            market_cap: Decimal::from(market_cap),
            volume_24h: Decimal::ZERO,
            circulating_supply: Decimal::ZERO,
        }
    }

    /// Replies from a script; each reply may be delayed.
    struct Scripted {
        replies: Mutex<VecDeque<(Duration, Result<Vec<Asset>, u16>)>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(replies: Vec<(Duration, Result<Vec<Asset>, u16>)>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl QuoteService for Scripted {
        async fn list_assets(&self) -> Result<Vec<Asset>, SdkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.replies.lock().await.pop_front();
            let (delay, reply) = next.unwrap_or((Duration::ZERO, Ok(Vec::new())));
            tokio::time::sleep(delay).await;
            reply.map_err(|status| {
                match status {
                    403 => HttpError::Forbidden(String::new()),
                    429 => HttpError::RateLimited { retry_after_ms: None },
                    _ => HttpError::ServerError { status, body: String::new() },
                }
                .into()
            })
        }

        async fn convert(&self, _: &ConversionRequest) -> Result<ConversionResult, SdkError> {
            Err(SdkError::Other("unused".into()))
        }
    }

    #[tokio::test]
    async fn test_fetch_success_replaces_collection() {
        let service = Scripted::new(vec![
            (Duration::ZERO, Ok(vec![asset(1, "BTC", 900), asset(2, "ETH", 400)])),
            (Duration::ZERO, Ok(vec![asset(3, "SOL", 50)])),
        ]);
        let repo = AssetRepository::new(service);
        assert_eq!(repo.status(), FetchStatus::Idle);

        let snap = repo.fetch_now().await;
        assert_eq!(snap.revision, 1);
        assert_eq!(snap.status.assets().len(), 2);

        let snap = repo.fetch_now().await;
        let symbols: Vec<_> = snap.status.assets().iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, ["SOL"]);
    }

    #[tokio::test]
    async fn test_failure_drops_previous_collection() {
        let service = Scripted::new(vec![
            (Duration::ZERO, Ok(vec![asset(1, "BTC", 900)])),
            (Duration::ZERO, Err(429)),
        ]);
        let repo = AssetRepository::new(service);
        repo.fetch_now().await;
        let snap = repo.retry().await;
        assert_eq!(snap.status.error(), Some("rate limit exceeded, wait and retry"));
        assert!(snap.status.assets().is_empty());
        assert!(snap.status.collection().is_none());
    }

    #[tokio::test]
    async fn test_server_errors_are_normalized() {
        let service = Scripted::new(vec![(Duration::ZERO, Err(500)), (Duration::ZERO, Err(403))]);
        let repo = AssetRepository::new(service);
        assert_eq!(
            repo.fetch_now().await.status.error(),
            Some("server error, try again later")
        );
        assert_eq!(
            repo.fetch_now().await.status.error(),
            Some("request forbidden, check credentials")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        // First fetch is slow and returns old data; second is fast.
        let service = Scripted::new(vec![
            (Duration::from_secs(5), Ok(vec![asset(1, "OLD", 1)])),
            (Duration::from_secs(1), Ok(vec![asset(2, "NEW", 2)])),
        ]);
        let repo = AssetRepository::new(service);

        let slow = tokio::spawn({
            let repo = repo.clone();
            async move { repo.fetch_now().await }
        });
        tokio::task::yield_now().await;
        let fast = repo.fetch_now().await;
        assert_eq!(fast.revision, 2);

        slow.await.unwrap();
        let snap = repo.snapshot();
        assert_eq!(snap.revision, 2);
        assert_eq!(snap.status.assets()[0].symbol, "NEW");
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_fetches_immediately_then_every_interval() {
        let service = Scripted::new(Vec::new());
        let repo = AssetRepository::new(service.clone());

        let guard = repo.start(Duration::from_secs(120));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);

        assert!(guard.is_running());
        drop(guard);
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_continues_after_failure() {
        let service = Scripted::new(vec![
            (Duration::ZERO, Err(500)),
            (Duration::ZERO, Ok(vec![asset(1, "BTC", 900)])),
        ]);
        let repo = AssetRepository::new(service);
        let _guard = repo.start(Duration::from_secs(120));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(repo.status().error().is_some());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(repo.status().assets().len(), 1);
    }

    #[tokio::test]
    async fn test_updates_stream_reports_transitions() {
        let service = Scripted::new(vec![(Duration::ZERO, Ok(vec![asset(1, "BTC", 900)]))]);
        let repo = AssetRepository::new(service);
        let mut updates = Box::pin(repo.updates());

        assert_eq!(updates.next().await.unwrap().status, FetchStatus::Idle);
        repo.fetch_now().await;
        // Intermediate Loading may be coalesced by the watch channel.
        let latest = updates.next().await.unwrap();
        assert_eq!(latest.revision, 1);
        assert!(matches!(latest.status, FetchStatus::Ready(_)));
    }

    #[test]
    fn test_http_error_into_sdk_error() {
        let err: SdkError = HttpError::Timeout.into();
        assert_eq!(err.user_message(), "network/connectivity error");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopping_mid_fetch_restores_previous_status() {
        let service = Scripted::new(vec![
            (Duration::ZERO, Ok(vec![asset(1, "BTC", 900)])),
            (Duration::from_secs(30), Ok(vec![asset(2, "ETH", 400)])),
        ]);
        let repo = AssetRepository::new(service.clone());
        repo.fetch_now().await;

        let guard = repo.start(Duration::from_secs(120));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(repo.status().is_loading());

        drop(guard);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let snap = repo.snapshot();
        assert_eq!(snap.revision, 1);
        assert_eq!(snap.status.assets()[0].symbol, "BTC");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_first_fetch_returns_to_idle() {
        let service = Scripted::new(vec![(Duration::from_secs(30), Ok(Vec::new()))]);
        let repo = AssetRepository::new(service);

        let fetch = tokio::spawn({
            let repo = repo.clone();
            async move { repo.fetch_now().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(repo.status().is_loading());

        fetch.abort();
        assert!(fetch.await.unwrap_err().is_cancelled());
        assert_eq!(repo.status(), FetchStatus::Idle);
    }
}
