//! Conversion state containers — history buffer and the submission orchestrator.

use super::{ConversionRequest, ConversionResult, ConversionStatus, HistoryEntry};
use crate::domain::asset::Asset;
use crate::error::{FormError, SdkError};
use crate::quote::QuoteService;
use crate::shared::Symbol;
use async_lock::RwLock;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ─── ConversionHistory ───────────────────────────────────────────────────────

/// Most-recent-first list of successful conversions, capped at `max_size`.
///
/// Entries are only ever prepended; the oldest is evicted past the cap.
#[derive(Debug, Clone)]
pub struct ConversionHistory {
    entries: VecDeque<HistoryEntry>,
    max_size: usize,
}

impl ConversionHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Prepend an entry, evicting the oldest if at capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.max_size == 0 {
            return;
        }
        if self.entries.len() >= self.max_size {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    pub fn entries(&self) -> &VecDeque<HistoryEntry> {
        &self.entries
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// One selectable currency in the conversion form.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyChoice {
    pub symbol: Symbol,
    pub name: String,
}

/// Validate form input. Checks run in order and the first failure wins.
pub fn validate(
    choices: &[CurrencyChoice],
    source: &str,
    amount: f64,
    target: &str,
) -> Result<ConversionRequest, FormError> {
    let known = |s: &str| !s.trim().is_empty() && choices.iter().any(|c| c.symbol == s);
    if !known(source) || !known(target) {
        return Err(FormError::MissingCurrency);
    }

    if !amount.is_finite() || amount <= 0.0 {
        return Err(FormError::InvalidAmount);
    }
    let amount = Decimal::try_from(amount).map_err(|_| FormError::InvalidAmount)?;
    if amount <= Decimal::ZERO {
        return Err(FormError::InvalidAmount);
    }

    if source == target {
        return Err(FormError::SameCurrency);
    }

    Ok(ConversionRequest {
        source: source.into(),
        amount,
        target: target.into(),
    })
}

// ─── ConversionOrchestrator ──────────────────────────────────────────────────

#[derive(Debug)]
struct FormState {
    status: ConversionStatus,
    history: ConversionHistory,
    source: Symbol,
    target: Symbol,
    choices: Vec<CurrencyChoice>,
    /// Sequence number of the submission whose outcome is applied.
    applied: u64,
}

/// Validates, submits and tracks conversions, keeping a bounded history.
///
/// Cloning yields another handle onto the same state.
pub struct ConversionOrchestrator<S> {
    service: Arc<S>,
    state: Arc<RwLock<FormState>>,
    next_seq: Arc<AtomicU64>,
}

impl<S> Clone for ConversionOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            state: self.state.clone(),
            next_seq: self.next_seq.clone(),
        }
    }
}

impl<S: QuoteService> ConversionOrchestrator<S> {
    pub fn new(service: Arc<S>, history_capacity: usize) -> Self {
        Self {
            service,
            state: Arc::new(RwLock::new(FormState {
                status: ConversionStatus::Idle,
                history: ConversionHistory::new(history_capacity),
                source: Symbol::from("BTC"),
                target: Symbol::from("ETH"),
                choices: Vec::new(),
                applied: 0,
            })),
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Replace the selectable currencies from the current asset collection.
    ///
    /// A selection that is no longer listed falls back to the first (source)
    /// or second (target) asset.
    pub async fn sync_choices(&self, assets: &[Asset]) {
        let mut state = self.state.write().await;
        state.choices = assets
            .iter()
            .map(|a| CurrencyChoice {
                symbol: a.symbol.clone(),
                name: a.name.clone(),
            })
            .collect();

        let listed = |s: &Symbol| assets.iter().any(|a| &a.symbol == s);
        if let Some(first) = assets.first() {
            if !listed(&state.source) {
                state.source = first.symbol.clone();
            }
            if !listed(&state.target) {
                state.target = assets.get(1).unwrap_or(first).symbol.clone();
            }
        }
    }

    pub async fn choices(&self) -> Vec<CurrencyChoice> {
        self.state.read().await.choices.clone()
    }

    pub async fn selection(&self) -> (Symbol, Symbol) {
        let state = self.state.read().await;
        (state.source.clone(), state.target.clone())
    }

    pub async fn select_source(&self, symbol: impl Into<Symbol>) {
        self.state.write().await.source = symbol.into();
    }

    pub async fn select_target(&self, symbol: impl Into<Symbol>) {
        self.state.write().await.target = symbol.into();
    }

    /// Exchange source and target. Does not submit.
    pub async fn swap(&self) {
        let mut state = self.state.write().await;
        let state = &mut *state;
        std::mem::swap(&mut state.source, &mut state.target);
    }

    pub async fn status(&self) -> ConversionStatus {
        self.state.read().await.status.clone()
    }

    /// History entries, most recent first.
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.state.read().await.history.entries().iter().cloned().collect()
    }

    /// Submit the current selection.
    pub async fn convert_selected(&self, amount: f64) -> Result<ConversionResult, SdkError> {
        let (source, target) = self.selection().await;
        self.submit(source.as_str(), amount, target.as_str()).await
    }

    /// Validate and submit a conversion.
    ///
    /// Validation failures return [`SdkError::Form`] without touching the
    /// status or the network. A success prepends a history entry.
    pub async fn submit(
        &self,
        source: &str,
        amount: f64,
        target: &str,
    ) -> Result<ConversionResult, SdkError> {
        let request = {
            let state = self.state.read().await;
            validate(&state.choices, source, amount, target)?
        };

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.status = ConversionStatus::Submitting;
        tracing::debug!(seq, source, target, "Submitting conversion");

        let outcome = self.service.convert(&request).await;

        let mut state = self.state.write().await;
        let current = seq >= state.applied;
        if current {
            state.applied = seq;
        } else {
            tracing::warn!(seq, applied = state.applied, "Stale conversion outcome leaves status untouched");
        }

        match outcome {
            Ok(result) => {
                state.history.push(HistoryEntry::new(result.clone()));
                if current {
                    state.status = ConversionStatus::Succeeded(result.clone());
                }
                Ok(result)
            }
            Err(err) => {
                tracing::warn!(seq, error = %err, "Conversion failed");
                if current {
                    state.status = ConversionStatus::Failed(err.user_message());
                }
                Err(err)
            }
        }
    }
}
