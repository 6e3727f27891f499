use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::clock::{Clock, SystemClock};
use crate::core::error::QuoteError;
use crate::core::fundamentals::Fundamentals;
use crate::core::quote::{HistoryPeriod, HistorySeries, MarketDataProvider, Quote};
use crate::core::symbol::Symbol;
use crate::store::MemoryCache;

fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Memoizes upstream lookups for a caller-chosen validity window.
///
/// A fresh entry is served without touching the provider. A miss or an expired
/// entry triggers exactly one fetch for that call; concurrent callers for the
/// same expired symbol may each fetch. A failed fetch leaves the previous entry
/// in place and is reported as [`QuoteError::DataUnavailable`].
pub struct QuoteCache {
    provider: Arc<dyn MarketDataProvider>,
    clock: Arc<dyn Clock>,
    quotes: MemoryCache<Symbol, Quote>,
    histories: MemoryCache<(Symbol, HistoryPeriod), HistorySeries>,
    fundamentals: MemoryCache<Symbol, Fundamentals>,
}

impl QuoteCache {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_clock(provider, Arc::new(SystemClock))
    }

    pub fn with_clock(provider: Arc<dyn MarketDataProvider>, clock: Arc<dyn Clock>) -> Self {
        QuoteCache {
            provider,
            clock,
            quotes: MemoryCache::new(),
            histories: MemoryCache::new(),
            fundamentals: MemoryCache::new(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Latest quote for `symbol`, served from cache while younger than `ttl`.
    pub async fn get(&self, symbol: &str, ttl: Duration) -> Result<Quote, QuoteError> {
        let symbol = Symbol::parse(symbol)?;
        self.get_symbol(&symbol, ttl).await
    }

    pub async fn get_symbol(&self, symbol: &Symbol, ttl: Duration) -> Result<Quote, QuoteError> {
        if let Some(quote) = self.quotes.get_fresh(symbol, self.clock.now()) {
            return Ok(quote);
        }

        debug!(%symbol, provider = self.provider.name(), "Fetching quote");
        let snapshot = match self.provider.fetch_quote(symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(%symbol, error = %e, "Quote fetch failed");
                return Err(QuoteError::unavailable(symbol.as_str(), &e));
            }
        };
        if !snapshot.has_usable_fields() {
            return Err(QuoteError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "provider returned neither a price nor a previous close".to_string(),
            });
        }

        let now = self.clock.now();
        let quote = Quote::from_snapshot(symbol.clone(), snapshot, now);
        self.quotes.put(symbol.clone(), quote.clone(), expiry(now, ttl));
        Ok(quote)
    }

    /// Daily bars for `symbol` over `period`, cached per (symbol, period).
    pub async fn history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
        ttl: Duration,
    ) -> Result<HistorySeries, QuoteError> {
        let symbol = Symbol::parse(symbol)?;
        let key = (symbol, period);
        if let Some(series) = self.histories.get_fresh(&key, self.clock.now()) {
            return Ok(series);
        }
        let symbol = &key.0;

        debug!(%symbol, %period, provider = self.provider.name(), "Fetching history");
        let series = match self.provider.fetch_history(symbol, period).await {
            Ok(series) => series,
            Err(e) => {
                warn!(%symbol, %period, error = %e, "History fetch failed");
                return Err(QuoteError::unavailable(symbol.as_str(), &e));
            }
        };
        if series.is_empty() {
            return Err(QuoteError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no daily bars for period {period}"),
            });
        }

        let now = self.clock.now();
        self.histories.put(key.clone(), series.clone(), expiry(now, ttl));
        Ok(series)
    }

    /// Company fundamentals for `symbol`, cached like quotes under their own TTL.
    pub async fn fundamentals(
        &self,
        symbol: &str,
        ttl: Duration,
    ) -> Result<Fundamentals, QuoteError> {
        let symbol = Symbol::parse(symbol)?;
        if let Some(fundamentals) = self.fundamentals.get_fresh(&symbol, self.clock.now()) {
            return Ok(fundamentals);
        }

        debug!(%symbol, provider = self.provider.name(), "Fetching fundamentals");
        let fundamentals = match self.provider.fetch_fundamentals(&symbol).await {
            Ok(fundamentals) => fundamentals,
            Err(e) => {
                warn!(%symbol, error = %e, "Fundamentals fetch failed");
                return Err(QuoteError::unavailable(symbol.as_str(), &e));
            }
        };
        if !fundamentals.has_any_field() {
            return Err(QuoteError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "provider returned no fundamentals".to_string(),
            });
        }

        let now = self.clock.now();
        self.fundamentals.put(symbol, fundamentals.clone(), expiry(now, ttl));
        Ok(fundamentals)
    }

    /// The last quote stored for `symbol`, even if it has expired.
    pub fn last_known(&self, symbol: &Symbol) -> Option<Quote> {
        self.quotes.get_entry(symbol).map(|entry| entry.value)
    }
}
