use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::core::fundamentals::Fundamentals;
use crate::core::quote::{HistoryPeriod, HistorySeries, MarketDataProvider, QuoteSnapshot};
use crate::core::symbol::Symbol;

/// Asks `primary` first and `secondary` only when the primary fails or
/// answers with nothing usable.
///
/// Whatever is returned keeps the `source` of the provider that actually
/// answered, so callers can tell a fallback response from a primary one.
pub struct FallbackProvider {
    name: String,
    primary: Arc<dyn MarketDataProvider>,
    secondary: Arc<dyn MarketDataProvider>,
}

impl FallbackProvider {
    pub fn new(
        primary: Arc<dyn MarketDataProvider>,
        secondary: Arc<dyn MarketDataProvider>,
    ) -> Self {
        let name = format!("{}+{}", primary.name(), secondary.name());
        FallbackProvider {
            name,
            primary,
            secondary,
        }
    }

    fn falling_back(&self, symbol: &Symbol, primary_err: &Error) {
        warn!(
            %symbol,
            error = %primary_err,
            "Primary provider {} failed, trying {}",
            self.primary.name(),
            self.secondary.name()
        );
    }

    fn both_failed(&self, primary_err: Error, secondary_err: Error) -> Error {
        anyhow!(
            "{} failed: {:#}; {} failed: {:#}",
            self.primary.name(),
            primary_err,
            self.secondary.name(),
            secondary_err
        )
    }
}

#[async_trait]
impl MarketDataProvider for FallbackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<QuoteSnapshot> {
        let primary_err = match self.primary.fetch_quote(symbol).await {
            Ok(snapshot) if snapshot.has_usable_fields() => return Ok(snapshot),
            Ok(_) => anyhow!("no price or previous close for {}", symbol),
            Err(e) => e,
        };
        self.falling_back(symbol, &primary_err);
        self.secondary
            .fetch_quote(symbol)
            .await
            .map_err(|secondary_err| self.both_failed(primary_err, secondary_err))
    }

    async fn fetch_history(&self, symbol: &Symbol, period: HistoryPeriod) -> Result<HistorySeries> {
        let primary_err = match self.primary.fetch_history(symbol, period).await {
            Ok(series) if !series.is_empty() => return Ok(series),
            Ok(_) => anyhow!("no daily bars for {} over {}", symbol, period),
            Err(e) => e,
        };
        self.falling_back(symbol, &primary_err);
        self.secondary
            .fetch_history(symbol, period)
            .await
            .map_err(|secondary_err| self.both_failed(primary_err, secondary_err))
    }

    async fn fetch_fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals> {
        let primary_err = match self.primary.fetch_fundamentals(symbol).await {
            Ok(fundamentals) if fundamentals.has_any_field() => return Ok(fundamentals),
            Ok(_) => anyhow!("no fundamentals for {}", symbol),
            Err(e) => e,
        };
        self.falling_back(symbol, &primary_err);
        self.secondary
            .fetch_fundamentals(symbol)
            .await
            .map_err(|secondary_err| self.both_failed(primary_err, secondary_err))
    }
}
