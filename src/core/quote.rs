//! Quote and price history types, and the upstream market data abstraction

use crate::core::analytics;
use crate::core::error::QuoteError;
use crate::core::fundamentals::Fundamentals;
use crate::core::symbol::Symbol;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Lookback windows supported by the history view.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum HistoryPeriod {
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
    Max,
}

impl HistoryPeriod {
    pub const ALL: [HistoryPeriod; 7] = [
        HistoryPeriod::OneMonth,
        HistoryPeriod::ThreeMonths,
        HistoryPeriod::SixMonths,
        HistoryPeriod::OneYear,
        HistoryPeriod::TwoYears,
        HistoryPeriod::FiveYears,
        HistoryPeriod::Max,
    ];

    /// The `range` value understood by the chart API.
    pub fn as_range(&self) -> &'static str {
        match self {
            HistoryPeriod::OneMonth => "1mo",
            HistoryPeriod::ThreeMonths => "3mo",
            HistoryPeriod::SixMonths => "6mo",
            HistoryPeriod::OneYear => "1y",
            HistoryPeriod::TwoYears => "2y",
            HistoryPeriod::FiveYears => "5y",
            HistoryPeriod::Max => "max",
        }
    }
}

impl Display for HistoryPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_range())
    }
}

impl FromStr for HistoryPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        HistoryPeriod::ALL
            .into_iter()
            .find(|p| p.as_range() == wanted)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid history period: {} (expected one of 1mo, 3mo, 6mo, 1y, 2y, 5y, max)",
                    s
                )
            })
    }
}

/// Descriptive fields that come along with a quote. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteDetails {
    pub currency: Option<String>,
    pub long_name: Option<String>,
    pub exchange: Option<String>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub volume: Option<u64>,
}

/// What an upstream provider answers for a quote lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSnapshot {
    pub price: Option<f64>,
    pub previous_close: Option<f64>,
    /// Name of the provider that served the values.
    pub source: String,
    pub details: QuoteDetails,
}

impl QuoteSnapshot {
    pub fn has_usable_fields(&self) -> bool {
        self.price.is_some() || self.previous_close.is_some()
    }
}

/// One priced observation of a symbol, stamped with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: Option<f64>,
    pub previous_close: Option<f64>,
    pub observed_at: DateTime<Utc>,
    pub source: String,
    pub details: QuoteDetails,
}

impl Quote {
    pub fn from_snapshot(
        symbol: Symbol,
        snapshot: QuoteSnapshot,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Quote {
            symbol,
            price: snapshot.price,
            previous_close: snapshot.previous_close,
            observed_at,
            source: snapshot.source,
            details: snapshot.details,
        }
    }

    /// Percent change of `price` against `previous_close`.
    pub fn change_percent(&self) -> Result<f64, QuoteError> {
        analytics::percent_change(self.price, self.previous_close)
    }

    /// The price if known, otherwise the previous close.
    pub fn display_price(&self) -> Option<f64> {
        self.price.or(self.previous_close)
    }
}

/// One daily OHLCV record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily bars for one symbol over a lookback window, ordered by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    pub symbol: Symbol,
    pub period: HistoryPeriod,
    pub source: String,
    pub bars: Vec<Bar>,
}

impl HistorySeries {
    pub fn new(symbol: Symbol, period: HistoryPeriod, source: &str, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        HistorySeries {
            symbol,
            period,
            source: source.to_string(),
            bars,
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short provider name, reported as the provenance of what it serves.
    fn name(&self) -> &str;

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<QuoteSnapshot>;

    async fn fetch_history(&self, symbol: &Symbol, period: HistoryPeriod) -> Result<HistorySeries>;

    /// Company profile and valuation figures. Providers without them keep the default.
    async fn fetch_fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals> {
        anyhow::bail!("{} does not serve fundamentals for {}", self.name(), symbol)
    }
}
