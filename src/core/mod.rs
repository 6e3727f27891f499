//! Core domain types and pure calculations

pub mod analytics;
pub mod boardroom;
pub mod clock;
pub mod config;
pub mod error;
pub mod fundamentals;
pub mod log;
pub mod news;
pub mod quote;
pub mod symbol;

// Re-export main types for cleaner imports
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::QuoteError;
pub use fundamentals::Fundamentals;
pub use news::{NewsItem, NewsProvider};
pub use quote::{
    Bar, HistoryPeriod, HistorySeries, MarketDataProvider, Quote, QuoteDetails, QuoteSnapshot,
};
pub use symbol::Symbol;
