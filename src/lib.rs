pub mod cli;
pub mod core;
pub mod providers;
pub mod refresh;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::news::NewsProvider;
use crate::core::quote::{HistoryPeriod, MarketDataProvider};
use crate::providers::caching::QuoteCache;
use crate::providers::fallback::FallbackProvider;
use crate::providers::google_news::GoogleNewsProvider;
use crate::providers::yahoo_finance::YahooFinanceProvider;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Quote {
        symbols: Vec<String>,
    },
    History {
        symbol: Option<String>,
        period: HistoryPeriod,
        rows: usize,
    },
    News {
        symbol: Option<String>,
        limit: usize,
    },
    Watch {
        symbol: Option<String>,
        interval_secs: Option<u64>,
        count: Option<usize>,
    },
    Fundamentals {
        symbol: Option<String>,
    },
    Boardroom {
        symbol: Option<String>,
    },
    Consensus,
}

/// Shared state for one command invocation.
pub struct App {
    pub config: AppConfig,
    pub cache: Arc<QuoteCache>,
    pub news: Arc<dyn NewsProvider>,
}

impl App {
    pub fn from_config(config: AppConfig) -> Self {
        let primary: Arc<dyn MarketDataProvider> =
            Arc::new(YahooFinanceProvider::new(config.providers.yahoo_url()));
        let provider: Arc<dyn MarketDataProvider> = match &config.providers.fallback {
            Some(fallback) => {
                debug!("Using fallback provider at {}", fallback.base_url);
                let secondary = Arc::new(YahooFinanceProvider::with_name(
                    "yahoo-fallback",
                    &fallback.base_url,
                ));
                Arc::new(FallbackProvider::new(primary, secondary))
            }
            None => primary,
        };
        let news = Arc::new(GoogleNewsProvider::new(config.providers.news_url()));

        App {
            cache: Arc::new(QuoteCache::new(provider)),
            news,
            config,
        }
    }

    fn symbol_or_default(&self, symbol: Option<String>) -> String {
        symbol.unwrap_or_else(|| self.config.default_symbol.clone())
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Sentinel starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = App::from_config(config);

    match command {
        AppCommand::Quote { symbols } => {
            let symbols = if symbols.is_empty() {
                vec![app.config.default_symbol.clone()]
            } else {
                symbols
            };
            cli::quote::run(&app, &symbols).await
        }
        AppCommand::History {
            symbol,
            period,
            rows,
        } => {
            let symbol = app.symbol_or_default(symbol);
            cli::history::run(&app, &symbol, period, rows).await
        }
        AppCommand::News { symbol, limit } => {
            let symbol = app.symbol_or_default(symbol);
            cli::news::run(&app, &symbol, limit).await
        }
        AppCommand::Watch {
            symbol,
            interval_secs,
            count,
        } => {
            let symbol = app.symbol_or_default(symbol);
            let interval = interval_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| app.config.refresh_interval());
            cli::watch::run(&app, &symbol, interval, count).await
        }
        AppCommand::Fundamentals { symbol } => {
            let symbol = app.symbol_or_default(symbol);
            cli::fundamentals::run(&app, &symbol).await
        }
        AppCommand::Boardroom { symbol } => {
            let symbol = app.symbol_or_default(symbol);
            cli::boardroom::run_debate(&app, &symbol).await
        }
        AppCommand::Consensus => cli::boardroom::run_consensus(&app),
    }
}
