use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::fundamentals::Fundamentals;
use crate::core::quote::{
    Bar, HistoryPeriod, HistorySeries, MarketDataProvider, QuoteDetails, QuoteSnapshot,
};
use crate::core::symbol::Symbol;
use crate::providers::util::{http_client, with_retry};

const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 250;

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartEnvelope,
}

#[derive(Deserialize, Debug)]
struct ChartEnvelope {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    currency: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    exchange_name: Option<String>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    regular_market_volume: Option<f64>,
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Ohlcv>,
}

#[derive(Deserialize, Debug, Default)]
struct Ohlcv {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

const SUMMARY_MODULES: &str = concat!(
    "price,summaryProfile,summaryDetail,",
    "defaultKeyStatistics,financialData"
);

#[derive(Deserialize, Debug)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryEnvelope,
}

#[derive(Deserialize, Debug)]
struct SummaryEnvelope {
    result: Option<Vec<SummaryItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SummaryItem {
    #[serde(default)]
    price: PriceModule,
    #[serde(default)]
    summary_profile: ProfileModule,
    #[serde(default)]
    summary_detail: DetailModule,
    #[serde(default)]
    default_key_statistics: KeyStatisticsModule,
    #[serde(default)]
    financial_data: FinancialDataModule,
}

/// Yahoo wraps numbers as `{"raw": 1.2, "fmt": "1.20"}` and sends `{}` when absent.
#[derive(Deserialize, Debug, Default, Clone, Copy)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(value: Option<RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw).filter(|v| v.is_finite())
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    market_cap: Option<RawValue>,
}

#[derive(Deserialize, Debug, Default)]
struct ProfileModule {
    industry: Option<String>,
    website: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct DetailModule {
    beta: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawValue>,
    #[serde(rename = "dividendYield")]
    dividend_yield: Option<RawValue>,
    #[serde(rename = "marketCap")]
    market_cap: Option<RawValue>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    enterprise_value: Option<RawValue>,
    trailing_eps: Option<RawValue>,
    forward_eps: Option<RawValue>,
    profit_margins: Option<RawValue>,
    beta: Option<RawValue>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    return_on_equity: Option<RawValue>,
    profit_margins: Option<RawValue>,
}

fn fundamentals_from_summary(item: SummaryItem, source: &str) -> Fundamentals {
    let SummaryItem {
        price,
        summary_profile: profile,
        summary_detail: detail,
        default_key_statistics: stats,
        financial_data: financials,
    } = item;

    Fundamentals {
        source: source.to_string(),
        long_name: price.long_name.or(price.short_name),
        industry: profile.industry.filter(|s| !s.trim().is_empty()),
        website: profile.website.filter(|s| !s.trim().is_empty()),
        market_cap: raw(price.market_cap).or(raw(detail.market_cap)),
        beta: raw(detail.beta).or(raw(stats.beta)),
        trailing_pe: raw(detail.trailing_pe),
        forward_pe: raw(detail.forward_pe),
        dividend_yield: raw(detail.dividend_yield),
        enterprise_value: raw(stats.enterprise_value),
        trailing_eps: raw(stats.trailing_eps),
        forward_eps: raw(stats.forward_eps),
        profit_margin: raw(financials.profit_margins).or(raw(stats.profit_margins)),
        return_on_equity: raw(financials.return_on_equity),
    }
}

fn value_at(series: &Option<Vec<Option<f64>>>, index: usize) -> Option<f64> {
    series
        .as_ref()
        .and_then(|values| values.get(index).copied().flatten())
}

/// Turns the parallel timestamp/indicator arrays into bars. Rows missing any of
/// open, high, low or close are dropped; a missing volume counts as zero.
fn extract_bars(item: &ChartItem) -> Vec<Bar> {
    let (Some(timestamps), Some(quote)) = (
        item.timestamp.as_ref(),
        item.indicators.as_ref().and_then(|inds| inds.quote.first()),
    ) else {
        return Vec::new();
    };

    timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let date = DateTime::from_timestamp(ts + item.meta.gmtoffset, 0)?.date_naive();
            Some(Bar {
                date,
                open: value_at(&quote.open, i)?,
                high: value_at(&quote.high, i)?,
                low: value_at(&quote.low, i)?,
                close: value_at(&quote.close, i)?,
                volume: value_at(&quote.volume, i).unwrap_or(0.0).max(0.0) as u64,
            })
        })
        .collect()
}

fn snapshot_from_meta(meta: &ChartMeta, source: &str) -> QuoteSnapshot {
    QuoteSnapshot {
        price: meta.regular_market_price,
        previous_close: meta.previous_close.or(meta.chart_previous_close),
        source: source.to_string(),
        details: QuoteDetails {
            currency: meta.currency.clone(),
            long_name: meta.long_name.clone().or_else(|| meta.short_name.clone()),
            exchange: meta.exchange_name.clone(),
            fifty_two_week_high: meta.fifty_two_week_high,
            fifty_two_week_low: meta.fifty_two_week_low,
            volume: meta.regular_market_volume.map(|v| v.max(0.0) as u64),
        },
    }
}

/// Quote and daily history lookups against the Yahoo Finance chart API.
pub struct YahooFinanceProvider {
    name: String,
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str) -> Self {
        Self::with_name("yahoo", base_url)
    }

    pub fn with_name(name: &str, base_url: &str) -> Self {
        YahooFinanceProvider {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, url: &str, symbol: &Symbol) -> Result<(StatusCode, String)> {
        let client = http_client()?;
        let response = with_retry(|| client.get(url).send(), RETRIES, RETRY_DELAY_MS)
            .await
            .with_context(|| format!("Request error for symbol: {symbol} URL: {url}"))?;

        let status = response.status();
        debug!(%status, "Received Yahoo response");
        Ok((status, response.text().await?))
    }

    async fn fetch_summary(&self, symbol: &Symbol) -> Result<SummaryItem> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}",
            self.base_url,
            symbol.url_encoded(),
            SUMMARY_MODULES
        );
        debug!("Requesting quote summary from {}", url);
        let (status, text) = self.get(&url, symbol).await?;

        let data = match serde_json::from_str::<QuoteSummaryResponse>(&text) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                bail!("HTTP error: {} for symbol: {}", status, symbol)
            }
            Err(e) => bail!("Failed to parse quote summary for {}: {}", symbol, e),
        };

        if let Some(err) = data.quote_summary.error {
            bail!(
                "Provider error for {}: {}",
                symbol,
                err.description.unwrap_or(err.code)
            );
        }
        if !status.is_success() {
            bail!("HTTP error: {} for symbol: {}", status, symbol);
        }

        data.quote_summary
            .result
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| anyhow!("No fundamentals found for symbol: {}", symbol))
    }

    async fn fetch_chart(&self, symbol: &Symbol, range: &str) -> Result<ChartItem> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url,
            symbol.url_encoded(),
            range
        );
        debug!("Requesting chart data from {}", url);
        let (status, text) = self.get(&url, symbol).await?;

        let data = match serde_json::from_str::<YahooChartResponse>(&text) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                bail!("HTTP error: {} for symbol: {}", status, symbol)
            }
            Err(e) => bail!("Failed to parse chart response for {}: {}", symbol, e),
        };

        if let Some(err) = data.chart.error {
            bail!(
                "Provider error for {}: {}",
                symbol,
                err.description.unwrap_or(err.code)
            );
        }
        if !status.is_success() {
            bail!("HTTP error: {} for symbol: {}", status, symbol);
        }

        data.chart
            .result
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "YahooQuoteFetch",
        skip(self),
        fields(provider = %self.name, symbol = %symbol)
    )]
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<QuoteSnapshot> {
        // A one-day range makes chartPreviousClose the prior session's close.
        let item = self.fetch_chart(symbol, "1d").await?;
        Ok(snapshot_from_meta(&item.meta, &self.name))
    }

    #[instrument(
        name = "YahooHistoryFetch",
        skip(self),
        fields(provider = %self.name, symbol = %symbol, period = %period)
    )]
    async fn fetch_history(&self, symbol: &Symbol, period: HistoryPeriod) -> Result<HistorySeries> {
        let item = self.fetch_chart(symbol, period.as_range()).await?;
        let bars = extract_bars(&item);
        debug!(bars = bars.len(), "Parsed daily bars");
        Ok(HistorySeries::new(symbol.clone(), period, &self.name, bars))
    }

    #[instrument(
        name = "YahooFundamentalsFetch",
        skip(self),
        fields(provider = %self.name, symbol = %symbol)
    )]
    async fn fetch_fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals> {
        let item = self.fetch_summary(symbol).await?;
        Ok(fundamentals_from_summary(item, &self.name))
    }
}
