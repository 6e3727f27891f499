use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::news::{NewsItem, NewsProvider};
use crate::core::symbol::Symbol;
use crate::providers::util::{http_client, with_retry};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: String,
    link: String,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source: Option<ItemSource>,
}

#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "$text")]
    name: String,
}

impl From<Item> for NewsItem {
    fn from(item: Item) -> Self {
        let published = item
            .pub_date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc2822(d.trim()).ok())
            .map(|d| d.with_timezone(&Utc));
        NewsItem {
            title: item.title.trim().to_string(),
            published,
            link: item.link.trim().to_string(),
            publisher: item.source.map(|s| s.name.trim().to_string()),
        }
    }
}

fn parse_feed(xml: &str) -> Result<Vec<NewsItem>> {
    let rss: Rss = quick_xml::de::from_str(xml).context("Failed to parse RSS feed")?;
    Ok(rss.channel.items.into_iter().map(NewsItem::from).collect())
}

/// Headline search over the Google News RSS endpoint.
pub struct GoogleNewsProvider {
    base_url: String,
}

impl GoogleNewsProvider {
    pub fn new(base_url: &str) -> Self {
        GoogleNewsProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl NewsProvider for GoogleNewsProvider {
    #[instrument(name = "GoogleNewsFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_news(&self, symbol: &Symbol, limit: usize) -> Result<Vec<NewsItem>> {
        let url = format!(
            "{}/rss/search?q={}+stock+OR+earnings&hl=en-US&gl=US&ceid=US:en",
            self.base_url,
            symbol.url_encoded()
        );
        debug!("Requesting news feed from {}", url);

        let client = http_client()?;
        let response = with_retry(|| client.get(&url).send(), 1, 250)
            .await
            .with_context(|| format!("Request error for news on {symbol}"))?;

        if !response.status().is_success() {
            bail!("HTTP error: {} for news on {}", response.status(), symbol);
        }

        let body = response.text().await?;
        let mut items = parse_feed(&body).with_context(|| format!("Bad news feed for {symbol}"))?;
        items.truncate(limit);
        Ok(items)
    }
}
