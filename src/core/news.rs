//! Headline feed abstractions

use crate::core::symbol::Symbol;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub published: Option<DateTime<Utc>>,
    pub link: String,
    pub publisher: Option<String>,
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_news(&self, symbol: &Symbol, limit: usize) -> Result<Vec<NewsItem>>;
}
