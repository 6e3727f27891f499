use crate::core::boardroom::{ScenarioView, default_panel};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_NEWS_URL: &str = "https://news.google.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NewsProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
    /// Second Yahoo-compatible host tried when the primary fails.
    pub fallback: Option<YahooProviderConfig>,
    pub news: Option<NewsProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: DEFAULT_YAHOO_URL.to_string(),
            }),
            fallback: None,
            news: Some(NewsProviderConfig {
                base_url: DEFAULT_NEWS_URL.to_string(),
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn yahoo_url(&self) -> &str {
        self.yahoo
            .as_ref()
            .map_or(DEFAULT_YAHOO_URL, |p| p.base_url.as_str())
    }

    pub fn news_url(&self) -> &str {
        self.news
            .as_ref()
            .map_or(DEFAULT_NEWS_URL, |p| p.base_url.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// Validity window for live quotes.
    pub quote_ttl_secs: u64,
    /// Validity window for daily price history.
    pub history_ttl_secs: u64,
    /// Validity window for company fundamentals.
    pub fundamentals_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            quote_ttl_secs: 60,
            history_ttl_secs: 3600,
            fundamentals_ttl_secs: 3600,
        }
    }
}

impl CacheConfig {
    pub fn quote_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_ttl_secs)
    }

    pub fn history_ttl(&self) -> Duration {
        Duration::from_secs(self.history_ttl_secs)
    }

    pub fn fundamentals_ttl(&self) -> Duration {
        Duration::from_secs(self.fundamentals_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig { interval_secs: 5 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BoardroomConfig {
    pub panel: Vec<ScenarioView>,
}

impl Default for BoardroomConfig {
    fn default() -> Self {
        BoardroomConfig {
            panel: default_panel(),
        }
    }
}

fn default_symbol() -> String {
    "AAPL".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_symbol")]
    pub default_symbol: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub boardroom: BoardroomConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_symbol: default_symbol(),
            providers: ProvidersConfig::default(),
            cache: CacheConfig::default(),
            refresh: RefreshConfig::default(),
            boardroom: BoardroomConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults if
    /// no file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "sentinel", "sentinel")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_document() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.default_symbol, "AAPL");
        assert_eq!(config.providers.yahoo_url(), DEFAULT_YAHOO_URL);
        assert_eq!(config.providers.news_url(), DEFAULT_NEWS_URL);
        assert!(config.providers.fallback.is_none());
        assert_eq!(config.cache.quote_ttl(), Duration::from_secs(60));
        assert_eq!(config.cache.history_ttl(), Duration::from_secs(3600));
        assert_eq!(config.cache.fundamentals_ttl(), Duration::from_secs(3600));
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
        assert_eq!(config.boardroom.panel.len(), 3);
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
default_symbol: "NVDA"
providers:
  yahoo:
    base_url: "http://example.com/yahoo"
  fallback:
    base_url: "http://example.com/yahoo2"
  news:
    base_url: "http://example.com/news"
cache:
  quote_ttl_secs: 15
refresh:
  interval_secs: 2
boardroom:
  panel:
    - name: "Solo"
      bull: 0.1
      base: 0.0
      bear: -0.1
      probabilities: [0.25, 0.5, 0.25]
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.default_symbol, "NVDA");
        assert_eq!(config.providers.yahoo_url(), "http://example.com/yahoo");
        assert_eq!(
            config.providers.fallback.as_ref().unwrap().base_url,
            "http://example.com/yahoo2"
        );
        assert_eq!(config.providers.news_url(), "http://example.com/news");
        assert_eq!(config.cache.quote_ttl_secs, 15);
        // unspecified fields inside a section keep their defaults
        assert_eq!(config.cache.history_ttl_secs, 3600);
        assert_eq!(config.cache.fundamentals_ttl_secs, 3600);
        assert_eq!(config.refresh.interval_secs, 2);
        assert_eq!(config.boardroom.panel.len(), 1);
        assert_eq!(config.boardroom.panel[0].probabilities, [0.25, 0.5, 0.25]);
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/definitely/not/here/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
