//! Runtime configuration.
//!
//! Loaded from a YAML file passed with `--config`. Every field has a
//! default, so a missing key (or no file at all) falls back to the values
//! below, and command-line flags override whatever the file says.
//!
//! ```yaml
//! base_url: https://finviz.com
//! request_delay_ms: 1000
//! max_retries: 3
//! retry_base_delay_ms: 500
//! summary_window_days: 7
//! aliases:
//!   PLTR: [PALANTIR]
//! sentiment:
//!   classifier: false
//! ```

use crate::extract::relevance::AliasTable;
use crate::scrapers::finviz::DEFAULT_BASE_URL;
use crate::sentiment::SentimentSettings;
use crate::sentiment::aggregate::DEFAULT_WINDOW_DAYS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

/// Desktop browser user agent; the site rejects obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Settings for one batch run. Missing keys take the [`Default`] values.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Pause between consecutive symbols.
    pub request_delay_ms: u64,
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
    /// Extra symbol → company-name aliases merged over the built-in table.
    pub aliases: BTreeMap<String, Vec<String>>,
    pub summary_window_days: u32,
    pub sentiment: SentimentSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_delay_ms: 1000,
            max_retries: 3,
            retry_base_delay_ms: 500,
            aliases: BTreeMap::new(),
            summary_window_days: DEFAULT_WINDOW_DAYS,
            sentiment: SentimentSettings::default(),
        }
    }
}

impl AppConfig {
    /// Read and parse a YAML config file.
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let text = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&text)?;
        info!(base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    /// Parse YAML text. Empty or whitespace-only text yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Built-in aliases plus the configured ones.
    pub fn alias_table(&self) -> AliasTable {
        let mut table = AliasTable::builtin();
        for (symbol, names) in &self.aliases {
            table.extend(symbol, names);
        }
        table
    }

    /// Pause between consecutive symbols.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// First retry delay; later retries double it.
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}
