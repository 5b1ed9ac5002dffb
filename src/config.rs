//! Pipeline configuration
//!
//! Concurrency/timing knobs, the storefront endpoints, and the selector
//! cascades. Selectors are configuration data, not logic: the extractor only
//! ever walks an ordered list of strings, so a changed page layout is a
//! config edit and the whole pipeline stays testable against a fake engine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};

/// Storefront endpoints and browser identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Scheme + host, no trailing slash.
    pub base_url: String,
    /// Search path template; `{query}` is replaced with the encoded query.
    pub search_path: String,
    /// User agent pinned on every session.
    pub user_agent: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.amazon.com".to_string(),
            search_path: "/s?k={query}&i=digital-music".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Absolute digital-music search URL for a raw query string.
    pub fn search_url(&self, query: &str) -> String {
        let encoded = urlencoding::encode(query);
        format!(
            "{}{}",
            self.base_url,
            self.search_path.replace("{query}", &encoded)
        )
    }

    /// Resolve a possibly relative product link against the storefront host.
    pub fn absolutize(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }
}

/// Ordered selector cascades for every extraction step.
///
/// Each list is tried front to back; the first selector yielding a usable
/// result wins. The defaults target the storefront's current digital-music
/// markup and can be replaced wholesale from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Search result containers.
    pub results: Vec<String>,
    /// Result title, looked up within one result container.
    pub titles: Vec<String>,
    /// Product link, looked up within one result container.
    pub links: Vec<String>,
    /// Track price locations on the product page.
    pub track_prices: Vec<String>,
    /// Album price locations on the product page (opportunistic).
    pub album_prices: Vec<String>,
    /// Album title locations on the product page (opportunistic).
    pub album_titles: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            results: vec![
                "div.s-result-item[data-component-type='s-search-result']".to_string(),
                "div.s-result-item[data-asin]".to_string(),
                "div[data-asin]".to_string(),
            ],
            titles: vec![
                "h2 a span".to_string(),
                "h2 span".to_string(),
                "span.a-size-medium".to_string(),
                "span.a-text-normal".to_string(),
            ],
            links: vec![
                "h2 a".to_string(),
                "a.a-link-normal.s-no-outline".to_string(),
                "a.a-link-normal".to_string(),
            ],
            track_prices: vec![
                "#declarative_digital_music_track span.a-color-price".to_string(),
                "span.a-price span.a-offscreen".to_string(),
                "span.a-color-price".to_string(),
                "#price".to_string(),
            ],
            album_prices: vec![
                "#declarative_digital_music_album span.a-color-price".to_string(),
                "#buybox-album span.a-color-price".to_string(),
                "div.album-purchase span.a-price span.a-offscreen".to_string(),
            ],
            album_titles: vec![
                "#productTitle".to_string(),
                "#dmusic_title".to_string(),
                "h1 span.a-size-large".to_string(),
            ],
        }
    }
}

impl SelectorConfig {
    /// Load a cascade set from a JSON file, replacing the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        if config.results.is_empty() || config.titles.is_empty() || config.track_prices.is_empty() {
            return Err(PipelineError::invalid_input(format!(
                "selector file {} must define results, titles and track_prices cascades",
                path.as_ref().display()
            )));
        }
        Ok(config)
    }
}

/// Everything the scheduler and the extractor need to run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of parallel browsing sessions (chunk size).
    pub concurrency: usize,
    /// Politeness delay between chunks.
    pub chunk_delay: Duration,
    /// Politeness delay after each item in sequential mode.
    pub item_delay: Duration,
    /// Hard deadline for one item's whole extraction.
    pub item_timeout: Duration,
    /// Re-runs for items that finalize unavailable (0 = never retry).
    pub max_retries: u32,
    /// Force one item at a time regardless of `concurrency`.
    pub sequential: bool,
    /// Reorder observations to input order before reporting.
    pub restore_input_order: bool,
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Settle pause after navigations.
    pub settle_delay: Duration,
    /// Bounded wait for one selector lookup / element read.
    pub lookup_timeout: Duration,
    /// How many leading search results to scan.
    pub max_results_scanned: usize,
    /// Below this result count the query is refined once.
    pub min_results_before_refine: usize,
    pub storefront: StorefrontConfig,
    pub selectors: SelectorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            chunk_delay: Duration::from_secs(3),
            item_delay: Duration::from_secs(5),
            item_timeout: Duration::from_secs(90),
            max_retries: 0,
            sequential: false,
            restore_input_order: true,
            headless: true,
            settle_delay: Duration::from_millis(2000),
            lookup_timeout: Duration::from_millis(5000),
            max_results_scanned: 5,
            min_results_before_refine: 3,
            storefront: StorefrontConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Effective worker count: sequential mode always runs one session.
    pub fn effective_concurrency(&self) -> usize {
        if self.sequential {
            1
        } else {
            self.concurrency.max(1)
        }
    }
}
