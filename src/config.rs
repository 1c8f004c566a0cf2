//! Configuration.
//!
//! Handles loading, validating, and merging `content-nav.toml`. Stock
//! defaults are the base layer; a user file overrides any subset of keys.
//!
//! ## Config File Location
//!
//! Passed with `--config <path>`. Without the flag, `content-nav.toml` in the
//! working directory is used when it exists, and stock defaults otherwise.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [api]
//! base_url = "http://localhost:8080/api/"  # Content API root
//! timeout_ms = 10000                       # Transport timeout per request
//!
//! [navigation]
//! base_path = "/"                          # Section whose pages form the nav tree
//!
//! [search]
//! debounce_ms = 1000                       # Quiet period before a search fires
//! request_timeout_ms = 15000               # 0 = wait indefinitely
//!
//! [toc]
//! header_offset = 80                       # Fixed header height in px
//! highlight_ms = 2000                      # How long a TOC target stays highlighted
//! supplementary_prefix = "supplementary"   # Fallback id prefix for supplementary content
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [search]
//! debounce_ms = 300
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::slug::is_slug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "content-nav.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration. Every section has defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api: ApiConfig,
    pub navigation: NavigationConfig,
    pub search: SearchConfig,
    pub toc: TocConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.api.base_url) {
            Ok(url) if !url.cannot_be_a_base() => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "api.base_url must be an absolute URL, got {:?}",
                    self.api.base_url
                )));
            }
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_ms must be greater than 0".into(),
            ));
        }
        if self.search.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "search.debounce_ms must be greater than 0".into(),
            ));
        }
        if self.toc.highlight_ms == 0 {
            return Err(ConfigError::Validation(
                "toc.highlight_ms must be greater than 0".into(),
            ));
        }
        if !is_slug(&self.toc.supplementary_prefix) {
            return Err(ConfigError::Validation(
                "toc.supplementary_prefix must be a non-empty lowercase slug".into(),
            ));
        }
        Ok(())
    }
}

/// Content API connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Root URL of the content API. Endpoint paths are joined onto it.
    pub base_url: String,
    /// Transport-level timeout per request, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Navigation tree settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Section path sent as `basePath` when fetching the page list.
    pub base_path: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
        }
    }
}

/// Search client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Input must be quiet this long before a request is sent.
    pub debounce_ms: u64,
    /// Upper bound on one search request. 0 waits indefinitely.
    pub request_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            request_timeout_ms: 15_000,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

/// Table-of-contents settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    /// Height of the fixed page header in pixels; scroll targets land below it.
    pub header_offset: u32,
    /// Duration of the highlight on a TOC click target.
    pub highlight_ms: u64,
    /// Fallback id prefix for headings in supplementary content.
    pub supplementary_prefix: String,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            header_offset: 80,
            highlight_ms: 2000,
            supplementary_prefix: crate::toc::DEFAULT_SUPPLEMENTARY_PREFIX.to_string(),
        }
    }
}

impl TocConfig {
    pub fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("cannot serialize defaults: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Load config from `--config`, falling back to `content-nav.toml` in `dir`
/// when present, and to stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    let implicit = dir.join(DEFAULT_CONFIG_FILE);
    if implicit.exists() {
        load_config_file(&implicit)
    } else {
        resolve_config(None)
    }
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# content-nav configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Content API
# ---------------------------------------------------------------------------
[api]
# Root URL of the content API. Endpoint paths are joined onto it.
base_url = "http://localhost:8080/api/"

# Transport timeout per request, in milliseconds.
timeout_ms = 10000

# ---------------------------------------------------------------------------
# Navigation tree
# ---------------------------------------------------------------------------
[navigation]
# Section path sent as basePath when fetching the page list.
base_path = "/"

# ---------------------------------------------------------------------------
# Search
# ---------------------------------------------------------------------------
[search]
# Input must be quiet this long (ms) before a request is sent.
debounce_ms = 1000

# Upper bound on a single search request (ms). 0 waits indefinitely.
request_timeout_ms = 15000

# ---------------------------------------------------------------------------
# Table of contents
# ---------------------------------------------------------------------------
[toc]
# Height of the fixed page header in pixels; scroll targets land below it.
header_offset = 80

# How long (ms) a heading stays highlighted after a TOC click.
highlight_ms = 2000

# Fallback anchor prefix for headings in supplementary content.
supplementary_prefix = "supplementary"
"##
}
