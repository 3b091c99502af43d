//! Dashboard configuration types.

use serde::{Deserialize, Serialize};

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// OpenWeather API key (`appid`).
    #[serde(default)]
    pub api_key: String,

    /// Scheme and host of the OpenWeather API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Location whose history is charted.
    #[serde(default)]
    pub location: LocationConfig,

    /// HTTP server parameters.
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache parameters.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// The single location the dashboard reports on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Human-readable name, used in the page title.
    #[serde(default = "default_location_name")]
    pub name: String,
    /// Latitude.
    #[serde(default = "default_lat")]
    pub lat: f64,
    /// Longitude.
    #[serde(default = "default_lon")]
    pub lon: f64,
    /// Unix seconds of the first requested sample.
    #[serde(default = "default_history_start")]
    pub history_start: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the dashboard.
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a fetched dataset is reused before refetching.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "http://api.openweathermap.org".into()
}

fn default_location_name() -> String {
    "Jakarta".into()
}
fn default_lat() -> f64 {
    -6.1753942
}
fn default_lon() -> f64 {
    106.827183
}
// 2017-01-01 00:00:00 in Jakarta (UTC+7).
fn default_history_start() -> i64 {
    1_483_203_600
}

fn default_bind() -> String {
    "127.0.0.1:8501".into()
}

fn default_cache_ttl() -> u64 {
    2 * 60 * 60
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            location: LocationConfig::default(),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: default_location_name(),
            lat: default_lat(),
            lon: default_lon(),
            history_start: default_history_start(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}
