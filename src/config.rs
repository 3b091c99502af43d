//! Configuration loader: merges env vars, .env file, and config.toml.

use common::config::DashboardConfig;
use common::Error;
use std::net::SocketAddr;
use std::path::Path;

fn parse_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number")))
}

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_i64(raw: &str, env_name: &str) -> Result<i64, Error> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer")))
}

pub fn validate_config(config: &DashboardConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.api_key.trim().is_empty() {
        issues.push("OPENWEATHER_API_KEY is required (set in .env or environment)".into());
    }
    if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
        issues.push("base_url must start with http:// or https://".into());
    }

    if config.location.name.trim().is_empty() {
        issues.push("location.name must not be empty".into());
    }
    if !(-90.0..=90.0).contains(&config.location.lat) {
        issues.push("location.lat must be in [-90,90]".into());
    }
    if !(-180.0..=180.0).contains(&config.location.lon) {
        issues.push("location.lon must be in [-180,180]".into());
    }
    if config.location.history_start < 0 {
        issues.push("location.history_start must be >= 0".into());
    }

    if config.server.bind.parse::<SocketAddr>().is_err() {
        issues.push(format!(
            "server.bind '{}' is not a socket address",
            config.server.bind
        ));
    }
    if config.cache.ttl_secs == 0 {
        issues.push("cache.ttl_secs must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply environment overrides through `lookup` (normally `std::env::var`).
fn apply_env_overrides(
    config: &mut DashboardConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), Error> {
    if let Some(key) = lookup("OPENWEATHER_API_KEY") {
        config.api_key = key.trim().to_string();
    }
    if let Some(url) = lookup("OPENWEATHER_BASE_URL") {
        config.base_url = url.trim().to_string();
    }
    if let Some(bind) = lookup("DASHBOARD_BIND") {
        config.server.bind = bind.trim().to_string();
    }
    if let Some(raw) = lookup("DASHBOARD_CACHE_TTL_SECS") {
        config.cache.ttl_secs = parse_positive_u64(&raw, "DASHBOARD_CACHE_TTL_SECS")?;
    }
    if let Some(name) = lookup("DASHBOARD_LOCATION_NAME") {
        config.location.name = name.trim().to_string();
    }
    if let Some(raw) = lookup("DASHBOARD_LAT") {
        config.location.lat = parse_f64(&raw, "DASHBOARD_LAT")?;
    }
    if let Some(raw) = lookup("DASHBOARD_LON") {
        config.location.lon = parse_f64(&raw, "DASHBOARD_LON")?;
    }
    if let Some(raw) = lookup("DASHBOARD_HISTORY_START") {
        config.location.history_start = parse_i64(&raw, "DASHBOARD_HISTORY_START")?;
    }
    Ok(())
}

/// Load dashboard configuration from environment and optional config file.
pub fn load_config() -> Result<DashboardConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = DashboardConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    validate_config(&config)?;

    Ok(config)
}
