//! OpenWeather air-pollution history client.
//!
//! Fetches hourly pollutant history for one location and flattens it into
//! the shared `MeasurementRecord` table format.

use chrono::{DateTime, Utc};
use common::config::LocationConfig;
use common::{Error, MeasurementRecord};
use serde::Deserialize;
use tracing::{debug, info};

const HISTORY_PATH: &str = "/data/2.5/air_pollution/history";
const ERROR_BODY_CHARS: usize = 500;

/// OpenWeather API client.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Response from `air_pollution/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    /// Echo of the requested coordinates. Its shape differs between API
    /// revisions, so it is kept untyped.
    #[serde(default)]
    pub coord: Option<serde_json::Value>,
    #[serde(default)]
    pub list: Vec<HistoryItem>,
}

/// One hourly sample.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryItem {
    /// Unix seconds, UTC.
    pub dt: i64,
    pub main: MainIndex,
    pub components: Components,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainIndex {
    pub aqi: u8,
}

/// Concentrations in μg/m3.
#[derive(Debug, Clone, Deserialize)]
pub struct Components {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nh3: f64,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("air-quality-dashboard/0.1")
            .pool_max_idle_per_host(2)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Http(format!("failed to build OpenWeather HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Fetch the raw pollution history between `start` and `end` (unix seconds).
    pub async fn fetch_history(
        &self,
        lat: f64,
        lon: f64,
        start: i64,
        end: i64,
    ) -> Result<HistoryResponse, Error> {
        let url = format!("{}{}", self.base_url, HISTORY_PATH);
        let query = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("start", start.to_string()),
            ("end", end.to_string()),
            ("appid", self.api_key.clone()),
        ];

        debug!(
            "Fetching OpenWeather pollution history: {} lat={} lon={} start={} end={}",
            url, lat, lon, start, end
        );

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Http(format!("request for ({lat},{lon}) failed: {e}")))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = match resp.text().await {
                Ok(text) => excerpt(&text),
                Err(e) => format!("<body unreadable: {e}>"),
            };
            return Err(Error::OpenWeather(format!(
                "OpenWeather returned {} for ({lat},{lon}): {}",
                status, body
            )));
        }

        resp.json().await.map_err(|e| {
            Error::OpenWeather(format!("JSON parse error for ({lat},{lon}): {e}"))
        })
    }

    /// Fetch the whole history for `location` up to `now` as a flat table.
    pub async fn get_dataset(
        &self,
        location: &LocationConfig,
        now: DateTime<Utc>,
    ) -> Result<Vec<MeasurementRecord>, Error> {
        let history = self
            .fetch_history(
                location.lat,
                location.lon,
                location.history_start,
                now.timestamp(),
            )
            .await?;
        let records = flatten(&history)?;
        info!(
            "Fetched {} pollution samples for {}",
            records.len(),
            location.name
        );
        Ok(records)
    }
}

/// First `ERROR_BODY_CHARS` characters of an error body.
fn excerpt(body: &str) -> String {
    body.chars().take(ERROR_BODY_CHARS).collect()
}

/// Flatten API items into table rows, one per item, preserving order.
pub fn flatten(history: &HistoryResponse) -> Result<Vec<MeasurementRecord>, Error> {
    history
        .list
        .iter()
        .map(|item| {
            let timestamp = DateTime::<Utc>::from_timestamp(item.dt, 0).ok_or_else(|| {
                Error::OpenWeather(format!("timestamp {} out of range", item.dt))
            })?;
            let c = &item.components;
            Ok(MeasurementRecord {
                timestamp,
                aqi: item.main.aqi,
                co: c.co,
                no: c.no,
                no2: c.no2,
                o3: c.o3,
                so2: c.so2,
                pm2_5: c.pm2_5,
                pm10: c.pm10,
                nh3: c.nh3,
            })
        })
        .collect()
}
