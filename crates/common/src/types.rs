//! Domain types shared across the dashboard.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::Error;

// ── Measurement ───────────────────────────────────────────────────────

/// One hourly air-quality sample for the configured location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub timestamp: DateTime<Utc>,
    /// Ordinal AQI index as reported by the source (1 = best, 5 = worst).
    pub aqi: u8,
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nh3: f64,
}

impl MeasurementRecord {
    pub fn category(&self) -> AqiCategory {
        AqiCategory::from_index(self.aqi)
    }

    /// Raw concentration for `pollutant` (μg/m3).
    pub fn value(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::Co => self.co,
            Pollutant::No => self.no,
            Pollutant::No2 => self.no2,
            Pollutant::O3 => self.o3,
            Pollutant::So2 => self.so2,
            Pollutant::Pm25 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            Pollutant::Nh3 => self.nh3,
        }
    }
}

// ── AQI category ──────────────────────────────────────────────────────

/// Air Quality Index category.
///
/// See <https://openweathermap.org/air-pollution-index-levels> for the
/// per-pollutant bands behind each level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiCategory {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
    /// Index outside 1..=5. Source data is not validated, so it is carried through.
    Unknown(u8),
}

impl AqiCategory {
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => AqiCategory::Good,
            2 => AqiCategory::Fair,
            3 => AqiCategory::Moderate,
            4 => AqiCategory::Poor,
            5 => AqiCategory::VeryPoor,
            other => AqiCategory::Unknown(other),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Fair => "Fair",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AqiCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ── Pollutant ─────────────────────────────────────────────────────────

/// One of the eight measured chemical species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "CO")]
    Co,
    #[serde(rename = "NO")]
    No,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "NH3")]
    Nh3,
}

impl Pollutant {
    /// Column order of the flattened table.
    pub const ALL: [Pollutant; 8] = [
        Pollutant::Co,
        Pollutant::No,
        Pollutant::No2,
        Pollutant::O3,
        Pollutant::So2,
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::Nh3,
    ];

    /// Order of the metric tiles on the dashboard.
    pub const DISPLAY_ORDER: [Pollutant; 8] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No,
        Pollutant::No2,
        Pollutant::Co,
        Pollutant::So2,
        Pollutant::O3,
        Pollutant::Nh3,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Co => "CO",
            Pollutant::No => "NO",
            Pollutant::No2 => "NO2",
            Pollutant::O3 => "O3",
            Pollutant::So2 => "SO2",
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::Nh3 => "NH3",
        }
    }

    /// Key under `components` in the OpenWeather payload.
    pub fn api_key(&self) -> &'static str {
        match self {
            Pollutant::Co => "co",
            Pollutant::No => "no",
            Pollutant::No2 => "no2",
            Pollutant::O3 => "o3",
            Pollutant::So2 => "so2",
            Pollutant::Pm25 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::Nh3 => "nh3",
        }
    }

    /// Concentration (μg/m3) above which the air counts as "Poor".
    pub fn poor_limit(&self) -> f64 {
        match self {
            Pollutant::Co => 12400.0,
            Pollutant::No => 100.0,
            Pollutant::No2 => 150.0,
            Pollutant::O3 => 140.0,
            Pollutant::So2 => 250.0,
            Pollutant::Pm25 => 50.0,
            Pollutant::Pm10 => 100.0,
            Pollutant::Nh3 => 200.0,
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Pollutant {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let lowered = raw.trim().to_ascii_lowercase();
        if lowered == "pm25" {
            return Ok(Pollutant::Pm25);
        }
        Pollutant::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(&lowered) || p.api_key() == lowered)
            .ok_or_else(|| Error::InvalidQuery(format!("unknown pollutant '{}'", raw.trim())))
    }
}
