//! Normalized current-weather report.
//!
//! Both providers produce this shape; it is what the cache stores and what
//! the API returns under `data`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Units;

/// Geographic coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

/// Current conditions at observation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Temperature, rounded to one decimal
    pub temperature: f64,
    /// Apparent temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    /// Minimum observed temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<f64>,
    /// Maximum observed temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<f64>,
    /// Relative humidity, percent (0-100)
    pub humidity: u8,
    /// Atmospheric pressure, hPa
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<u32>,
    /// Visibility in metres, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<u32>,
    /// Human-readable description, title-cased
    pub description: String,
    /// Provider icon code (e.g. "02d")
    pub icon: String,
    /// Wind speed in the report's units, never negative
    pub wind_speed: f64,
    /// Wind direction in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<u16>,
}

/// Unit labels attached to a report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitLabels {
    /// Unit system the values are expressed in
    pub system: Units,
    /// Temperature symbol (°C, °F, K)
    pub temperature: String,
    /// Wind speed unit (m/s, mph)
    pub wind_speed: String,
    /// Pressure unit
    pub pressure: String,
}

impl From<Units> for UnitLabels {
    fn from(units: Units) -> Self {
        Self {
            system: units,
            temperature: units.temperature_symbol().to_string(),
            wind_speed: units.wind_speed_unit().to_string(),
            pressure: "hPa".to_string(),
        }
    }
}

/// Sunrise and sunset, UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunTimes {
    /// Sunrise instant
    pub sunrise: DateTime<Utc>,
    /// Sunset instant
    pub sunset: DateTime<Utc>,
}

/// Normalized current weather for one city.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Display name, e.g. "London, GB"
    pub city: String,
    /// Coordinates, when the provider reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Current conditions
    pub current: CurrentConditions,
    /// Unit labels
    pub units: UnitLabels,
    /// Sunrise/sunset, when the provider reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun: Option<SunTimes>,
    /// When this report was produced
    pub timestamp: DateTime<Utc>,
    /// Provider name
    pub source: String,
    /// Set for synthetic data from the mock provider
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_mock_data: bool,
}
