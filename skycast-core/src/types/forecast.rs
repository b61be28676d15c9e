//! Normalized multi-day forecast.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UnitLabels;

/// One three-hour forecast slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastItem {
    /// Slot start, as reported by the provider ("YYYY-MM-DD HH:MM:SS")
    pub datetime: String,
    /// Temperature, rounded to one decimal
    pub temperature: f64,
    /// Title-cased description
    pub description: String,
    /// Provider icon code
    pub icon: String,
    /// Relative humidity, percent
    pub humidity: u8,
    /// Wind speed in the forecast's units
    pub wind_speed: f64,
}

/// Forecast for one city.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Display name, e.g. "Paris, FR"
    pub city: String,
    /// Slots in chronological order
    pub forecast: Vec<ForecastItem>,
    /// Unit labels
    pub units: UnitLabels,
    /// When this forecast was produced
    pub timestamp: DateTime<Utc>,
}
