//! Common traits for Skycast.
//!
//! The HTTP layer only talks to a `WeatherProvider`, so the live
//! OpenWeatherMap client and the offline mock are interchangeable.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Forecast, Units, WeatherReport};

/// Interface for fetching weather from an upstream source.
///
/// Implementations might use:
/// - OpenWeatherMap (production)
/// - A fixed city table with random jitter (test mode)
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetches current conditions for `city`.
    ///
    /// Returns `SkycastError::CityNotFound` when the provider has no match.
    async fn current(&self, city: &str, units: Units) -> Result<WeatherReport>;

    /// Fetches a multi-day forecast for `city`.
    ///
    /// `days` is clamped by the implementation to what it can serve.
    async fn forecast(&self, city: &str, units: Units, days: u32) -> Result<Forecast>;

    /// Lists the cities this provider knows about, if it has a closed set.
    ///
    /// Live providers return `None`.
    fn available_cities(&self) -> Option<Vec<String>> {
        None
    }

    /// Short provider name used in logs.
    fn name(&self) -> &'static str;
}
