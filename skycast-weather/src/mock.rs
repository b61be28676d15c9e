//! Offline weather provider for test mode.
//!
//! Serves a fixed table of cities with a little random jitter so repeated
//! calls look like live data. Nothing leaves the process.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, DurationRound, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use skycast_core::constants::{FORECAST_SLOTS_PER_DAY, MAX_FORECAST_DAYS, MS_TO_MPH};
use skycast_core::error::{Result, SkycastError};
use skycast_core::traits::WeatherProvider;
use skycast_core::types::{
    CurrentConditions, Forecast, ForecastItem, UnitLabels, Units, WeatherReport,
};

use crate::format::{round1, title_case};

const SOURCE_NAME: &str = "Mock";
const MOCK_COUNTRY: &str = "Test Country";

/// Baseline conditions for one mock city, metric.
struct MockCity {
    name: &'static str,
    temperature: i32,
    description: &'static str,
    humidity: i32,
    wind_speed: i32,
    icon: &'static str,
}

const MOCK_CITIES: &[MockCity] = &[
    MockCity {
        name: "london",
        temperature: 18,
        description: "Partly cloudy",
        humidity: 65,
        wind_speed: 12,
        icon: "02d",
    },
    MockCity {
        name: "tokyo",
        temperature: 25,
        description: "Sunny",
        humidity: 58,
        wind_speed: 8,
        icon: "01d",
    },
    MockCity {
        name: "new york",
        temperature: 22,
        description: "Light rain",
        humidity: 78,
        wind_speed: 15,
        icon: "10d",
    },
    MockCity {
        name: "paris",
        temperature: 16,
        description: "Overcast",
        humidity: 72,
        wind_speed: 10,
        icon: "04d",
    },
    MockCity {
        name: "sydney",
        temperature: 28,
        description: "Clear sky",
        humidity: 55,
        wind_speed: 18,
        icon: "01d",
    },
    MockCity {
        name: "mumbai",
        temperature: 32,
        description: "Thunderstorm",
        humidity: 85,
        wind_speed: 22,
        icon: "11d",
    },
    MockCity {
        name: "berlin",
        temperature: 14,
        description: "Light snow",
        humidity: 68,
        wind_speed: 14,
        icon: "13d",
    },
    MockCity {
        name: "moscow",
        temperature: -5,
        description: "Heavy snow",
        humidity: 82,
        wind_speed: 25,
        icon: "13d",
    },
];

/// One jittered sample, already converted and clamped.
struct Sample {
    temperature: f64,
    humidity: u8,
    wind_speed: f64,
}

/// Weather provider backed by a fixed city table.
pub struct MockWeatherProvider {
    rng: Mutex<StdRng>,
}

impl MockWeatherProvider {
    /// Creates a provider seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a provider with a fixed seed, for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn lookup(city: &str) -> Result<&'static MockCity> {
        let key = city.trim().to_lowercase();
        MOCK_CITIES
            .iter()
            .find(|c| c.name == key)
            .ok_or_else(|| SkycastError::CityNotFound(city.trim().to_string()))
    }

    /// Applies jitter, converts units, and clamps to physical ranges.
    fn sample(&self, base: &MockCity, units: Units) -> Sample {
        let (dt, dh, dw) = {
            let mut rng = self.rng.lock();
            (
                rng.gen_range(-3..=3),
                rng.gen_range(-5..=5),
                rng.gen_range(-2..=2),
            )
        };

        let celsius = f64::from(base.temperature + dt);
        let wind_ms = f64::from(base.wind_speed + dw);

        let (temperature, wind_speed) = match units {
            Units::Metric => (celsius, wind_ms),
            Units::Imperial => (celsius * 9.0 / 5.0 + 32.0, wind_ms * MS_TO_MPH),
            Units::Standard => (celsius + 273.15, wind_ms),
        };

        Sample {
            temperature: round1(temperature),
            humidity: (base.humidity + dh).clamp(0, 100) as u8,
            wind_speed: round1(wind_speed.max(0.0)),
        }
    }

    fn display_name(city: &str) -> String {
        format!("{}, {}", title_case(city.trim()), MOCK_COUNTRY)
    }
}

impl Default for MockWeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    async fn current(&self, city: &str, units: Units) -> Result<WeatherReport> {
        let base = Self::lookup(city)?;
        let sample = self.sample(base, units);
        debug!(city, "Serving mock weather");

        Ok(WeatherReport {
            city: Self::display_name(city),
            coordinates: None,
            current: CurrentConditions {
                temperature: sample.temperature,
                feels_like: None,
                temp_min: None,
                temp_max: None,
                humidity: sample.humidity,
                pressure: None,
                visibility: None,
                description: base.description.to_string(),
                icon: base.icon.to_string(),
                wind_speed: sample.wind_speed,
                wind_direction: None,
            },
            units: UnitLabels::from(units),
            sun: None,
            timestamp: Utc::now(),
            source: SOURCE_NAME.to_string(),
            is_mock_data: true,
        })
    }

    async fn forecast(&self, city: &str, units: Units, days: u32) -> Result<Forecast> {
        let base = Self::lookup(city)?;
        let days = days.clamp(1, MAX_FORECAST_DAYS);

        let now = Utc::now();
        let start = now.duration_trunc(ChronoDuration::hours(3)).unwrap_or(now);

        let forecast = (0..days * FORECAST_SLOTS_PER_DAY)
            .map(|slot| {
                let sample = self.sample(base, units);
                let at = start + ChronoDuration::hours(3 * i64::from(slot + 1));
                ForecastItem {
                    datetime: at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    temperature: sample.temperature,
                    description: base.description.to_string(),
                    icon: base.icon.to_string(),
                    humidity: sample.humidity,
                    wind_speed: sample.wind_speed,
                }
            })
            .collect();

        Ok(Forecast {
            city: Self::display_name(city),
            forecast,
            units: UnitLabels::from(units),
            timestamp: now,
        })
    }

    fn available_cities(&self) -> Option<Vec<String>> {
        Some(MOCK_CITIES.iter().map(|c| c.name.to_string()).collect())
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_city() {
        let provider = MockWeatherProvider::with_seed(7);
        let report = provider.current("  LONDON ", Units::Metric).await.unwrap();

        assert_eq!(report.city, "London, Test Country");
        assert!((15.0..=21.0).contains(&report.current.temperature));
        assert!((60..=70).contains(&report.current.humidity));
        assert_eq!(report.current.icon, "02d");
        assert_eq!(report.units.temperature, "°C");
        assert!(report.is_mock_data);
    }

    #[tokio::test]
    async fn test_unknown_city() {
        let provider = MockWeatherProvider::with_seed(7);
        let err = provider.current("Atlantis", Units::Metric).await.unwrap_err();
        assert!(matches!(err, SkycastError::CityNotFound(ref c) if c == "Atlantis"));
    }

    #[tokio::test]
    async fn test_imperial_conversion() {
        let provider = MockWeatherProvider::with_seed(1);
        for _ in 0..20 {
            let report = provider.current("tokyo", Units::Imperial).await.unwrap();
            // 22..=28 °C is 71.6..=82.4 °F
            assert!((71.6..=82.4).contains(&report.current.temperature));
            assert_eq!(report.units.wind_speed, "mph");
        }
    }

    #[tokio::test]
    async fn test_kelvin_conversion() {
        let provider = MockWeatherProvider::with_seed(1);
        let report = provider.current("moscow", Units::Standard).await.unwrap();
        assert!(report.current.temperature > 260.0);
        assert_eq!(report.units.temperature, "K");
    }

    #[tokio::test]
    async fn test_jitter_stays_clamped() {
        let provider = MockWeatherProvider::with_seed(42);
        for _ in 0..200 {
            for city in ["mumbai", "moscow", "tokyo"] {
                let report = provider.current(city, Units::Metric).await.unwrap();
                assert!(report.current.humidity <= 100);
                assert!(report.current.wind_speed >= 0.0);
            }
        }
    }

    #[tokio::test]
    async fn test_same_seed_same_data() {
        let a = MockWeatherProvider::with_seed(99);
        let b = MockWeatherProvider::with_seed(99);
        let ra = a.current("paris", Units::Metric).await.unwrap();
        let rb = b.current("paris", Units::Metric).await.unwrap();
        assert_eq!(ra.current, rb.current);
    }

    #[tokio::test]
    async fn test_forecast_length() {
        let provider = MockWeatherProvider::with_seed(3);
        let forecast = provider.forecast("berlin", Units::Metric, 9).await.unwrap();
        assert_eq!(forecast.forecast.len(), 40);

        let one_day = provider.forecast("berlin", Units::Metric, 0).await.unwrap();
        assert_eq!(one_day.forecast.len(), 8);
    }

    #[test]
    fn test_available_cities() {
        let cities = MockWeatherProvider::new().available_cities().unwrap();
        assert_eq!(cities.len(), 8);
        assert!(cities.contains(&"new york".to_string()));
    }
}
