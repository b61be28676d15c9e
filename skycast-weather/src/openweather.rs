//! OpenWeatherMap client.
//!
//! Calls the 2.5 REST API (`/weather`, `/forecast`) and maps the responses
//! into Skycast's normalized types.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use skycast_core::constants::{
    API_KEY_LENGTH, DEFAULT_REQUEST_TIMEOUT_SECS, FORECAST_SLOTS_PER_DAY, MAX_FORECAST_DAYS,
    MAX_FORECAST_ITEMS, OPENWEATHERMAP_BASE_URL,
};
use skycast_core::error::{Result, SkycastError};
use skycast_core::traits::WeatherProvider;
use skycast_core::types::{
    Coordinates, CurrentConditions, Forecast, ForecastItem, SunTimes, UnitLabels, Units,
    WeatherReport,
};

use crate::format::{round1, title_case};

const SOURCE_NAME: &str = "OpenWeatherMap";

/// OpenWeatherMap client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeatherClientConfig {
    /// API key sent as `appid`
    pub api_key: String,
    /// REST base URL, without trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl WeatherClientConfig {
    /// Creates config for the public endpoint with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENWEATHERMAP_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Points the client at a different base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// Live weather provider backed by OpenWeatherMap.
pub struct OpenWeatherClient {
    config: WeatherClientConfig,
    http_client: reqwest::Client,
}

impl OpenWeatherClient {
    /// Creates a client with the given config.
    pub fn with_config(config: WeatherClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            warn!("OpenWeatherMap API key not configured");
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SkycastError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns true if an API key is configured and has the expected shape.
    pub fn is_api_key_valid(&self) -> bool {
        self.config.api_key.len() == API_KEY_LENGTH
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_transport_error(&self, city: &str, err: reqwest::Error) -> SkycastError {
        if err.is_timeout() {
            error!(city, "Timeout fetching weather");
            SkycastError::Timeout {
                seconds: self.config.timeout_seconds,
            }
        } else if err.is_connect() {
            error!(city, error = %err, "Connection error fetching weather");
            SkycastError::Connection(err.to_string())
        } else {
            error!(city, error = %err, "Unexpected error fetching weather");
            SkycastError::HttpError(err.to_string())
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        city: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .http_client
            .get(self.endpoint(path))
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_transport_error(city, e))?;

        match response.status().as_u16() {
            200 => response
                .json::<T>()
                .await
                .map_err(|e| SkycastError::MalformedResponse(e.to_string())),
            404 => Err(SkycastError::CityNotFound(city.to_string())),
            401 => {
                error!("Invalid API key");
                Err(SkycastError::Unauthorized)
            }
            status => {
                error!(status, "API request failed");
                Err(SkycastError::UpstreamStatus { status })
            }
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current(&self, city: &str, units: Units) -> Result<WeatherReport> {
        info!(city, "Fetching weather data");

        let query = [
            ("q", city.to_string()),
            ("appid", self.config.api_key.clone()),
            ("units", units.as_str().to_string()),
        ];
        let raw: OwmCurrent = self.get_json("weather", city, &query).await?;

        let report = raw.into_report(units)?;
        debug!(city = %report.city, "Normalized weather response");
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn forecast(&self, city: &str, units: Units, days: u32) -> Result<Forecast> {
        let days = days.clamp(1, MAX_FORECAST_DAYS);
        let query = [
            ("q", city.to_string()),
            ("appid", self.config.api_key.clone()),
            ("units", units.as_str().to_string()),
            ("cnt", (days * FORECAST_SLOTS_PER_DAY).to_string()),
        ];
        let raw: OwmForecast = self.get_json("forecast", city, &query).await?;

        raw.into_forecast(units)
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Upstream wire types
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    name: String,
    coord: OwmCoord,
    main: OwmMain,
    #[serde(default)]
    visibility: Option<u32>,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: Option<OwmWind>,
    sys: OwmSys,
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: Option<f64>,
    #[serde(default)]
    deg: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    sunrise: Option<i64>,
    #[serde(default)]
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    list: Vec<OwmForecastSlot>,
    city: OwmCity,
}

#[derive(Debug, Deserialize)]
struct OwmForecastSlot {
    dt_txt: String,
    main: OwmSlotMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
struct OwmSlotMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    name: String,
    #[serde(default)]
    country: Option<String>,
}

fn display_name(name: &str, country: Option<&str>) -> String {
    match country {
        Some(cc) if !cc.is_empty() => format!("{}, {}", name, cc),
        _ => name.to_string(),
    }
}

fn first_condition(conditions: &[OwmCondition]) -> Result<&OwmCondition> {
    conditions
        .first()
        .ok_or_else(|| SkycastError::MalformedResponse("missing weather conditions".into()))
}

fn unix_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

impl OwmCurrent {
    fn into_report(self, units: Units) -> Result<WeatherReport> {
        let condition = first_condition(&self.weather)?;
        let wind = self.wind.unwrap_or_default();

        let sun = match (
            self.sys.sunrise.and_then(unix_to_utc),
            self.sys.sunset.and_then(unix_to_utc),
        ) {
            (Some(sunrise), Some(sunset)) => Some(SunTimes { sunrise, sunset }),
            _ => None,
        };

        Ok(WeatherReport {
            city: display_name(&self.name, self.sys.country.as_deref()),
            coordinates: Some(Coordinates {
                lat: self.coord.lat,
                lon: self.coord.lon,
            }),
            current: CurrentConditions {
                temperature: round1(self.main.temp),
                feels_like: Some(round1(self.main.feels_like)),
                temp_min: Some(round1(self.main.temp_min)),
                temp_max: Some(round1(self.main.temp_max)),
                humidity: self.main.humidity,
                pressure: Some(self.main.pressure),
                visibility: self.visibility,
                description: title_case(&condition.description),
                icon: condition.icon.clone(),
                wind_speed: wind.speed.unwrap_or(0.0),
                wind_direction: Some(wind.deg.unwrap_or(0)),
            },
            units: UnitLabels::from(units),
            sun,
            timestamp: Utc::now(),
            source: SOURCE_NAME.to_string(),
            is_mock_data: false,
        })
    }
}

impl OwmForecast {
    fn into_forecast(self, units: Units) -> Result<Forecast> {
        let forecast = self
            .list
            .into_iter()
            .take(MAX_FORECAST_ITEMS)
            .map(|slot| {
                let condition = first_condition(&slot.weather)?;
                Ok(ForecastItem {
                    datetime: slot.dt_txt.clone(),
                    temperature: round1(slot.main.temp),
                    description: title_case(&condition.description),
                    icon: condition.icon.clone(),
                    humidity: slot.main.humidity,
                    wind_speed: slot.wind.and_then(|w| w.speed).unwrap_or(0.0),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Forecast {
            city: display_name(&self.city.name, self.city.country.as_deref()),
            forecast,
            units: UnitLabels::from(units),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef";

    fn london_body() -> serde_json::Value {
        json!({
            "coord": { "lon": -0.1257, "lat": 51.5085 },
            "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
            "main": {
                "temp": 18.26, "feels_like": 17.94, "temp_min": 16.71, "temp_max": 19.45,
                "pressure": 1012, "humidity": 67
            },
            "visibility": 10000,
            "wind": { "speed": 4.63, "deg": 240 },
            "sys": { "country": "GB", "sunrise": 1717387200, "sunset": 1717446000 },
            "name": "London"
        })
    }

    async fn client_for(server: &MockServer) -> OpenWeatherClient {
        let config = WeatherClientConfig::new(TEST_KEY)
            .with_base_url(server.uri())
            .with_timeout(1);
        OpenWeatherClient::with_config(config).unwrap()
    }

    #[tokio::test]
    async fn test_current_normalizes_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", TEST_KEY))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let report = client.current("London", Units::Metric).await.unwrap();

        assert_eq!(report.city, "London, GB");
        assert_eq!(report.current.temperature, 18.3);
        assert_eq!(report.current.feels_like, Some(17.9));
        assert_eq!(report.current.humidity, 67);
        assert_eq!(report.current.description, "Broken Clouds");
        assert_eq!(report.current.wind_direction, Some(240));
        assert_eq!(report.units.temperature, "°C");
        assert_eq!(report.source, "OpenWeatherMap");
        assert!(report.sun.is_some());
        assert!(!report.is_mock_data);
    }

    #[tokio::test]
    async fn test_missing_wind_defaults_to_zero() {
        let server = MockServer::start().await;
        let mut body = london_body();
        body.as_object_mut().unwrap().remove("wind");
        body.as_object_mut().unwrap().remove("visibility");
        Mock::given(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let report = client.current("London", Units::Imperial).await.unwrap();

        assert_eq!(report.current.wind_speed, 0.0);
        assert_eq!(report.current.wind_direction, Some(0));
        assert_eq!(report.current.visibility, None);
        assert_eq!(report.units.wind_speed, "mph");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(query_param("q", "Atlantis"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(query_param("q", "Locked"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(query_param("q", "Busy"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        assert!(matches!(
            client.current("Atlantis", Units::Metric).await,
            Err(SkycastError::CityNotFound(city)) if city == "Atlantis"
        ));
        assert!(matches!(
            client.current("Locked", Units::Metric).await,
            Err(SkycastError::Unauthorized)
        ));
        assert!(matches!(
            client.current("Busy", Units::Metric).await,
            Err(SkycastError::UpstreamStatus { status: 503 })
        ));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "London" })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(matches!(
            client.current("London", Units::Metric).await,
            Err(SkycastError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(path("/weather"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(london_body())
                    .set_delay(Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(matches!(
            client.current("London", Units::Metric).await,
            Err(SkycastError::Timeout { seconds: 1 })
        ));
    }

    #[tokio::test]
    async fn test_forecast_requests_eight_slots_per_day() {
        let server = MockServer::start().await;
        let slot = json!({
            "dt_txt": "2024-06-03 12:00:00",
            "main": { "temp": 20.04, "humidity": 55 },
            "weather": [{ "description": "clear sky", "icon": "01d" }],
            "wind": { "speed": 3.1 }
        });
        Mock::given(path("/forecast"))
            .and(query_param("cnt", "16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": vec![slot; 16],
                "city": { "name": "Paris", "country": "FR" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let forecast = client.forecast("Paris", Units::Metric, 2).await.unwrap();

        assert_eq!(forecast.city, "Paris, FR");
        assert_eq!(forecast.forecast.len(), 16);
        assert_eq!(forecast.forecast[0].temperature, 20.0);
        assert_eq!(forecast.forecast[0].description, "Clear Sky");
    }

    #[test]
    fn test_api_key_validation() {
        let valid = OpenWeatherClient::with_config(WeatherClientConfig::new(TEST_KEY)).unwrap();
        assert!(valid.is_api_key_valid());

        let short = OpenWeatherClient::with_config(WeatherClientConfig::new("abc")).unwrap();
        assert!(!short.is_api_key_valid());
    }
}
