//! App state: config, provider, cache, rate limiter.

use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Serialize;
use tracing::{info, warn};

use skycast_cache::{CacheConfig, TtlCache};
use skycast_core::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_RATE_LIMIT_REQUESTS,
    DEFAULT_RATE_LIMIT_WINDOW_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, OPENWEATHERMAP_BASE_URL,
};
use skycast_core::error::{Result, SkycastError};
use skycast_core::traits::WeatherProvider;
use skycast_core::types::{Forecast, WeatherReport};
use skycast_weather::{MockWeatherProvider, OpenWeatherClient, WeatherClientConfig};

const DEFAULT_STATIC_DIR: &str = "frontend";

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// OpenWeatherMap base URL
    pub base_url: String,
    /// TTL for cached weather, seconds
    pub cache_ttl_seconds: u64,
    /// Background sweep period, seconds (0 disables)
    pub cleanup_interval_seconds: u64,
    /// Upstream request timeout, seconds
    pub request_timeout_seconds: u64,
    /// Requests allowed per window (0 disables rate limiting)
    pub rate_limit_requests: u32,
    /// Rate-limit window, seconds
    pub rate_limit_window_seconds: u64,
    /// Serve mock data and enable `/api/test/*`
    pub test_mode: bool,
    /// Root directory for static frontend files
    pub static_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: OPENWEATHERMAP_BASE_URL.into(),
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECS,
            cleanup_interval_seconds: DEFAULT_CLEANUP_INTERVAL_SECS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
            rate_limit_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            rate_limit_window_seconds: DEFAULT_RATE_LIMIT_WINDOW_SECS,
            test_mode: false,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

fn env_parse<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            SkycastError::ConfigError(format!("{} must be a non-negative integer, got '{}'", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

impl ApiConfig {
    /// Config for offline use: mock provider, test endpoints on.
    pub fn test_mode() -> Self {
        Self {
            test_mode: true,
            ..Default::default()
        }
    }

    /// Loads `.env` if present, then reads the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            api_key: env::var("OPENWEATHERMAP_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("OPENWEATHERMAP_BASE_URL")
                .unwrap_or_else(|_| OPENWEATHERMAP_BASE_URL.into()),
            cache_ttl_seconds: env_parse("CACHE_DEFAULT_TTL", DEFAULT_CACHE_TTL_SECS)?,
            cleanup_interval_seconds: env_parse(
                "CACHE_CLEANUP_INTERVAL",
                DEFAULT_CLEANUP_INTERVAL_SECS,
            )?,
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            rate_limit_requests: env_parse("RATE_LIMIT_REQUESTS", DEFAULT_RATE_LIMIT_REQUESTS)?,
            rate_limit_window_seconds: env_parse(
                "RATE_LIMIT_WINDOW",
                DEFAULT_RATE_LIMIT_WINDOW_SECS,
            )?,
            test_mode: env_flag("TEST_MODE"),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR)),
        })
    }

    /// Checks required settings.
    pub fn validate(&self) -> Result<()> {
        if !self.test_mode && self.api_key.is_none() {
            return Err(SkycastError::ConfigError(
                "OPENWEATHERMAP_API_KEY environment variable is required".into(),
            ));
        }

        url::Url::parse(&self.base_url).map_err(|e| {
            SkycastError::ConfigError(format!("invalid OPENWEATHERMAP_BASE_URL: {}", e))
        })?;

        if self.rate_limit_requests > 0 && self.rate_limit_window_seconds == 0 {
            return Err(SkycastError::ConfigError(
                "RATE_LIMIT_WINDOW must be positive when rate limiting is enabled".into(),
            ));
        }

        Ok(())
    }

    /// TTL applied to freshly fetched weather.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            default_ttl_seconds: self.cache_ttl_seconds,
            cleanup_interval_seconds: self.cleanup_interval_seconds,
        }
    }

    fn rate_limiter(&self) -> Option<DefaultDirectRateLimiter> {
        let burst = NonZeroU32::new(self.rate_limit_requests)?;
        let window = Duration::from_secs(self.rate_limit_window_seconds);
        // Sub-nanosecond periods truncate to zero, which governor rejects
        let period = (window / burst.get()).max(Duration::from_nanos(1));
        let quota = Quota::with_period(period)?.allow_burst(burst);
        Some(RateLimiter::direct(quota))
    }
}

/// What the cache holds: one normalized payload per key.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum CachedWeather {
    /// Current conditions
    Current(WeatherReport),
    /// Multi-day forecast
    Forecast(Forecast),
}

/// Shared state handed to every handler.
pub struct AppState {
    /// Server configuration
    pub config: ApiConfig,
    /// Upstream weather source
    pub provider: Arc<dyn WeatherProvider>,
    /// Response cache, one per process
    pub cache: Arc<TtlCache<CachedWeather>>,
    /// Global request limiter, if enabled
    pub rate_limiter: Option<DefaultDirectRateLimiter>,
    /// Process start, for uptime
    pub started_at: Instant,
}

impl AppState {
    /// Builds state with the provider selected by `config.test_mode`.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let provider: Arc<dyn WeatherProvider> = if config.test_mode {
            info!("Test mode: serving mock weather data");
            Arc::new(MockWeatherProvider::new())
        } else {
            let api_key = config.api_key.clone().unwrap_or_else(|| {
                warn!("OpenWeatherMap API key not configured");
                String::new()
            });
            let client_config = WeatherClientConfig::new(api_key)
                .with_base_url(config.base_url.clone())
                .with_timeout(config.request_timeout_seconds);
            Arc::new(OpenWeatherClient::with_config(client_config)?)
        };

        Ok(Self::with_provider(config, provider))
    }

    /// Builds state around an explicit provider.
    pub fn with_provider(config: ApiConfig, provider: Arc<dyn WeatherProvider>) -> Self {
        let cache = Arc::new(TtlCache::with_config(config.cache_config()));
        let rate_limiter = config.rate_limiter();

        Self {
            config,
            provider,
            cache,
            rate_limiter,
            started_at: Instant::now(),
        }
    }
}
