//! Service-wide constants for Skycast.

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Default time-to-live for cached entries, in seconds (15 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 900;

/// Default period of the background expiry sweep, in seconds.
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Prefix that keeps forecast entries apart from current-weather entries.
pub const FORECAST_KEY_PREFIX: &str = "forecast:";

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM
// ═══════════════════════════════════════════════════════════════════════════════

/// OpenWeatherMap REST base URL (API version 2.5).
pub const OPENWEATHERMAP_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Default timeout for upstream requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Length of a well-formed OpenWeatherMap API key.
pub const API_KEY_LENGTH: usize = 32;

/// Upstream forecast resolution: one slot every three hours.
pub const FORECAST_SLOTS_PER_DAY: u32 = 8;

/// Maximum number of forecast days the upstream free tier serves.
pub const MAX_FORECAST_DAYS: u32 = 5;

/// Hard cap on forecast items returned to clients.
pub const MAX_FORECAST_ITEMS: usize = 40;

/// Conversion factor from metres per second to miles per hour.
pub const MS_TO_MPH: f64 = 2.237;

// ═══════════════════════════════════════════════════════════════════════════════
// VALIDATION & LIMITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Minimum length of a city name after trimming.
pub const MIN_CITY_NAME_LEN: usize = 2;

/// Default number of requests allowed per rate-limit window.
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;

/// Default rate-limit window, in seconds.
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 3600;

/// Seconds a throttled client is told to wait.
pub const RATE_LIMIT_RETRY_AFTER_SECS: u64 = 60;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "weather-dashboard";
