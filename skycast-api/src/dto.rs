//! DTOs for API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skycast_cache::CacheStats;

/// Request body for `POST /api/weather`.
#[derive(Debug, Deserialize)]
pub struct WeatherRequest {
    /// City name (required)
    pub city: Option<String>,
    /// metric | imperial | kelvin (default metric)
    pub units: Option<String>,
}

/// Request body for `POST /api/forecast`.
#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    /// City name (required)
    pub city: Option<String>,
    /// metric | imperial | kelvin (default metric)
    pub units: Option<String>,
    /// Number of days, 1-5 (default 5)
    pub days: Option<u32>,
}

/// `?units=` query string.
#[derive(Debug, Default, Deserialize)]
pub struct UnitsQuery {
    /// metric | imperial | kelvin
    pub units: Option<String>,
}

/// Success envelope around a payload.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    /// Always "success"
    pub status: &'static str,
    /// The payload
    pub data: T,
}

impl<T> SuccessResponse<T> {
    /// Wraps `data`.
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy"
    pub status: String,
    /// Service name
    pub service: String,
    /// Server time
    pub timestamp: DateTime<Utc>,
    /// Whether mock data is served
    pub test_mode: bool,
    /// Crate version
    pub version: String,
    /// Seconds since start
    pub uptime_seconds: u64,
    /// Active provider
    pub provider: String,
}

/// Mock cities listing.
#[derive(Debug, Serialize)]
pub struct CitiesResponse {
    /// Always "success"
    pub status: &'static str,
    /// City names
    pub cities: Vec<String>,
    /// Description
    pub message: &'static str,
}

/// Cache statistics response.
#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    /// Snapshot
    #[serde(flatten)]
    pub stats: CacheStats,
    /// TTL applied to new weather entries
    pub default_ttl_seconds: u64,
}

/// Remaining TTL for one key.
#[derive(Debug, Serialize)]
pub struct CacheTtlResponse {
    /// Cache key
    pub key: String,
    /// Whole seconds left (0 if expired but not yet swept)
    pub remaining_seconds: u64,
}

/// Result of deleting one key.
#[derive(Debug, Serialize)]
pub struct CacheDeleteResponse {
    /// Cache key
    pub key: String,
    /// Whether an entry was removed
    pub deleted: bool,
}

/// Result of a bulk removal.
#[derive(Debug, Serialize)]
pub struct CacheRemovedResponse {
    /// Number of entries removed
    pub removed: usize,
}
