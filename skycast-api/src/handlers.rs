//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header::HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info};

use skycast_core::constants::{MAX_FORECAST_DAYS, SERVICE_NAME};
use skycast_core::types::{cache_key, forecast_cache_key, validate_city, Units};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::{AppState, CachedWeather};

type Result<T> = std::result::Result<T, ApiError>;

/// Response header reporting whether the payload came from the cache.
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache");

const CACHE_HIT: &str = "HIT";
const CACHE_MISS: &str = "MISS";

fn parse_units(raw: Option<&str>) -> Result<Units> {
    match raw {
        None => Ok(Units::default()),
        Some(s) => s.parse::<Units>().map_err(ApiError::from),
    }
}

fn required_city(city: Option<&str>) -> Result<&str> {
    let city = city.ok_or_else(|| ApiError::bad_request("City name is required"))?;
    Ok(validate_city(city)?)
}

fn with_cache_status<T: Serialize>(status: &'static str, body: T) -> Response {
    let mut response = Json(body).into_response();
    response
        .headers_mut()
        .insert(CACHE_STATUS_HEADER, HeaderValue::from_static(status));
    response
}

fn require_test_mode(state: &AppState) -> Result<()> {
    if state.config.test_mode {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "Test endpoints are only available in test mode",
        ))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Weather
// ═══════════════════════════════════════════════════════════════════════════

/// POST /api/weather
pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<WeatherRequest>, JsonRejection>,
) -> Result<Response> {
    let req = payload
        .map(|Json(req)| req)
        .map_err(|_| ApiError::bad_request("City name is required"))?;

    let city = required_city(req.city.as_deref())?;
    let units = parse_units(req.units.as_deref())?;
    let key = cache_key(city, units);

    if let Some(CachedWeather::Current(report)) = state.cache.get(&key) {
        info!(city, "Returning cached data");
        return Ok(with_cache_status(CACHE_HIT, SuccessResponse::new(report)));
    }

    let report = state.provider.current(city, units).await?;
    state.cache.set_with_ttl(
        key,
        CachedWeather::Current(report.clone()),
        state.config.cache_ttl(),
    );

    info!(city, provider = state.provider.name(), "Fetched fresh weather data");
    Ok(with_cache_status(CACHE_MISS, SuccessResponse::new(report)))
}

/// GET /api/weather/:city
///
/// Cache-only: never calls the provider.
pub async fn get_cached_weather(
    State(state): State<Arc<AppState>>,
    Path(city): Path<String>,
    Query(query): Query<UnitsQuery>,
) -> Result<Response> {
    let units = parse_units(query.units.as_deref())?;
    let key = cache_key(&city, units);

    match state.cache.get(&key) {
        Some(CachedWeather::Current(report)) => {
            debug!(key = %key, "Served cached weather");
            Ok(with_cache_status(CACHE_HIT, SuccessResponse::new(report)))
        }
        _ => Err(ApiError::not_found("No cached data found for this city")),
    }
}

/// POST /api/forecast
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ForecastRequest>, JsonRejection>,
) -> Result<Response> {
    let req = payload
        .map(|Json(req)| req)
        .map_err(|_| ApiError::bad_request("City name is required"))?;

    let city = required_city(req.city.as_deref())?;
    let units = parse_units(req.units.as_deref())?;
    let days = req.days.unwrap_or(MAX_FORECAST_DAYS).clamp(1, MAX_FORECAST_DAYS);
    let key = forecast_cache_key(city, units, days);

    if let Some(CachedWeather::Forecast(forecast)) = state.cache.get(&key) {
        info!(city, days, "Returning cached forecast");
        return Ok(with_cache_status(CACHE_HIT, SuccessResponse::new(forecast)));
    }

    let forecast = state.provider.forecast(city, units, days).await?;
    state.cache.set_with_ttl(
        key,
        CachedWeather::Forecast(forecast.clone()),
        state.config.cache_ttl(),
    );

    info!(city, days, "Fetched fresh forecast");
    Ok(with_cache_status(CACHE_MISS, SuccessResponse::new(forecast)))
}

// ═══════════════════════════════════════════════════════════════════════════
// Test mode
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/test/cities
pub async fn list_test_cities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CitiesResponse>> {
    require_test_mode(&state)?;

    let cities = state
        .provider
        .available_cities()
        .ok_or_else(|| ApiError::internal("Error retrieving test cities"))?;

    Ok(Json(CitiesResponse {
        status: "success",
        cities,
        message: "Available test cities",
    }))
}

/// GET /api/test/weather/random
pub async fn random_test_weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UnitsQuery>,
) -> Result<Response> {
    require_test_mode(&state)?;
    let units = parse_units(query.units.as_deref())?;

    let city = {
        let cities = state.provider.available_cities().unwrap_or_default();
        cities.choose(&mut rand::thread_rng()).cloned()
    }
    .ok_or_else(|| ApiError::internal("Error retrieving random weather data"))?;

    let report = state.provider.current(&city, units).await?;
    Ok(Json(SuccessResponse::new(report)).into_response())
}

// ═══════════════════════════════════════════════════════════════════════════
// Cache administration
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/cache/stats
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        stats: state.cache.get_stats(),
        default_ttl_seconds: state.config.cache_ttl_seconds,
    })
}

/// GET /api/cache/ttl/:key
pub async fn cache_ttl(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<CacheTtlResponse>> {
    let remaining_seconds = state
        .cache
        .get_remaining_ttl(&key)
        .ok_or_else(|| ApiError::not_found(format!("No cache entry for key '{}'", key)))?;

    Ok(Json(CacheTtlResponse {
        key,
        remaining_seconds,
    }))
}

/// DELETE /api/cache/:key
pub async fn delete_cache_entry(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<CacheDeleteResponse> {
    let deleted = state.cache.delete(&key);
    Json(CacheDeleteResponse { key, deleted })
}

/// POST /api/cache/clear
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<CacheRemovedResponse> {
    Json(CacheRemovedResponse {
        removed: state.cache.clear(),
    })
}

/// POST /api/cache/cleanup
pub async fn cleanup_cache(State(state): State<Arc<AppState>>) -> Json<CacheRemovedResponse> {
    Json(CacheRemovedResponse {
        removed: state.cache.cleanup_expired(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Health
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        service: SERVICE_NAME.into(),
        timestamp: Utc::now(),
        test_mode: state.config.test_mode,
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        provider: state.provider.name().into(),
    })
}
