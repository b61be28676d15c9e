//! API route configuration.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::limit::rate_limit;
use crate::state::AppState;

/// Creates the API router with all routes configured.
///
/// Anything outside `/api` falls through to static files.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Weather
        .route("/weather", post(handlers::get_weather))
        .route("/weather/:city", get(handlers::get_cached_weather))
        .route("/forecast", post(handlers::get_forecast))

        // Test mode
        .route("/test/cities", get(handlers::list_test_cities))
        .route("/test/weather/random", get(handlers::random_test_weather))

        // Cache administration
        .route("/cache/stats", get(handlers::cache_stats))
        .route("/cache/ttl/:key", get(handlers::cache_ttl))
        .route("/cache/clear", post(handlers::clear_cache))
        .route("/cache/cleanup", post(handlers::cleanup_cache))
        .route("/cache/:key", delete(handlers::delete_cache_entry))

        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .nest("/api", api)
        .fallback_service(static_files)
        .with_state(state)
}
