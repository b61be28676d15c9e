//! # Skycast API Server
//!
//! Weather façade over OpenWeatherMap with an in-memory TTL cache, serving
//! the dashboard frontend from the same origin.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Liveness and mode
//! - `POST /api/weather` - Current weather for a city (cached)
//! - `GET /api/weather/:city` - Cached weather only, 404 when absent
//! - `POST /api/forecast` - Multi-day forecast (cached)
//! - `GET /api/test/cities` - Mock city names (test mode)
//! - `GET /api/test/weather/random` - Weather for a random mock city (test mode)
//! - `GET /api/cache/stats` - Cache statistics
//! - `GET /api/cache/ttl/:key` - Remaining lifetime of one entry
//! - `DELETE /api/cache/:key` - Drop one entry
//! - `POST /api/cache/clear` - Drop every entry
//! - `POST /api/cache/cleanup` - Purge expired entries now
//!
//! ## Example
//!
//! ```rust,ignore
//! use skycast_api::{ApiServer, ApiConfig};
//!
//! let server = ApiServer::new(ApiConfig::test_mode())?;
//! server.run(([0, 0, 0, 0], 5000)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod limit;
mod routes;
mod state;

pub use error::ApiError;
pub use handlers::CACHE_STATUS_HEADER;
pub use routes::create_router;
pub use state::{ApiConfig, AppState, CachedWeather};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use skycast_cache::Sweeper;
use skycast_core::error::Result;

/// API server for Skycast.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_state(AppState::new(config)?))
    }

    /// Wraps prebuilt state.
    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Shared state, for callers that need the cache or provider directly.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    ///
    /// The background cache sweep lives exactly as long as this call.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        let _sweeper = self
            .state
            .cache
            .config()
            .cleanup_interval()
            .and_then(|interval| Sweeper::spawn(&self.state.cache, interval));

        info!(
            %addr,
            test_mode = self.state.config.test_mode,
            cache_ttl_secs = self.state.config.cache_ttl_seconds,
            provider = self.state.provider.name(),
            "Skycast API server listening"
        );

        axum::serve(listener, self.router()).await
    }
}

/// Starts the API server with configuration from the environment.
pub async fn start_server(port: u16) -> anyhow::Result<()> {
    let config = ApiConfig::from_env()?;
    let server = ApiServer::new(config)?;
    server.run(([0, 0, 0, 0], port)).await?;
    Ok(())
}
