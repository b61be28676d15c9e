//! Global request rate limiting.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Rejects requests with 429 once the configured quota is exhausted.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            warn!(path = %request.uri().path(), "Rate limit exceeded");
            return ApiError::too_many_requests().into_response();
        }
    }
    next.run(request).await
}
