use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use vinscan_core::lookup::http::API_KEY_HEADER;

use crate::{errors::AppError, state::AppState};

/// Rejects requests whose `X-API-Key` does not match the configured key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !keys_match(presented.as_bytes(), state.api_key.expose().as_bytes()) {
        warn!(path = %request.uri().path(), "rejected request with invalid API key");
        return Err(AppError::unauthorized("Invalid API key"));
    }

    Ok(next.run(request).await)
}

// Length leaks, contents do not.
fn keys_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() || expected.is_empty() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
