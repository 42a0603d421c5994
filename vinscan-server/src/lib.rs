//! # vinscan-server
//!
//! Reference record-store API the scanner's HTTP lookup client talks to.
//!
//! - `GET /` health and record count (no key required)
//! - `GET /api/check_vin?vin=...` lookup
//! - `POST /api/add_vin` enrollment (upsert)
//!
//! Every `/api/*` route requires the shared `X-API-Key`.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod errors;
pub mod handlers;
pub mod state;

pub use errors::{AppError, AppResult};
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/check_vin", get(handlers::check_vin))
        .route("/add_vin", post(handlers::add_vin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/", get(handlers::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
