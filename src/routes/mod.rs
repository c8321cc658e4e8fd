pub mod history;
pub mod status;
pub mod tools;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Builds the application router.
///
/// Handlers read the peer address through `ConnectInfo`, so the router must
/// be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status::index))
        .route("/metrics", get(status::metrics))
        .route("/health", get(status::health))
        .route("/v1/tools/lookup", get(tools::lookup))
        .route("/v1/tools/validate", post(tools::validate))
        .route("/v1/history", get(history::history))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}
