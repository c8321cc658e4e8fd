use axum::{
    extract::State,
    http::{header, Method},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::shared::EXPOSITION_CONTENT_TYPE;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    /// Unix epoch seconds.
    pub date: i64,
    pub version: String,
    pub kubernetes: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn index(State(state): State<AppState>, method: Method) -> Json<IndexResponse> {
    state.hits.increment(method.as_str(), "index");

    Json(IndexResponse {
        date: chrono::Utc::now().timestamp(),
        version: state.version.to_string(),
        kubernetes: state.kubernetes,
    })
}

pub async fn metrics(State(state): State<AppState>, method: Method) -> impl IntoResponse {
    state.hits.increment(method.as_str(), "metrics");

    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.hits.render_all(),
    )
}

/// Liveness only; dependencies are not probed.
pub async fn health(State(state): State<AppState>, method: Method) -> Json<HealthResponse> {
    state.hits.increment(method.as_str(), "health");
    Json(HealthResponse { status: "ok" })
}
