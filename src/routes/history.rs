use axum::{extract::State, http::Method, Json};

use crate::error::AppError;
use crate::infra::HistoryRecord;
use crate::state::AppState;

/// Number of records returned by the history endpoint.
pub const HISTORY_LIMIT: usize = 20;

pub async fn history(
    State(state): State<AppState>,
    method: Method,
) -> Result<Json<Vec<HistoryRecord>>, AppError> {
    state.hits.increment(method.as_str(), "history");

    let rows = state.store.recent(HISTORY_LIMIT).await?;
    if rows.is_empty() {
        return Err(AppError::NoRecords);
    }

    tracing::debug!(count = rows.len(), "Returning history");
    Ok(Json(rows))
}
