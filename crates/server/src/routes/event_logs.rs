use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Json as ResponseJson,
    routing::get,
};
use serde::Deserialize;
use utils::{event_log_store::EventLogEntry, response::ApiResponse};

use crate::{AppState, error::ApiError};

const DEFAULT_LIMIT: usize = 200;
const MAX_LIMIT: usize = 5_000;

#[derive(Debug, Deserialize)]
pub struct EventLogsQuery {
    pub job_id: Option<String>,
    pub limit: Option<usize>,
}

/// Captured log lines, oldest first, optionally for a single job.
pub async fn list_event_logs(
    State(state): State<AppState>,
    query: Result<Query<EventLogsQuery>, QueryRejection>,
) -> Result<ResponseJson<ApiResponse<Vec<EventLogEntry>>>, ApiError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let entries = state.event_logs.recent(query.job_id.as_deref(), limit);
    Ok(ResponseJson(ApiResponse::success(entries)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/event-logs", get(list_event_logs))
}
