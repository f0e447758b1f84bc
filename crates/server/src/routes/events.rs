use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::post,
};
use serde::Serialize;
use services::services::domain_events::{DomainEvent, PlatformEvent};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAccepted {
    pub event_id: String,
    /// Handlers that picked the event up.
    pub handlers: usize,
}

/// Intake for platform events.
///
/// Responds once inline handlers have run; spawned handlers keep working in
/// the background and report through the job they settle.
pub async fn receive_event(
    State(state): State<AppState>,
    payload: Result<Json<PlatformEvent>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<EventAccepted>>), ApiError> {
    let Json(event) = payload?;
    let event_id = event.id.clone();

    let handlers = match DomainEvent::from_platform(event.clone()) {
        Some(domain_event) => state.dispatcher.dispatch(domain_event).await,
        None => {
            tracing::debug!(
                event_id = %event_id,
                topic = %event.topic,
                "Ignoring event without a job lifecycle topic"
            );
            0
        }
    };

    tracing::info!(
        event_id = %event_id,
        topic = %event.topic,
        job = ?event.job_key(),
        handlers,
        "Event received"
    );

    Ok((
        StatusCode::ACCEPTED,
        ResponseJson(ApiResponse::success(EventAccepted { event_id, handlers })),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/events", post(receive_event))
}
