use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod event_logs;
pub mod events;
pub mod health;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(events::router())
        .merge(event_logs::router());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
