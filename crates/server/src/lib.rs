pub mod error;
pub mod routes;

use std::{net::SocketAddr, sync::Arc};

use services::services::domain_events::DomainEventDispatcher;
use thiserror::Error;
use tokio::task::JoinHandle;
use utils::event_log_store::EventLogStore;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<DomainEventDispatcher>,
    pub event_logs: Arc<EventLogStore>,
}

impl AppState {
    pub fn new(dispatcher: DomainEventDispatcher, event_logs: Arc<EventLogStore>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            event_logs,
        }
    }
}

/// Error type for server startup
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),
}

/// Starts the Axum HTTP server with the given state.
///
/// Binds to `<host>:<port>` (port 0 = auto-assign), spawns the server task
/// with graceful shutdown handling and returns the server URL together with
/// the task's `JoinHandle`.
pub async fn start_server(
    state: AppState,
    host: &str,
    port: u16,
) -> Result<(String, JoinHandle<()>), ServerError> {
    let app_router = routes::router(state);

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let url = format!("http://{}", addr);

    tracing::info!("Server running on {}", url);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app_router)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((url, handle))
}

/// Waits for shutdown signals (Ctrl+C or SIGTERM on Unix).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let terminate = async {
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
            } else {
                tracing::error!("Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}
