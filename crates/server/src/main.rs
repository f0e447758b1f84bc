use std::sync::Arc;

use anyhow::{self, Error as AnyhowError};
use server::{AppState, ServerError, start_server};
use services::services::{
    config::{ConfigError, ListenerConfig},
    domain_events::{
        DispatcherBuilder, HandlerContext, MappedFieldsViewHandler, MappingCompletedHandler,
        NamespaceFilter, SpaceConfigureHandler, SubmitHandler,
    },
    platform::HttpPlatformClient,
    webhook::HttpWebhookSender,
};
use strip_ansi_escapes::strip;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, prelude::*};
use utils::{event_log_layer::EventLogLayer, event_log_store::EventLogStore};

const DEFAULT_PORT: u16 = 8787;

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error(transparent)]
    Other(#[from] AnyhowError),
}

fn port_from_env() -> Result<u16, AnyhowError> {
    let Ok(port_str) = std::env::var("BACKEND_PORT").or_else(|_| std::env::var("PORT")) else {
        return Ok(DEFAULT_PORT);
    };

    // remove any ANSI codes, then parse
    let cleaned = String::from_utf8(strip(port_str.as_bytes()))
        .map_err(|e| anyhow::anyhow!("Port value is not UTF-8 after stripping ANSI: {}", e))?;
    cleaned
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid port value '{}': {}", cleaned.trim(), e))
}

#[tokio::main]
async fn main() -> Result<(), ListenerError> {
    let dotenv = dotenvy::dotenv();

    // Captured log lines back the "see event logs" messages shown to users
    let event_log_store = Arc::new(EventLogStore::new());

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},services={level},utils={level}",
        level = log_level
    );
    let fmt_filter = EnvFilter::try_new(&filter_string).map_err(AnyhowError::from)?;
    let log_layer_filter = EnvFilter::try_new(&filter_string).map_err(AnyhowError::from)?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(fmt_filter))
        .with(EventLogLayer::new(event_log_store.clone()).with_filter(log_layer_filter))
        .init();

    match dotenv {
        Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }

    let config = ListenerConfig::from_env()?;
    tracing::info!(
        api = %config.api_base_url,
        namespace = %config.namespace,
        workbook = %config.workbook_name,
        "Listener configured"
    );

    let platform = Arc::new(HttpPlatformClient::new(
        config.api_base_url.clone(),
        config.api_key,
    ));
    let webhook = Arc::new(HttpWebhookSender::new(config.webhook_receiver_url.clone()));

    let dispatcher = DispatcherBuilder::new(HandlerContext::new(platform, webhook))
        .with_handler(SpaceConfigureHandler::new(config.workbook_name))
        .with_handler(MappingCompletedHandler)
        .with_handler(MappedFieldsViewHandler::new())
        .with_handler(SubmitHandler)
        .with_namespace_filter(NamespaceFilter::parse(&config.namespace))
        .build();
    tracing::info!(handlers = ?dispatcher.handler_names(), "Event handlers registered");

    let port = port_from_env()?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

    let (_url, handle) =
        start_server(AppState::new(dispatcher, event_log_store), &host, port).await?;
    if let Err(e) = handle.await {
        tracing::error!("Server task ended abnormally: {}", e);
    }

    tracing::info!("Listener stopped");
    Ok(())
}
