use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::DomainEvent;
use crate::services::{
    platform::{PlatformApi, PlatformError},
    webhook::{WebhookError, WebhookSender},
};

/// Determines how an event handler should be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Handler runs inline (blocking) - the dispatcher waits for completion.
    Inline,
    /// Handler runs via `tokio::spawn` (fire-and-forget) - the dispatcher does not wait.
    Spawned,
}

/// Error type for event handler failures.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Event is missing {0}")]
    MissingContext(&'static str),

    #[error("Handler failed: {0}")]
    Failed(String),
}

/// Context provided to event handlers, containing shared services.
#[derive(Clone)]
pub struct HandlerContext {
    pub platform: Arc<dyn PlatformApi>,
    pub webhook: Arc<dyn WebhookSender>,
}

impl HandlerContext {
    pub fn new(platform: Arc<dyn PlatformApi>, webhook: Arc<dyn WebhookSender>) -> Self {
        Self { platform, webhook }
    }
}

/// Trait for domain event handlers.
///
/// Implement this trait to create handlers that react to domain events.
/// Handlers can specify their execution mode (inline or spawned) and
/// filter which events they handle via the `handles` method.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Returns the name of this handler (for logging and debugging).
    fn name(&self) -> &'static str;

    /// Returns the execution mode for this handler.
    fn execution_mode(&self) -> ExecutionMode;

    /// Returns true if this handler should process the given event.
    fn handles(&self, event: &DomainEvent) -> bool;

    /// Handles the event. Called only if `handles` returned true.
    async fn handle(&self, event: DomainEvent, ctx: &HandlerContext) -> Result<(), HandlerError>;
}
