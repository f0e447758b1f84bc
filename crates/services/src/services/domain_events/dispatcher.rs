//! Domain event dispatcher for routing events to registered handlers.
//!
//! The dispatcher manages handler registration and event routing based on
//! execution mode (inline vs spawned).

use std::sync::Arc;

use tracing::{debug, warn};

use super::{DomainEvent, EventHandler, ExecutionMode, HandlerContext, NamespaceFilter};

/// Dispatches domain events to registered handlers.
///
/// Handlers are partitioned by execution mode:
/// - Inline handlers run sequentially and block until completion
/// - Spawned handlers run via `tokio::spawn` (fire-and-forget)
///
/// Handlers are sorted by name for deterministic ordering.
pub struct DomainEventDispatcher {
    inline_handlers: Vec<Arc<dyn EventHandler>>,
    spawned_handlers: Vec<Arc<dyn EventHandler>>,
    namespace_filter: Option<NamespaceFilter>,
    ctx: Arc<HandlerContext>,
}

impl DomainEventDispatcher {
    /// Dispatches an event to all handlers that accept it.
    ///
    /// 1. Drops events outside the configured namespace
    /// 2. Runs inline handlers sequentially (awaits each)
    /// 3. Spawns spawned handlers (fire-and-forget)
    /// 4. Logs errors but does not propagate them
    ///
    /// Returns how many handlers accepted the event.
    pub async fn dispatch(&self, event: DomainEvent) -> usize {
        if let Some(filter) = &self.namespace_filter
            && !filter.matches(event.context().namespaces.as_slice())
        {
            debug!(
                topic = event.topic(),
                job = event.job(),
                namespaces = ?event.context().namespaces,
                "Event outside listener namespace, ignoring"
            );
            return 0;
        }

        let mut accepted = 0;

        for handler in &self.inline_handlers {
            if handler.handles(&event) {
                accepted += 1;
                debug!(
                    handler = handler.name(),
                    topic = event.topic(),
                    job = event.job(),
                    "Dispatching event to inline handler"
                );
                if let Err(e) = handler.handle(event.clone(), &self.ctx).await {
                    warn!(
                        handler = handler.name(),
                        error = %e,
                        "Inline handler failed"
                    );
                }
            }
        }

        for handler in &self.spawned_handlers {
            if handler.handles(&event) {
                accepted += 1;
                let handler = Arc::clone(handler);
                let event = event.clone();
                let ctx = Arc::clone(&self.ctx);

                debug!(
                    handler = handler.name(),
                    topic = event.topic(),
                    job = event.job(),
                    "Spawning handler"
                );

                tokio::spawn(async move {
                    if let Err(e) = handler.handle(event, &ctx).await {
                        warn!(
                            handler = handler.name(),
                            error = %e,
                            "Spawned handler failed"
                        );
                    }
                });
            }
        }

        accepted
    }

    /// Names of all registered handlers, inline first.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.inline_handlers
            .iter()
            .chain(&self.spawned_handlers)
            .map(|h| h.name())
            .collect()
    }
}

/// Builder for constructing a `DomainEventDispatcher`.
pub struct DispatcherBuilder {
    handlers: Vec<Arc<dyn EventHandler>>,
    namespace_filter: Option<NamespaceFilter>,
    ctx: HandlerContext,
}

impl DispatcherBuilder {
    /// Creates a new builder around the context every handler receives.
    pub fn new(ctx: HandlerContext) -> Self {
        Self {
            handlers: Vec::new(),
            namespace_filter: None,
            ctx,
        }
    }

    /// Adds a handler to the dispatcher.
    pub fn with_handler<H: EventHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Only dispatch events whose namespaces match `filter`.
    ///
    /// Without a filter every event is dispatched.
    pub fn with_namespace_filter(mut self, filter: NamespaceFilter) -> Self {
        self.namespace_filter = Some(filter);
        self
    }

    /// Builds the dispatcher.
    pub fn build(mut self) -> DomainEventDispatcher {
        // Sort handlers by name for deterministic ordering
        self.handlers.sort_by_key(|h| h.name());

        let (inline, spawned): (Vec<_>, Vec<_>) = self
            .handlers
            .into_iter()
            .partition(|h| h.execution_mode() == ExecutionMode::Inline);

        DomainEventDispatcher {
            inline_handlers: inline,
            spawned_handlers: spawned,
            namespace_filter: self.namespace_filter,
            ctx: Arc::new(self.ctx),
        }
    }
}
