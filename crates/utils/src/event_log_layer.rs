use std::sync::Arc;

use chrono::Utc;
use tracing::{
    Event, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

use crate::event_log_store::{EventLogEntry, EventLogStore};

/// A tracing layer that captures log events and pushes them to an `EventLogStore`.
pub struct EventLogLayer {
    store: Arc<EventLogStore>,
}

impl EventLogLayer {
    pub fn new(store: Arc<EventLogStore>) -> Self {
        Self { store }
    }
}

impl<S> Layer<S> for EventLogLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let (job_id, message) = visitor.finish();

        self.store.push(EventLogEntry {
            timestamp: Utc::now(),
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            job_id,
            message,
        });
    }
}

/// Visitor to extract the message and `job_id` fields from a tracing event.
///
/// Remaining fields are appended to the message as `name=value` pairs so
/// structured context (sheet ids, error text) survives into the store.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    job_id: Option<String>,
    other_fields: String,
}

impl MessageVisitor {
    fn finish(self) -> (Option<String>, String) {
        let message = match self.message {
            Some(message) if self.other_fields.is_empty() => message,
            Some(message) => format!("{message} ({})", self.other_fields),
            None => self.other_fields,
        };
        (self.job_id, message)
    }

    fn append_field(&mut self, field: &Field, formatted: String) {
        if !self.other_fields.is_empty() {
            self.other_fields.push_str(", ");
        }
        self.other_fields.push_str(field.name());
        self.other_fields.push('=');
        self.other_fields.push_str(&formatted);
    }

    fn record_value(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            "job_id" => self.job_id = Some(value),
            _ => self.append_field(field, value),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_value(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }
}
