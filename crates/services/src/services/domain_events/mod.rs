mod dispatcher;
mod handler;
pub mod handlers;
mod namespace;
mod outcome;

pub use dispatcher::{DispatcherBuilder, DomainEventDispatcher};
pub use handler::{EventHandler, ExecutionMode, HandlerContext, HandlerError};
pub use handlers::{
    MappedFieldsViewHandler, MappingCompletedHandler, SpaceConfigureHandler, SubmitHandler,
};
pub use namespace::NamespaceFilter;
pub use outcome::settle_job;
use serde::{Deserialize, Serialize};

/// Job keys (`domain:operation`) the listener reacts to.
pub mod jobs {
    pub const SPACE_CONFIGURE: &str = "space:configure";
    pub const WORKBOOK_MAP: &str = "workbook:map";
    pub const VIEW_MAPPED_FIELDS_ONLY: &str = "workbook:viewMappedFieldsOnly";
    pub const SUBMIT_ACTION: &str = "workbook:submitAction";
}

pub const TOPIC_JOB_READY: &str = "job:ready";
pub const TOPIC_JOB_COMPLETED: &str = "job:completed";
pub const TOPIC_JOB_FAILED: &str = "job:failed";

/// Identifiers attached to a platform event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
    #[serde(default)]
    pub namespaces: Vec<String>,
}

impl EventContext {
    pub fn require_job_id(&self) -> Result<&str, HandlerError> {
        self.job_id
            .as_deref()
            .ok_or(HandlerError::MissingContext("jobId"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// An event as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformEvent {
    pub id: String,
    pub topic: String,
    #[serde(default)]
    pub context: EventContext,
    #[serde(default)]
    pub payload: EventPayload,
}

impl PlatformEvent {
    /// `payload.job`, or `domain:operation` when the platform left it out.
    pub fn job_key(&self) -> Option<String> {
        if let Some(job) = &self.payload.job {
            return Some(job.clone());
        }
        match (&self.payload.domain, &self.payload.operation) {
            (Some(domain), Some(operation)) => Some(format!("{domain}:{operation}")),
            _ => None,
        }
    }
}

/// Job lifecycle events that can trigger handler execution.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// A job is ready to be executed.
    JobReady { job: String, context: EventContext },

    /// A job finished successfully.
    JobCompleted { job: String, context: EventContext },

    /// A job finished with a failure.
    JobFailed { job: String, context: EventContext },
}

impl DomainEvent {
    /// Converts a raw platform event. Topics other than job lifecycle
    /// events, and job events without a job key, yield `None`.
    pub fn from_platform(event: PlatformEvent) -> Option<Self> {
        let job = event.job_key()?;
        let context = event.context;
        match event.topic.as_str() {
            TOPIC_JOB_READY => Some(Self::JobReady { job, context }),
            TOPIC_JOB_COMPLETED => Some(Self::JobCompleted { job, context }),
            TOPIC_JOB_FAILED => Some(Self::JobFailed { job, context }),
            _ => None,
        }
    }

    pub fn topic(&self) -> &'static str {
        match self {
            Self::JobReady { .. } => TOPIC_JOB_READY,
            Self::JobCompleted { .. } => TOPIC_JOB_COMPLETED,
            Self::JobFailed { .. } => TOPIC_JOB_FAILED,
        }
    }

    pub fn job(&self) -> &str {
        match self {
            Self::JobReady { job, .. }
            | Self::JobCompleted { job, .. }
            | Self::JobFailed { job, .. } => job,
        }
    }

    pub fn context(&self) -> &EventContext {
        match self {
            Self::JobReady { context, .. }
            | Self::JobCompleted { context, .. }
            | Self::JobFailed { context, .. } => context,
        }
    }

    pub fn is_ready(&self, job: &str) -> bool {
        matches!(self, Self::JobReady { job: j, .. } if j == job)
    }

    pub fn is_completed(&self, job: &str) -> bool {
        matches!(self, Self::JobCompleted { job: j, .. } if j == job)
    }
}
