use async_trait::async_trait;
use serde_json::json;

use crate::services::{
    domain_events::{DomainEvent, EventHandler, ExecutionMode, HandlerContext, HandlerError, jobs},
    platform::models::{ActionMode, JobCreate, JobTrigger},
};

/// Input key carrying the completed mapping job's id to the follow-up job.
pub const MAPPING_JOB_ID_INPUT: &str = "mappingJobId";

/// Queues the "view mapped fields only" job once column mapping completes.
///
/// The triggering mapping job is owned by the platform, so this handler
/// neither acknowledges nor settles it.
pub struct MappingCompletedHandler;

impl MappingCompletedHandler {
    pub fn follow_up_job(workbook_id: &str, mapping_job_id: &str) -> JobCreate {
        JobCreate {
            job_type: "workbook".to_string(),
            operation: "viewMappedFieldsOnly".to_string(),
            source: workbook_id.to_string(),
            trigger: JobTrigger::Immediate,
            mode: ActionMode::Foreground,
            input: Some(json!({ MAPPING_JOB_ID_INPUT: mapping_job_id })),
        }
    }
}

#[async_trait]
impl EventHandler for MappingCompletedHandler {
    fn name(&self) -> &'static str {
        "mapping_completed"
    }

    fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::Spawned
    }

    fn handles(&self, event: &DomainEvent) -> bool {
        event.is_completed(jobs::WORKBOOK_MAP)
    }

    async fn handle(&self, event: DomainEvent, ctx: &HandlerContext) -> Result<(), HandlerError> {
        let context = event.context();
        let mapping_job_id = context.require_job_id()?;
        let workbook_id = context
            .workbook_id
            .as_deref()
            .ok_or(HandlerError::MissingContext("workbookId"))?;

        let job = ctx
            .platform
            .create_job(&Self::follow_up_job(workbook_id, mapping_job_id))
            .await?;

        tracing::info!(
            job_id = %job.id,
            mapping_job_id = %mapping_job_id,
            workbook_id = %workbook_id,
            "Queued view-mapped-fields job"
        );
        Ok(())
    }
}
