use async_trait::async_trait;

use super::{ACK_PROGRESS, MAPPING_JOB_ID_INPUT};
use crate::services::{
    domain_events::{
        DomainEvent, EventHandler, ExecutionMode, HandlerContext, HandlerError, jobs, settle_job,
    },
    field_visibility::{mapped_field_keys, restrict_to_mapped},
    platform::{
        PlatformApi,
        models::{JobAck, JobOutcome, SheetConfig},
    },
    schema::workbook_blueprint,
};

const SUCCESS_MESSAGE: &str = "Table update complete. Please audit the data";
const FAILURE_MESSAGE: &str = "An error occurred while updating the workbook. See Event Logs.";

/// Narrows the workbook to the fields the user mapped.
///
/// Reads the execution plan of the mapping job named in this job's input,
/// flags the matched fields, and writes back a workbook whose sheets only
/// list those fields. The flagged set lives only in this invocation and in
/// the written workbook.
pub struct MappedFieldsViewHandler {
    blueprint: Vec<SheetConfig>,
}

impl MappedFieldsViewHandler {
    pub fn new() -> Self {
        Self::with_blueprint(workbook_blueprint())
    }

    pub fn with_blueprint(blueprint: Vec<SheetConfig>) -> Self {
        Self { blueprint }
    }

    async fn narrow(
        &self,
        platform: &dyn PlatformApi,
        job_id: &str,
        workbook_id: Option<&str>,
    ) -> Result<JobOutcome, HandlerError> {
        platform
            .ack_job(
                job_id,
                &JobAck {
                    info: "Updating the table to only view mapped fields".to_string(),
                    progress: ACK_PROGRESS,
                },
            )
            .await?;

        let job = platform.get_job(job_id).await?;
        let mapping_job_id = job.input_str(MAPPING_JOB_ID_INPUT).ok_or_else(|| {
            HandlerError::Failed(format!("job {job_id} has no {MAPPING_JOB_ID_INPUT} input"))
        })?;
        let workbook_id = workbook_id
            .or(job.source.as_deref())
            .ok_or(HandlerError::MissingContext("workbookId"))?;

        let plan = platform.get_execution_plan(mapping_job_id).await?;
        let keys = mapped_field_keys(&plan);
        tracing::debug!(
            job_id = %job_id,
            mapping_job_id = %mapping_job_id,
            mapped = ?keys,
            "Resolved mapped fields"
        );

        let workbook = platform.get_workbook(workbook_id).await?;
        let restricted = restrict_to_mapped(workbook, &self.blueprint, &keys);
        platform.update_workbook(workbook_id, &restricted).await?;

        tracing::info!(
            job_id = %job_id,
            workbook_id = %workbook_id,
            mapped_fields = keys.len(),
            "Workbook narrowed to mapped fields"
        );

        Ok(JobOutcome::acknowledged(SUCCESS_MESSAGE))
    }
}

impl Default for MappedFieldsViewHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler for MappedFieldsViewHandler {
    fn name(&self) -> &'static str {
        "mapped_fields_view"
    }

    fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::Spawned
    }

    fn handles(&self, event: &DomainEvent) -> bool {
        event.is_ready(jobs::VIEW_MAPPED_FIELDS_ONLY)
    }

    async fn handle(&self, event: DomainEvent, ctx: &HandlerContext) -> Result<(), HandlerError> {
        let context = event.context();
        let job_id = context.require_job_id()?;
        let platform = ctx.platform.as_ref();

        let result = self
            .narrow(platform, job_id, context.workbook_id.as_deref())
            .await;
        settle_job(platform, job_id, result, FAILURE_MESSAGE).await
    }
}
