use async_trait::async_trait;

use super::ACK_PROGRESS;
use crate::services::{
    domain_events::{
        DomainEvent, EventHandler, ExecutionMode, HandlerContext, HandlerError, jobs, settle_job,
    },
    platform::{
        PlatformApi,
        models::{JobAck, JobOutcome, SheetConfig, WorkbookCreate},
    },
    schema::{submit_action, workbook_blueprint},
};

const SUCCESS_MESSAGE: &str =
    "Space is created with 1 workbook, 2 sheets, and a workbook-level Submit button";
const FAILURE_MESSAGE: &str = "Creating a Space encountered an error. See Event Logs.";

/// Provisions a new space with the blueprint workbook and its Submit action.
pub struct SpaceConfigureHandler {
    workbook_name: String,
    sheets: Vec<SheetConfig>,
}

impl SpaceConfigureHandler {
    pub fn new(workbook_name: impl Into<String>) -> Self {
        Self {
            workbook_name: workbook_name.into(),
            sheets: workbook_blueprint(),
        }
    }

    async fn provision(
        &self,
        platform: &dyn PlatformApi,
        job_id: &str,
        space_id: Option<&str>,
    ) -> Result<JobOutcome, HandlerError> {
        platform
            .ack_job(
                job_id,
                &JobAck {
                    info: "Acknowledging the 'space:configure' job that is ready to execute and \
                           create a space with 1 workbook, 2 sheets and a workbook-level Submit \
                           action"
                        .to_string(),
                    progress: ACK_PROGRESS,
                },
            )
            .await?;

        let space_id = space_id.ok_or(HandlerError::MissingContext("spaceId"))?;

        let workbook = platform
            .create_workbook(&WorkbookCreate {
                space_id: space_id.to_string(),
                name: self.workbook_name.clone(),
                sheets: self.sheets.clone(),
                actions: vec![submit_action()],
            })
            .await?;

        tracing::info!(
            job_id = %job_id,
            space_id = %space_id,
            workbook_id = %workbook.id,
            "Workbook created for space"
        );

        Ok(JobOutcome::new(SUCCESS_MESSAGE))
    }
}

#[async_trait]
impl EventHandler for SpaceConfigureHandler {
    fn name(&self) -> &'static str {
        "space_configure"
    }

    fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::Spawned
    }

    fn handles(&self, event: &DomainEvent) -> bool {
        event.is_ready(jobs::SPACE_CONFIGURE)
    }

    async fn handle(&self, event: DomainEvent, ctx: &HandlerContext) -> Result<(), HandlerError> {
        let context = event.context();
        let job_id = context.require_job_id()?;
        let platform = ctx.platform.as_ref();

        let result = self
            .provision(platform, job_id, context.space_id.as_deref())
            .await;
        settle_job(platform, job_id, result, FAILURE_MESSAGE).await
    }
}
