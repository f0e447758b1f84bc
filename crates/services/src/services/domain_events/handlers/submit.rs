use std::collections::BTreeSet;

use async_trait::async_trait;

use super::ACK_PROGRESS;
use crate::services::{
    domain_events::{
        DomainEvent, EventHandler, ExecutionMode, HandlerContext, HandlerError, jobs, settle_job,
    },
    field_visibility::{mapped_keys_of, strip_mapped_flag},
    platform::{
        PlatformApi, PlatformError,
        models::{JobAck, JobOutcome, RecordsPage},
    },
    webhook::SubmissionPayload,
};

const SUCCESS_MESSAGE: &str = "Mapped fields were submitted to the webhook receiver";
const FAILURE_MESSAGE: &str = "Submitting the data encountered an error. See event logs";

/// Sends the records of mapped fields to the webhook receiver.
///
/// After a successful delivery the `mapped` flags are removed from the
/// workbook, so pressing Submit again without re-mapping sends nothing. When
/// delivery fails the flags stay and a later retry resends the same data.
pub struct SubmitHandler;

impl SubmitHandler {
    /// Records of `sheet_id` restricted to its mapped fields, or `None` when
    /// the sheet has no mapped field.
    async fn collect_sheet(
        platform: &dyn PlatformApi,
        sheet_id: &str,
    ) -> Result<Option<RecordsPage>, PlatformError> {
        let sheet = platform.get_sheet(sheet_id).await?;
        let keys: BTreeSet<String> = mapped_keys_of(&sheet);
        if keys.is_empty() {
            return Ok(None);
        }

        let records = platform.get_records(sheet_id).await?;
        Ok(Some(records.project(&keys)))
    }

    async fn submit(
        &self,
        ctx: &HandlerContext,
        job_id: &str,
        workbook_id: Option<&str>,
    ) -> Result<JobOutcome, HandlerError> {
        let platform = ctx.platform.as_ref();
        platform
            .ack_job(
                job_id,
                &JobAck {
                    info: "Acknowledging the Submit job that is now ready to execute".to_string(),
                    progress: ACK_PROGRESS,
                },
            )
            .await?;

        let workbook_id = workbook_id.ok_or(HandlerError::MissingContext("workbookId"))?;
        let sheets = platform.list_sheets(workbook_id).await?;

        let mut payload = SubmissionPayload::default();
        let mut skipped = 0usize;
        for sheet in &sheets {
            match Self::collect_sheet(platform, &sheet.id).await {
                Ok(Some(records)) => {
                    tracing::debug!(
                        job_id = %job_id,
                        sheet_id = %sheet.id,
                        records = records.records.len(),
                        "Collected mapped records"
                    );
                    payload.insert_sheet(&sheet.id, records);
                }
                Ok(None) => {}
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(
                        job_id = %job_id,
                        sheet_id = %sheet.id,
                        error = %e,
                        "Failed to fetch data for sheet, skipping it"
                    );
                }
            }
        }

        ctx.webhook.send(&payload).await?;

        let workbook = platform.get_workbook(workbook_id).await?;
        let (cleaned, removed) = strip_mapped_flag(workbook);
        platform.update_workbook(workbook_id, &cleaned).await?;

        tracing::info!(
            job_id = %job_id,
            workbook_id = %workbook_id,
            sheets_sent = payload.records.len(),
            flags_cleared = removed,
            "Submission delivered"
        );

        if skipped == 0 {
            Ok(JobOutcome::new(SUCCESS_MESSAGE))
        } else {
            Ok(JobOutcome::new(format!(
                "{SUCCESS_MESSAGE}. {skipped} sheet(s) could not be read, see event logs"
            )))
        }
    }
}

#[async_trait]
impl EventHandler for SubmitHandler {
    fn name(&self) -> &'static str {
        "submit"
    }

    fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::Spawned
    }

    fn handles(&self, event: &DomainEvent) -> bool {
        event.is_ready(jobs::SUBMIT_ACTION)
    }

    async fn handle(&self, event: DomainEvent, ctx: &HandlerContext) -> Result<(), HandlerError> {
        let context = event.context();
        let job_id = context.require_job_id()?;

        let result = self
            .submit(ctx, job_id, context.workbook_id.as_deref())
            .await;
        settle_job(ctx.platform.as_ref(), job_id, result, FAILURE_MESSAGE).await
    }
}
