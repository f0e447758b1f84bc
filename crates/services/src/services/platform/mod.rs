//! Access to the import platform's REST API.

mod client;
pub mod models;

use async_trait::async_trait;
pub use client::HttpPlatformClient;
use thiserror::Error;

use self::models::{
    ExecutionPlan, Job, JobAck, JobCreate, JobOutcome, RecordsPage, Sheet, Workbook,
    WorkbookCreate,
};

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The subset of the platform API the listener calls.
///
/// Every job a handler acknowledges must later receive exactly one of
/// `complete_job` or `fail_job`.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn ack_job(&self, job_id: &str, ack: &JobAck) -> Result<(), PlatformError>;

    async fn complete_job(&self, job_id: &str, outcome: &JobOutcome)
    -> Result<(), PlatformError>;

    async fn fail_job(&self, job_id: &str, outcome: &JobOutcome) -> Result<(), PlatformError>;

    async fn create_job(&self, job: &JobCreate) -> Result<Job, PlatformError>;

    async fn get_job(&self, job_id: &str) -> Result<Job, PlatformError>;

    async fn get_execution_plan(&self, job_id: &str) -> Result<ExecutionPlan, PlatformError>;

    async fn create_workbook(&self, workbook: &WorkbookCreate)
    -> Result<Workbook, PlatformError>;

    async fn get_workbook(&self, workbook_id: &str) -> Result<Workbook, PlatformError>;

    /// Full-document write. The platform applies it last-write-wins.
    async fn update_workbook(
        &self,
        workbook_id: &str,
        workbook: &Workbook,
    ) -> Result<Workbook, PlatformError>;

    async fn list_sheets(&self, workbook_id: &str) -> Result<Vec<Sheet>, PlatformError>;

    async fn get_sheet(&self, sheet_id: &str) -> Result<Sheet, PlatformError>;

    async fn get_records(&self, sheet_id: &str) -> Result<RecordsPage, PlatformError>;
}
