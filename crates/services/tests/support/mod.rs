//! Shared fakes for the handler tests.
#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use services::services::{
    domain_events::{DomainEvent, EventContext, HandlerContext},
    platform::{
        PlatformApi, PlatformError,
        models::{
            ExecutionPlan, FieldMappingEntry, Job, JobAck, JobCreate, JobOutcome, JobStatus,
            PlanField, Record, RecordsPage, Sheet, SheetConfig, Workbook, WorkbookCreate,
        },
    },
    webhook::{SubmissionPayload, WebhookError, WebhookSender},
};

// ============================================================================
// Fake platform
// ============================================================================

#[derive(Default)]
pub struct PlatformState {
    pub jobs: HashMap<String, Job>,
    pub plans: HashMap<String, ExecutionPlan>,
    pub workbooks: HashMap<String, Workbook>,
    pub records: HashMap<String, RecordsPage>,
    /// Sheets whose `get_sheet` call fails.
    pub failing_sheets: HashSet<String>,
    /// Operations (by method name) that fail with a 500.
    pub failing_ops: HashSet<&'static str>,
    /// Every call in order, by method name.
    pub calls: Vec<&'static str>,
    pub acks: Vec<(String, JobAck)>,
    pub completed: Vec<(String, JobOutcome)>,
    pub failed: Vec<(String, JobOutcome)>,
    pub created_jobs: Vec<JobCreate>,
    pub created_workbooks: Vec<WorkbookCreate>,
    pub workbook_updates: Vec<Workbook>,
    next_id: usize,
}

impl PlatformState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }

    pub fn calls_of(&self, op: &str) -> usize {
        self.calls.iter().filter(|c| **c == op).count()
    }
}

#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<PlatformState>,
}

fn status_error(endpoint: &str, status: u16, body: &str) -> PlatformError {
    PlatformError::Status {
        endpoint: endpoint.to_string(),
        status,
        body: body.to_string(),
    }
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap()
    }

    fn begin(&self, op: &'static str) -> Result<MutexGuard<'_, PlatformState>, PlatformError> {
        let mut state = self.state();
        state.calls.push(op);
        if state.failing_ops.contains(op) {
            return Err(status_error(op, 500, "injected failure"));
        }
        Ok(state)
    }

    pub fn fail_op(&self, op: &'static str) {
        self.state().failing_ops.insert(op);
    }

    pub fn fail_sheet(&self, sheet_id: &str) {
        self.state().failing_sheets.insert(sheet_id.to_string());
    }

    /// Stores a workbook whose sheets get ids `us_sh_<slug>`.
    pub fn seed_workbook(&self, workbook_id: &str, configs: Vec<SheetConfig>) -> Workbook {
        let sheets = configs
            .into_iter()
            .map(|config| Sheet {
                id: format!("us_sh_{}", config.slug.clone().unwrap_or_default()),
                workbook_id: Some(workbook_id.to_string()),
                name: config.name.clone(),
                config,
                extra: Map::new(),
            })
            .collect();
        let workbook = Workbook {
            id: workbook_id.to_string(),
            name: "Workbook One".to_string(),
            space_id: Some("us_sp_1".to_string()),
            sheets,
            extra: Map::new(),
        };
        self.put_workbook(workbook.clone());
        workbook
    }

    pub fn put_workbook(&self, workbook: Workbook) {
        self.state()
            .workbooks
            .insert(workbook.id.clone(), workbook);
    }

    pub fn workbook(&self, workbook_id: &str) -> Workbook {
        self.state().workbooks[workbook_id].clone()
    }

    pub fn seed_job(&self, job: Job) {
        self.state().jobs.insert(job.id.clone(), job);
    }

    pub fn seed_plan(&self, job_id: &str, destination_keys: &[&str]) {
        self.state()
            .plans
            .insert(job_id.to_string(), plan(destination_keys));
    }

    pub fn seed_records(&self, sheet_id: &str, page: RecordsPage) {
        self.state().records.insert(sheet_id.to_string(), page);
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn ack_job(&self, job_id: &str, ack: &JobAck) -> Result<(), PlatformError> {
        let mut state = self.begin("ack_job")?;
        state.acks.push((job_id.to_string(), ack.clone()));
        Ok(())
    }

    async fn complete_job(&self, job_id: &str, outcome: &JobOutcome) -> Result<(), PlatformError> {
        let mut state = self.begin("complete_job")?;
        state.completed.push((job_id.to_string(), outcome.clone()));
        Ok(())
    }

    async fn fail_job(&self, job_id: &str, outcome: &JobOutcome) -> Result<(), PlatformError> {
        let mut state = self.begin("fail_job")?;
        state.failed.push((job_id.to_string(), outcome.clone()));
        Ok(())
    }

    async fn create_job(&self, job: &JobCreate) -> Result<Job, PlatformError> {
        let mut state = self.begin("create_job")?;
        let created = Job {
            id: state.next_id("us_jb"),
            job_type: job.job_type.clone(),
            operation: job.operation.clone(),
            source: Some(job.source.clone()),
            status: Some(JobStatus::Ready),
            input: job.input.clone(),
        };
        state.created_jobs.push(job.clone());
        state.jobs.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn get_job(&self, job_id: &str) -> Result<Job, PlatformError> {
        let state = self.begin("get_job")?;
        state
            .jobs
            .get(job_id)
            .cloned()
            .ok_or_else(|| status_error("get_job", 404, job_id))
    }

    async fn get_execution_plan(&self, job_id: &str) -> Result<ExecutionPlan, PlatformError> {
        let state = self.begin("get_execution_plan")?;
        state
            .plans
            .get(job_id)
            .cloned()
            .ok_or_else(|| status_error("get_execution_plan", 404, job_id))
    }

    async fn create_workbook(&self, workbook: &WorkbookCreate) -> Result<Workbook, PlatformError> {
        let mut state = self.begin("create_workbook")?;
        let id = state.next_id("us_wb");
        let sheets = workbook
            .sheets
            .iter()
            .map(|config| Sheet {
                id: format!("us_sh_{}", config.slug.clone().unwrap_or_default()),
                workbook_id: Some(id.clone()),
                name: config.name.clone(),
                config: config.clone(),
                extra: Map::new(),
            })
            .collect();
        let created = Workbook {
            id: id.clone(),
            name: workbook.name.clone(),
            space_id: Some(workbook.space_id.clone()),
            sheets,
            extra: Map::new(),
        };
        state.created_workbooks.push(workbook.clone());
        state.workbooks.insert(id, created.clone());
        Ok(created)
    }

    async fn get_workbook(&self, workbook_id: &str) -> Result<Workbook, PlatformError> {
        let state = self.begin("get_workbook")?;
        state
            .workbooks
            .get(workbook_id)
            .cloned()
            .ok_or_else(|| status_error("get_workbook", 404, workbook_id))
    }

    async fn update_workbook(
        &self,
        workbook_id: &str,
        workbook: &Workbook,
    ) -> Result<Workbook, PlatformError> {
        let mut state = self.begin("update_workbook")?;
        state.workbook_updates.push(workbook.clone());
        state
            .workbooks
            .insert(workbook_id.to_string(), workbook.clone());
        Ok(workbook.clone())
    }

    async fn list_sheets(&self, workbook_id: &str) -> Result<Vec<Sheet>, PlatformError> {
        let state = self.begin("list_sheets")?;
        state
            .workbooks
            .get(workbook_id)
            .map(|wb| wb.sheets.clone())
            .ok_or_else(|| status_error("list_sheets", 404, workbook_id))
    }

    async fn get_sheet(&self, sheet_id: &str) -> Result<Sheet, PlatformError> {
        let state = self.begin("get_sheet")?;
        if state.failing_sheets.contains(sheet_id) {
            return Err(status_error("get_sheet", 500, sheet_id));
        }
        state
            .workbooks
            .values()
            .flat_map(|wb| &wb.sheets)
            .find(|s| s.id == sheet_id)
            .cloned()
            .ok_or_else(|| status_error("get_sheet", 404, sheet_id))
    }

    async fn get_records(&self, sheet_id: &str) -> Result<RecordsPage, PlatformError> {
        let state = self.begin("get_records")?;
        Ok(state.records.get(sheet_id).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Recording webhook
// ============================================================================

pub struct RecordingWebhook {
    status: Mutex<u16>,
    sent: Mutex<Vec<SubmissionPayload>>,
}

impl RecordingWebhook {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(200),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn respond_with(&self, status: u16) {
        *self.status.lock().unwrap() = status;
    }

    pub fn payloads(&self) -> Vec<SubmissionPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookSender for RecordingWebhook {
    async fn send(&self, payload: &SubmissionPayload) -> Result<(), WebhookError> {
        self.sent.lock().unwrap().push(payload.clone());
        let status = *self.status.lock().unwrap();
        if status != 200 {
            return Err(WebhookError::UnexpectedStatus(status));
        }
        Ok(())
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn handler_context(
    platform: &Arc<FakePlatform>,
    webhook: &Arc<RecordingWebhook>,
) -> HandlerContext {
    HandlerContext::new(platform.clone(), webhook.clone())
}

pub fn event_context(
    job_id: &str,
    space_id: Option<&str>,
    workbook_id: Option<&str>,
) -> EventContext {
    EventContext {
        job_id: Some(job_id.to_string()),
        space_id: space_id.map(str::to_string),
        workbook_id: workbook_id.map(str::to_string),
        environment_id: Some("us_env_1".to_string()),
        namespaces: vec!["workbook:appOne".to_string()],
    }
}

pub fn job_ready(job: &str, context: EventContext) -> DomainEvent {
    DomainEvent::JobReady {
        job: job.to_string(),
        context,
    }
}

pub fn job_completed(job: &str, context: EventContext) -> DomainEvent {
    DomainEvent::JobCompleted {
        job: job.to_string(),
        context,
    }
}

pub fn plan(destination_keys: &[&str]) -> ExecutionPlan {
    ExecutionPlan {
        field_mapping: destination_keys
            .iter()
            .map(|key| FieldMappingEntry {
                source_field: PlanField {
                    key: format!("Source {key}"),
                    label: None,
                },
                destination_field: PlanField {
                    key: key.to_string(),
                    label: None,
                },
            })
            .collect(),
    }
}

/// One record per row; every cell is `{ "value": ... }`.
pub fn records(rows: &[&[(&str, &str)]]) -> RecordsPage {
    RecordsPage {
        records: rows
            .iter()
            .enumerate()
            .map(|(i, row)| Record {
                id: format!("us_rc_{i}"),
                values: row
                    .iter()
                    .map(|(key, value)| (key.to_string(), json!({ "value": value })))
                    .collect(),
                extra: Map::new(),
            })
            .collect(),
        extra: Map::new(),
    }
}

pub fn mapped_keys(workbook: &Workbook) -> Vec<String> {
    workbook
        .sheets
        .iter()
        .flat_map(|s| &s.config.fields)
        .filter(|f| f.is_mapped())
        .map(|f| f.key.clone())
        .collect()
}

pub fn value_keys(page: &RecordsPage) -> Vec<Vec<String>> {
    page.records
        .iter()
        .map(|r| r.values.keys().cloned().collect())
        .collect()
}

pub fn as_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}
