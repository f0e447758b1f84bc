//! Wire types for the import platform REST API.
//!
//! Document types that this listener reads and writes back (`Workbook`,
//! `Sheet`, `SheetConfig`, `FieldConfig`, `Record`) keep any attribute they
//! do not model in a flattened `extra` map, so a fetch followed by an update
//! leaves those attributes untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key that marks a field as mapped for the current submit cycle.
pub const MAPPED_METADATA_KEY: &str = "mapped";

/// Every platform response wraps its payload in `{ "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Ready,
    #[serde(rename = "executing", alias = "acknowledged")]
    Acknowledged,
    #[serde(rename = "complete", alias = "completed")]
    Completed,
    Failed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub operation: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub input: Option<Value>,
}

impl Job {
    /// Reads a string entry from the job's input payload.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.as_ref()?.get(key)?.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobTrigger {
    Immediate,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionMode {
    Foreground,
    Background,
    ToolbarBlocking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreate {
    #[serde(rename = "type")]
    pub job_type: String,
    pub operation: String,
    pub source: String,
    pub trigger: JobTrigger,
    pub mode: ActionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAck {
    pub info: String,
    pub progress: u8,
}

/// Terminal message shown to the user when a job completes or fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub message: String,
    /// Requires the user to dismiss the outcome explicitly.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub acknowledge: bool,
}

impl JobOutcome {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            acknowledge: false,
        }
    }

    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            acknowledge: true,
        }
    }
}

/// Body of the complete/fail calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcomeRequest {
    pub outcome: JobOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanField {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMappingEntry {
    pub source_field: PlanField,
    pub destination_field: PlanField,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    #[serde(default)]
    pub field_mapping: Vec<FieldMappingEntry>,
}

/// Response of the execution-plan endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPlan {
    #[serde(default)]
    pub job: Option<Job>,
    pub plan: ExecutionPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldConfig {
    pub fn string(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            field_type: "string".to_string(),
            label: Some(label.to_string()),
            metadata: None,
            extra: Map::new(),
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(MAPPED_METADATA_KEY))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook_id: Option<String>,
    pub name: String,
    pub config: SheetConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub operation: String,
    pub mode: ActionMode,
    pub label: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookCreate {
    pub space_id: String,
    pub name: String,
    pub sheets: Vec<SheetConfig>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordsPage {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecordsPage {
    /// Keeps only the cell values whose key is in `keys`.
    pub fn project(mut self, keys: &std::collections::BTreeSet<String>) -> Self {
        for record in &mut self.records {
            record.values.retain(|key, _| keys.contains(key));
        }
        self
    }
}
