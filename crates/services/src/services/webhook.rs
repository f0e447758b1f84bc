use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::services::platform::models::RecordsPage;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Failed to reach webhook receiver: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Webhook receiver returned status {0}")]
    UnexpectedStatus(u16),
}

/// Body posted to the webhook receiver on submit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub records: BTreeMap<String, RecordsPage>,
}

impl SubmissionPayload {
    /// Key under which a sheet's records are sent.
    pub fn sheet_label(sheet_id: &str) -> String {
        format!("Sheet ID: {sheet_id}")
    }

    pub fn insert_sheet(&mut self, sheet_id: &str, records: RecordsPage) {
        self.records.insert(Self::sheet_label(sheet_id), records);
    }
}

#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn send(&self, payload: &SubmissionPayload) -> Result<(), WebhookError>;
}

/// Posts submissions as JSON to a fixed receiver URL.
#[derive(Debug, Clone)]
pub struct HttpWebhookSender {
    client: reqwest::Client,
    receiver: Url,
}

impl HttpWebhookSender {
    pub fn new(receiver: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            receiver,
        }
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn send(&self, payload: &SubmissionPayload) -> Result<(), WebhookError> {
        let resp = self
            .client
            .post(self.receiver.clone())
            .json(payload)
            .send()
            .await?;

        // Only a plain 200 counts as delivered.
        if resp.status() != StatusCode::OK {
            return Err(WebhookError::UnexpectedStatus(resp.status().as_u16()));
        }

        tracing::debug!(
            receiver = %self.receiver,
            sheets = payload.records.len(),
            "Submission delivered"
        );
        Ok(())
    }
}
