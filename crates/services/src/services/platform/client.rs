use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use super::{
    PlatformApi, PlatformError,
    models::{
        DataEnvelope, ExecutionPlan, Job, JobAck, JobCreate, JobOutcome, JobOutcomeRequest,
        JobPlan, RecordsPage, Sheet, Workbook, WorkbookCreate,
    },
};

/// `PlatformApi` implementation over HTTP.
pub struct HttpPlatformClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl HttpPlatformClient {
    pub fn new(base_url: Url, api_key: SecretString) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_client(client: reqwest::Client, base_url: Url, api_key: SecretString) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(self.api_key.expose_secret())
    }

    async fn send(
        &self,
        endpoint: &str,
        rb: RequestBuilder,
    ) -> Result<reqwest::Response, PlatformError> {
        let resp = rb.send().await.map_err(|source| PlatformError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlatformError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp)
    }

    async fn send_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        rb: RequestBuilder,
    ) -> Result<T, PlatformError> {
        let resp = self.send(endpoint, rb).await?;
        let envelope = resp
            .json::<DataEnvelope<T>>()
            .await
            .map_err(|source| PlatformError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Ok(envelope.data)
    }

    async fn post_outcome(
        &self,
        endpoint: &str,
        outcome: &JobOutcome,
    ) -> Result<(), PlatformError> {
        let body = JobOutcomeRequest {
            outcome: outcome.clone(),
        };
        self.send(endpoint, self.json(Method::POST, endpoint, &body))
            .await
            .map(drop)
    }

    fn json<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> RequestBuilder {
        self.request(method, path).json(body)
    }
}

#[async_trait]
impl PlatformApi for HttpPlatformClient {
    async fn ack_job(&self, job_id: &str, ack: &JobAck) -> Result<(), PlatformError> {
        let endpoint = format!("jobs/{job_id}/ack");
        self.send(&endpoint, self.json(Method::POST, &endpoint, ack))
            .await
            .map(drop)
    }

    async fn complete_job(
        &self,
        job_id: &str,
        outcome: &JobOutcome,
    ) -> Result<(), PlatformError> {
        self.post_outcome(&format!("jobs/{job_id}/complete"), outcome)
            .await
    }

    async fn fail_job(&self, job_id: &str, outcome: &JobOutcome) -> Result<(), PlatformError> {
        self.post_outcome(&format!("jobs/{job_id}/fail"), outcome)
            .await
    }

    async fn create_job(&self, job: &JobCreate) -> Result<Job, PlatformError> {
        self.send_data("jobs", self.json(Method::POST, "jobs", job))
            .await
    }

    async fn get_job(&self, job_id: &str) -> Result<Job, PlatformError> {
        let endpoint = format!("jobs/{job_id}");
        self.send_data(&endpoint, self.request(Method::GET, &endpoint))
            .await
    }

    async fn get_execution_plan(&self, job_id: &str) -> Result<ExecutionPlan, PlatformError> {
        let endpoint = format!("jobs/{job_id}/plan");
        let plan: JobPlan = self
            .send_data(&endpoint, self.request(Method::GET, &endpoint))
            .await?;
        Ok(plan.plan)
    }

    async fn create_workbook(
        &self,
        workbook: &WorkbookCreate,
    ) -> Result<Workbook, PlatformError> {
        self.send_data("workbooks", self.json(Method::POST, "workbooks", workbook))
            .await
    }

    async fn get_workbook(&self, workbook_id: &str) -> Result<Workbook, PlatformError> {
        let endpoint = format!("workbooks/{workbook_id}");
        self.send_data(&endpoint, self.request(Method::GET, &endpoint))
            .await
    }

    async fn update_workbook(
        &self,
        workbook_id: &str,
        workbook: &Workbook,
    ) -> Result<Workbook, PlatformError> {
        let endpoint = format!("workbooks/{workbook_id}");
        self.send_data(&endpoint, self.json(Method::PATCH, &endpoint, workbook))
            .await
    }

    async fn list_sheets(&self, workbook_id: &str) -> Result<Vec<Sheet>, PlatformError> {
        let rb = self
            .request(Method::GET, "sheets")
            .query(&[("workbookId", workbook_id)]);
        self.send_data("sheets", rb).await
    }

    async fn get_sheet(&self, sheet_id: &str) -> Result<Sheet, PlatformError> {
        let endpoint = format!("sheets/{sheet_id}");
        self.send_data(&endpoint, self.request(Method::GET, &endpoint))
            .await
    }

    async fn get_records(&self, sheet_id: &str) -> Result<RecordsPage, PlatformError> {
        let endpoint = format!("sheets/{sheet_id}/records");
        self.send_data(&endpoint, self.request(Method::GET, &endpoint))
            .await
    }
}
