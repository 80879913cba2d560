use std::sync::Arc;
use std::time::Duration;

use orchestrator_logging::{orch_debug, orch_info};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::filename::form_filename;
use crate::upload::progress_body;
use crate::{
    ClientError, DownloadedForm, EngineEvent, FailureKind, RequestId, SubmissionReply,
    WorkflowReply,
};

pub const WORKFLOW_PATH: &str = "/workflow";
pub const HEALTH_PATH: &str = "/health";
pub const SUBMIT_PATH: &str = "/submit_leave_to_iflow";
pub const UPLOAD_PATH: &str = "/upload/leave_document";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base URL of the orchestrator that routes tasks to domain agents.
    pub orchestrator_url: String,
    /// Base URL of the HR agent serving uploads, forms and submissions.
    pub agent_url: String,
    pub connect_timeout: Duration,
    /// `None` waits for as long as the agent takes.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            orchestrator_url:
                "https://orchestrator-responsive-jaguar-ct.cfapps.us10-001.hana.ondemand.com"
                    .to_string(),
            agent_url: "https://hr-agent-fearless-gorilla-qc.cfapps.us10-001.hana.ondemand.com"
                .to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Some(Duration::from_secs(120)),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The remote services the conversation client talks to.
#[async_trait::async_trait]
pub trait OrchestratorApi: Send + Sync {
    async fn submit_task(&self, domain: &str, task: &str) -> Result<WorkflowReply, ClientError>;

    async fn submit_extracted_data(
        &self,
        data: &Map<String, Value>,
    ) -> Result<SubmissionReply, ClientError>;

    async fn upload_document(
        &self,
        request_id: RequestId,
        file_name: &str,
        bytes: Vec<u8>,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<WorkflowReply, ClientError>;

    /// Fetches `relative_url` from the agent; the url is not validated.
    async fn download_form(&self, relative_url: &str) -> Result<DownloadedForm, ClientError>;

    async fn health(&self) -> Result<(), ClientError>;
}

#[derive(Debug, Serialize)]
struct TaskBody<'a> {
    domain: &'a str,
    task: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn orchestrator(&self, path: &str) -> Result<reqwest::Url, ClientError> {
        join(&self.settings.orchestrator_url, path)
    }

    fn agent(&self, path: &str) -> Result<reqwest::Url, ClientError> {
        join(&self.settings.agent_url, path)
    }
}

#[async_trait::async_trait]
impl OrchestratorApi for ReqwestClient {
    async fn submit_task(&self, domain: &str, task: &str) -> Result<WorkflowReply, ClientError> {
        let url = self.orchestrator(WORKFLOW_PATH)?;
        orch_info!("POST {} domain={} task_len={}", url, domain, task.len());
        let response = self
            .client
            .post(url)
            .json(&TaskBody { domain, task })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(response).await
    }

    async fn submit_extracted_data(
        &self,
        data: &Map<String, Value>,
    ) -> Result<SubmissionReply, ClientError> {
        let url = self.agent(SUBMIT_PATH)?;
        orch_info!("POST {} fields={}", url, data.len());
        let response = self
            .client
            .post(url)
            .json(data)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(response).await
    }

    async fn upload_document(
        &self,
        request_id: RequestId,
        file_name: &str,
        bytes: Vec<u8>,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<WorkflowReply, ClientError> {
        let url = self.agent(UPLOAD_PATH)?;
        let total = bytes.len() as u64;
        orch_info!("POST {} file={} bytes={}", url, file_name, total);

        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = reqwest::multipart::Part::stream_with_length(
            progress_body(request_id, bytes, sink),
            total,
        )
        .file_name(file_name.to_string())
        .mime_str(mime.essence_str())
        .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(response).await
    }

    async fn download_form(&self, relative_url: &str) -> Result<DownloadedForm, ClientError> {
        let url = format!("{}{}", self.settings.agent_url, relative_url);
        let parsed = reqwest::Url::parse(&url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        orch_info!("GET {}", parsed);
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(DownloadedForm {
            file_name: form_filename(relative_url, content_type.as_deref()),
            url,
            bytes: bytes.to_vec(),
        })
    }

    async fn health(&self) -> Result<(), ClientError> {
        let url = self.orchestrator(HEALTH_PATH)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response)?;
        Ok(())
    }
}

fn join(base: &str, path: &str) -> Result<reqwest::Url, ClientError> {
    let full = format!("{}{}", base.trim_end_matches('/'), path);
    reqwest::Url::parse(&full).map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
}

fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(ClientError::new(
        FailureKind::HttpStatus(status.as_u16()),
        status.canonical_reason().unwrap_or("Unknown Status"),
    ))
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let response = ensure_success(response)?;
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    orch_debug!("Received {} byte reply", body.len());
    serde_json::from_slice(&body).map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::Decode, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
