use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

pub type RequestId = u64;

/// Body of `/workflow` and `/upload/leave_document` replies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowReply {
    pub result: Option<String>,
    /// Either a JSON object or a string holding one; resolved by the caller.
    pub extracted_data: Option<Value>,
    pub source_document: Option<String>,
}

/// Body of the downstream submission reply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionReply {
    pub sap_status_code: Option<i64>,
    pub sap_response: Option<Value>,
}

impl SubmissionReply {
    /// `sap_response` as compact JSON, `null` when absent.
    pub fn response_json(&self) -> String {
        self.sap_response
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_else(|| "null".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedForm {
    pub url: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    TaskCompleted {
        request_id: RequestId,
        result: Result<WorkflowReply, ClientError>,
    },
    SubmissionCompleted {
        request_id: RequestId,
        result: Result<SubmissionReply, ClientError>,
    },
    UploadProgress {
        request_id: RequestId,
        percent: u8,
    },
    UploadCompleted {
        request_id: RequestId,
        result: Result<WorkflowReply, ClientError>,
    },
    DownloadCompleted {
        request_id: RequestId,
        result: Result<PathBuf, ClientError>,
    },
    HealthChecked {
        result: Result<(), ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ClientError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
