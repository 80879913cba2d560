use std::path::PathBuf;

use crate::{AgentResponse, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The client finished starting up.
    SessionStarted,
    /// User picked a domain.
    DomainSelected(String),
    /// User picked one of the recommended questions.
    RecommendedPressed(String),
    /// User edited the task input.
    InputChanged(String),
    /// User asked to send the current task input.
    TaskSubmitted,
    TaskResponded {
        request_id: RequestId,
        response: AgentResponse,
    },
    TaskFailed {
        request_id: RequestId,
        failure: RequestFailure,
    },
    /// User changed a field in the confirmation dialog.
    ConfirmationFieldEdited { key: String, value: String },
    ConfirmationSubmitted,
    ConfirmationCancelled,
    /// Downstream system answered the extracted-data submission.
    SubmissionResponded {
        request_id: RequestId,
        status_code: Option<i64>,
        detail: String,
    },
    SubmissionFailed {
        request_id: RequestId,
        reason: String,
    },
    /// User asked for a form; the url is relative to the agent base URL.
    DownloadFormRequested(String),
    FormDownloaded {
        request_id: RequestId,
        location: String,
    },
    FormDownloadFailed {
        request_id: RequestId,
        reason: String,
    },
    /// User picked a file to upload.
    FileChosen { file_name: String, path: PathBuf },
    UploadProgressed { request_id: RequestId, percent: u8 },
    UploadResponded {
        request_id: RequestId,
        response: AgentResponse,
    },
    UploadFailed {
        request_id: RequestId,
        failure: RequestFailure,
    },
    HealthChecked(Result<(), String>),
    /// The delayed scroll after an appended message fired.
    ChatScrolled,
    ErrorDialogDismissed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

/// Why a request produced no usable reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// The server answered with a non-success status.
    Status { code: u16, text: String },
    /// The request never completed.
    Transport(String),
}
