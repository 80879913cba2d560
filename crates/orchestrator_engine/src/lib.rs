//! Orchestrator engine: HTTP integrations and background request execution.
mod client;
mod engine;
mod filename;
mod persist;
mod types;
mod upload;

pub use client::{
    ChannelProgressSink, ClientSettings, OrchestratorApi, ProgressSink, ReqwestClient,
    HEALTH_PATH, SUBMIT_PATH, UPLOAD_PATH, WORKFLOW_PATH,
};
pub use engine::{EngineConfig, EngineHandle};
pub use filename::form_filename;
pub use persist::{FormStore, PersistError};
pub use types::{
    ClientError, DownloadedForm, EngineEvent, FailureKind, RequestId, SubmissionReply,
    WorkflowReply,
};
pub use upload::progress_percent;
