use std::path::PathBuf;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::RequestId;

/// Delay between appending a message and scrolling the chat to its end.
pub const SCROLL_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST `{domain, task}` to the workflow endpoint.
    SubmitTask {
        request_id: RequestId,
        domain: String,
        task: String,
    },
    /// Abort an in-flight request whose reply is no longer wanted.
    CancelRequest { request_id: RequestId },
    /// Forward confirmed extracted data downstream.
    SubmitExtractedData {
        request_id: RequestId,
        data: Map<String, Value>,
    },
    /// Fetch a form; `url` is relative to the agent base URL.
    DownloadForm { request_id: RequestId, url: String },
    UploadFile {
        request_id: RequestId,
        file_name: String,
        path: PathBuf,
    },
    CheckHealth,
    ScrollToBottom { delay: Duration },
}
