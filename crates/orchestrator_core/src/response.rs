use serde_json::Value;

use crate::message::FormDownload;

/// Reply of the workflow and upload endpoints, as handed to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentResponse {
    pub result: Option<String>,
    /// Raw `extracted_data`: a JSON object or a string holding one.
    pub extracted_data: Option<Value>,
    pub source_document: Option<String>,
}

pub(crate) const NO_RESPONSE: &str = "No response received";
pub(crate) const FORM_READY: &str = "📋 Leave Request Form is ready for download";

impl AgentResponse {
    pub fn result_text(&self) -> &str {
        self.result.as_deref().unwrap_or_default()
    }

    /// `extracted_data`, unless the backend sent null or an empty string.
    pub(crate) fn extracted_payload(&self) -> Option<&Value> {
        self.extracted_data
            .as_ref()
            .filter(|value| crate::extracted::is_truthy(value))
    }

    pub(crate) fn source(&self) -> Option<&str> {
        self.source_document.as_deref().filter(|doc| !doc.is_empty())
    }
}

/// The agents never flag form replies explicitly; a reply that talks about
/// both downloading and a form is treated as offering the leave form.
pub fn mentions_form_download(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("download") && lower.contains("form")
}

pub(crate) fn leave_request_form() -> FormDownload {
    FormDownload {
        download_url: "/download/leave_request_form".to_string(),
        form_name: "Leave Request Form".to_string(),
        instructions: vec![
            "1. Click the download button to get the form".to_string(),
            "2. Fill out all required fields".to_string(),
            "3. Save the completed form".to_string(),
            "4. Use the upload button to submit it".to_string(),
        ],
    }
}
