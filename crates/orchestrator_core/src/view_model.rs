use crate::catalog::{Domain, RecommendedQuestion};
use crate::extracted::{ConfirmationRow, ExtractedData};
use crate::message::{ChatMessage, FormDownload};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub domains: Vec<Domain>,
    pub selected_domain: String,
    pub recommended: Vec<RecommendedQuestion>,
    pub conversation: Vec<ChatMessage>,
    /// Number of conversation entries the chat has scrolled past.
    pub scroll_anchor: usize,
    pub task_input: String,
    pub is_loading: bool,
    pub show_upload_area: bool,
    pub upload_progress: u8,
    pub extracted_data: Option<ExtractedData>,
    pub show_confirmation: bool,
    pub confirmation_rows: Vec<ConfirmationRow>,
    pub is_submitting: bool,
    pub error_dialog: Option<String>,
    pub latest_form: Option<FormDownload>,
    pub dirty: bool,
}
