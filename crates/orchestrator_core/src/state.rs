use std::fmt;

use crate::catalog::{default_domains, recommendations_for, Domain, RecommendedQuestion, DEFAULT_DOMAIN};
use crate::extracted::ExtractedData;
use crate::message::{ChatMessage, Conversation, FormDownload, MessageKind};
use crate::view_model::AppViewModel;

pub type RequestId = u64;

/// Source of the wall-clock timestamps stamped on conversation entries.
#[derive(Clone, Copy)]
pub struct Clock(fn() -> String);

impl Clock {
    pub fn new(now: fn() -> String) -> Self {
        Self(now)
    }

    /// Local time as `HH:MM:SS`.
    pub fn system() -> Self {
        Self(|| chrono::Local::now().format("%H:%M:%S").to_string())
    }

    pub fn now(&self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Clock")
    }
}

// The clock is not observable state; two states never differ by their clock.
impl PartialEq for Clock {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Clock {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    domains: Vec<Domain>,
    selected_domain: String,
    recommended: Vec<RecommendedQuestion>,
    conversation: Conversation,
    scroll_anchor: usize,
    task_input: String,
    is_loading: bool,
    show_upload_area: bool,
    upload_progress: u8,
    extracted_data: Option<ExtractedData>,
    show_confirmation: bool,
    is_submitting: bool,
    error_dialog: Option<String>,
    notices: Vec<String>,
    pending_task: Option<RequestId>,
    pending_upload: Option<RequestId>,
    pending_submission: Option<RequestId>,
    next_request_id: RequestId,
    dirty: bool,
    clock: Clock,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_clock(Clock::system())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            domains: default_domains(),
            selected_domain: DEFAULT_DOMAIN.to_string(),
            recommended: recommendations_for(DEFAULT_DOMAIN),
            conversation: Conversation::default(),
            scroll_anchor: 0,
            task_input: String::new(),
            is_loading: false,
            show_upload_area: false,
            upload_progress: 0,
            extracted_data: None,
            show_confirmation: false,
            is_submitting: false,
            error_dialog: None,
            notices: Vec::new(),
            pending_task: None,
            pending_upload: None,
            pending_submission: None,
            next_request_id: 1,
            dirty: false,
            clock,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            domains: self.domains.clone(),
            selected_domain: self.selected_domain.clone(),
            recommended: self.recommended.clone(),
            conversation: self.conversation.entries().to_vec(),
            scroll_anchor: self.scroll_anchor,
            task_input: self.task_input.clone(),
            is_loading: self.is_loading,
            show_upload_area: self.show_upload_area,
            upload_progress: self.upload_progress,
            extracted_data: self.extracted_data.clone(),
            show_confirmation: self.show_confirmation,
            confirmation_rows: match (&self.extracted_data, self.show_confirmation) {
                (Some(data), true) => data.rows(),
                _ => Vec::new(),
            },
            is_submitting: self.is_submitting,
            error_dialog: self.error_dialog.clone(),
            latest_form: self.conversation.latest_form().cloned(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drains the transient notices queued since the last call.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn selected_domain(&self) -> &str {
        &self.selected_domain
    }

    pub(crate) fn select_domain(&mut self, key: String) {
        self.recommended = recommendations_for(&key);
        self.selected_domain = key;
        self.mark_dirty();
    }

    pub(crate) fn task_input(&self) -> &str {
        &self.task_input
    }

    pub(crate) fn set_task_input(&mut self, text: String) {
        if self.task_input != text {
            self.task_input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn append_message(&mut self, kind: MessageKind, content: impl Into<String>) {
        let timestamp = self.clock.now();
        self.conversation
            .push(ChatMessage::new(kind, content, timestamp));
        self.mark_dirty();
    }

    pub(crate) fn append_form_download(&mut self, content: &str, form: FormDownload) {
        let timestamp = self.clock.now();
        self.conversation
            .push(ChatMessage::form_download(content, form, timestamp));
        self.mark_dirty();
    }

    pub(crate) fn scroll_to_end(&mut self) {
        if self.scroll_anchor != self.conversation.len() {
            self.scroll_anchor = self.conversation.len();
            self.mark_dirty();
        }
    }

    pub(crate) fn notify(&mut self, text: impl Into<String>) {
        self.notices.push(text.into());
        self.mark_dirty();
    }

    pub(crate) fn show_error_dialog(&mut self, text: String) {
        self.error_dialog = Some(text);
        self.mark_dirty();
    }

    pub(crate) fn dismiss_error_dialog(&mut self) {
        if self.error_dialog.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
        self.mark_dirty();
    }

    pub(crate) fn show_upload_area(&mut self) {
        self.show_upload_area = true;
        self.mark_dirty();
    }

    pub(crate) fn set_upload_progress(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.upload_progress != percent {
            self.upload_progress = percent;
            self.mark_dirty();
        }
    }

    pub(crate) fn open_confirmation(&mut self, data: ExtractedData) {
        self.extracted_data = Some(data);
        self.show_confirmation = true;
        self.mark_dirty();
    }

    pub(crate) fn is_confirming(&self) -> bool {
        self.show_confirmation && self.extracted_data.is_some()
    }

    pub(crate) fn edit_extracted_field(&mut self, key: &str, value: String) -> bool {
        if !self.show_confirmation {
            return false;
        }
        let edited = self
            .extracted_data
            .as_mut()
            .is_some_and(|data| data.edit(key, value));
        if edited {
            self.mark_dirty();
        }
        edited
    }

    /// Closes the dialog, keeping the confirmed data.
    pub(crate) fn close_confirmation(&mut self) -> Option<ExtractedData> {
        self.show_confirmation = false;
        self.mark_dirty();
        self.extracted_data.clone()
    }

    /// Closes the dialog and forgets the data.
    pub(crate) fn discard_confirmation(&mut self) {
        self.show_confirmation = false;
        self.extracted_data = None;
        self.mark_dirty();
    }

    pub(crate) fn next_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Records `request_id` as the task in flight, returning the one it replaces.
    pub(crate) fn begin_task(&mut self, request_id: RequestId) -> Option<RequestId> {
        self.pending_task.replace(request_id)
    }

    /// Clears the pending task if `request_id` is the one in flight.
    pub(crate) fn finish_task(&mut self, request_id: RequestId) -> bool {
        if self.pending_task == Some(request_id) {
            self.pending_task = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn begin_upload(&mut self, request_id: RequestId) -> Option<RequestId> {
        self.pending_upload.replace(request_id)
    }

    pub(crate) fn is_current_upload(&self, request_id: RequestId) -> bool {
        self.pending_upload == Some(request_id)
    }

    pub(crate) fn finish_upload(&mut self, request_id: RequestId) -> bool {
        if self.pending_upload == Some(request_id) {
            self.pending_upload = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn begin_submission(&mut self, request_id: RequestId) {
        self.pending_submission = Some(request_id);
        self.is_submitting = true;
        self.mark_dirty();
    }

    pub(crate) fn finish_submission(&mut self, request_id: RequestId) {
        if self.pending_submission == Some(request_id) {
            self.pending_submission = None;
            self.is_submitting = false;
            self.mark_dirty();
        }
    }
}
