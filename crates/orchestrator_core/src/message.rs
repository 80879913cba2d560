#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    User,
    Agent,
    Error,
    Success,
    Info,
    FormDownload,
}

impl MessageKind {
    /// Style class used by renderers to pick colors and framing.
    pub fn style_class(self) -> &'static str {
        match self {
            MessageKind::User => "userMessage",
            MessageKind::Agent => "agentMessage",
            MessageKind::Error => "errorMessage",
            MessageKind::Success => "successMessage",
            MessageKind::Info => "infoMessage",
            MessageKind::FormDownload => "formDownloadMessage",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            MessageKind::User => "🧑",
            MessageKind::Agent => "🤖",
            MessageKind::Error => "⛔",
            MessageKind::Success => "✔",
            MessageKind::Info => "ℹ",
            MessageKind::FormDownload => "⬇",
        }
    }
}

/// Extra payload carried by a `form_download` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDownload {
    pub download_url: String,
    pub form_name: String,
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: String,
    pub form: Option<FormDownload>,
}

impl ChatMessage {
    pub fn new(kind: MessageKind, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            timestamp: timestamp.into(),
            form: None,
        }
    }

    pub fn form_download(
        content: impl Into<String>,
        form: FormDownload,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            kind: MessageKind::FormDownload,
            content: content.into(),
            timestamp: timestamp.into(),
            form: Some(form),
        }
    }
}

/// Append-only conversation log. Entries are never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversation {
    entries: Vec<ChatMessage>,
}

impl Conversation {
    pub fn push(&mut self, message: ChatMessage) {
        self.entries.push(message);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    /// Most recent form offered for download, if any.
    pub fn latest_form(&self) -> Option<&FormDownload> {
        self.entries.iter().rev().find_map(|entry| entry.form.as_ref())
    }
}
