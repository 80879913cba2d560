use orchestrator_core::{AppViewModel, ChatMessage, ConfirmationRow, MessageKind, ALLOWED_EXTENSIONS};
use owo_colors::{OwoColorize, Stream};

/// Turns successive view-models into the lines to append to the terminal.
///
/// The terminal is append-only, so the renderer remembers what it already
/// printed and only emits what changed.
#[derive(Debug, Default)]
pub struct Renderer {
    color: bool,
    printed: usize,
    shown_domain: Option<String>,
    shown_rows: Option<Vec<ConfirmationRow>>,
    shown_error: Option<String>,
    upload_hint_shown: bool,
    last_status: Option<String>,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn render(&mut self, view: &AppViewModel, notices: &[String]) -> Vec<String> {
        let mut lines = Vec::new();

        if self.shown_domain.as_deref() != Some(view.selected_domain.as_str()) {
            lines.extend(recommendations(view));
            self.shown_domain = Some(view.selected_domain.clone());
        }

        let visible = view.scroll_anchor.min(view.conversation.len());
        for message in view.conversation.iter().take(visible).skip(self.printed) {
            lines.extend(self.format_message(message));
        }
        self.printed = self.printed.max(visible);

        lines.extend(notices.iter().map(|notice| format!("» {notice}")));

        if view.show_upload_area && !self.upload_hint_shown {
            lines.push(format!(
                "Upload area: :upload <path> (accepted: {})",
                ALLOWED_EXTENSIONS.join(", ")
            ));
            self.upload_hint_shown = true;
        }

        if view.show_confirmation {
            if self.shown_rows.as_ref() != Some(&view.confirmation_rows) {
                lines.extend(confirmation_dialog(&view.confirmation_rows));
                self.shown_rows = Some(view.confirmation_rows.clone());
            }
        } else {
            self.shown_rows = None;
        }

        if view.error_dialog != self.shown_error {
            if let Some(text) = &view.error_dialog {
                lines.push("┌ Error".to_string());
                lines.push(format!("│ {text}"));
                lines.push("└ :dismiss to close".to_string());
            }
            self.shown_error = view.error_dialog.clone();
        }

        let status = status_line(view);
        if self.last_status.as_ref() != Some(&status) {
            lines.push(status.clone());
            self.last_status = Some(status);
        }

        lines
    }

    fn format_message(&self, message: &ChatMessage) -> Vec<String> {
        let head = match speaker(message.kind) {
            Some(speaker) => format!(
                "[{}] {} {}: {}",
                message.timestamp,
                message.kind.icon(),
                speaker,
                message.content
            ),
            None => format!(
                "[{}] {} {}",
                message.timestamp,
                message.kind.icon(),
                message.content
            ),
        };
        let mut lines = vec![self.paint(message.kind, head)];
        if let Some(form) = &message.form {
            lines.push(format!("    {} ({})", form.form_name, form.download_url));
            lines.extend(form.instructions.iter().map(|step| format!("    {step}")));
            lines.push("    :download to fetch the form".to_string());
        }
        lines
    }

    /// Colors only when enabled in the config and stdout is a color terminal.
    fn paint(&self, kind: MessageKind, text: String) -> String {
        if !self.color {
            return text;
        }
        text.if_supports_color(Stream::Stdout, |text| styled(kind, text))
            .to_string()
    }
}

pub fn domain_list(view: &AppViewModel) -> Vec<String> {
    view.domains
        .iter()
        .map(|domain| {
            let marker = if domain.key == view.selected_domain { "*" } else { " " };
            format!("{marker} {} ({})", domain.key, domain.text)
        })
        .collect()
}

fn recommendations(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![format!(
        "Recommended questions for {}:",
        domain_label(view)
    )];
    if view.recommended.is_empty() {
        lines.push("  (none)".to_string());
    }
    lines.extend(
        view.recommended
            .iter()
            .enumerate()
            .map(|(index, item)| format!("  {}. {}", index + 1, item.question)),
    );
    lines
}

fn confirmation_dialog(rows: &[ConfirmationRow]) -> Vec<String> {
    let mut lines = vec![
        "┌ Confirm Extracted Information".to_string(),
        "│ Please review and confirm the extracted information:".to_string(),
    ];
    lines.extend(
        rows.iter()
            .map(|row| format!("│   {}: {}  [{}]", row.label, row.value, row.key)),
    );
    lines.push("└ :edit <key> <value>, then :submit or :cancel".to_string());
    lines
}

fn status_line(view: &AppViewModel) -> String {
    let activity = if view.is_loading {
        "waiting for agent…"
    } else if view.is_submitting {
        "submitting…"
    } else {
        "ready"
    };
    let mut status = format!("[{} | {}", domain_label(view), activity);
    if view.upload_progress > 0 {
        status.push_str(&format!(" | upload {}%", view.upload_progress));
    }
    status.push(']');
    status
}

fn domain_label(view: &AppViewModel) -> &str {
    view.domains
        .iter()
        .find(|domain| domain.key == view.selected_domain)
        .map(|domain| domain.text.as_str())
        .unwrap_or(view.selected_domain.as_str())
}

fn styled(kind: MessageKind, text: &str) -> String {
    match kind {
        MessageKind::User => text.bold().to_string(),
        MessageKind::Agent => text.to_string(),
        MessageKind::Error => text.red().to_string(),
        MessageKind::Success => text.green().to_string(),
        MessageKind::Info => text.cyan().to_string(),
        MessageKind::FormDownload => text.yellow().to_string(),
    }
}

/// Error entries already read as errors, so they carry no speaker label.
fn speaker(kind: MessageKind) -> Option<&'static str> {
    match kind {
        MessageKind::User => Some("You"),
        MessageKind::Agent => Some("Agent"),
        MessageKind::Error => None,
        MessageKind::Success => Some("Done"),
        MessageKind::Info => Some("Info"),
        MessageKind::FormDownload => Some("Form"),
    }
}
