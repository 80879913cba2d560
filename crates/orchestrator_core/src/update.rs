use orchestrator_logging::{orch_debug, orch_info, orch_warn};

use crate::extracted::ExtractedData;
use crate::message::MessageKind;
use crate::response::{leave_request_form, FORM_READY, NO_RESPONSE};
use crate::upload::{is_supported_upload, unsupported_notice};
use crate::{mentions_form_download, AgentResponse, AppState, Effect, Msg, RequestFailure, SCROLL_DELAY};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();
    match msg {
        Msg::SessionStarted => effects.push(Effect::CheckHealth),
        Msg::DomainSelected(key) => state.select_domain(key),
        Msg::RecommendedPressed(text) | Msg::InputChanged(text) => state.set_task_input(text),
        Msg::TaskSubmitted => submit_task(&mut state, &mut effects),
        Msg::TaskResponded {
            request_id,
            response,
        } => {
            if state.finish_task(request_id) {
                state.set_loading(false);
                handle_agent_response(&mut state, &mut effects, &response);
                state.set_task_input(String::new());
            } else {
                orch_debug!("Dropping stale workflow reply for request {}", request_id);
            }
        }
        Msg::TaskFailed {
            request_id,
            failure,
        } => {
            if state.finish_task(request_id) {
                state.set_loading(false);
                let text = match failure {
                    RequestFailure::Status { code, text } => format!("Error: {code} {text}"),
                    RequestFailure::Transport(reason) => format!("Error: 0 {reason}"),
                };
                append(&mut state, &mut effects, MessageKind::Error, text);
            } else {
                orch_debug!("Dropping stale workflow failure for request {}", request_id);
            }
        }
        Msg::ConfirmationFieldEdited { key, value } => {
            if !state.edit_extracted_field(&key, value) {
                orch_debug!("Ignoring edit of non-editable field {:?}", key);
            }
        }
        Msg::ConfirmationSubmitted => {
            if state.is_confirming() {
                if let Some(data) = state.close_confirmation() {
                    let request_id = state.next_request_id();
                    state.begin_submission(request_id);
                    effects.push(Effect::SubmitExtractedData {
                        request_id,
                        data: data.into_map(),
                    });
                }
            }
        }
        Msg::ConfirmationCancelled => {
            if state.is_confirming() {
                state.discard_confirmation();
            }
        }
        Msg::SubmissionResponded {
            request_id,
            status_code,
            detail,
        } => {
            state.finish_submission(request_id);
            if status_code == Some(200) {
                state.notify("Leave request submitted to HR_iflow!");
            } else {
                orch_warn!(
                    "Downstream rejected request {}: status {:?}",
                    request_id,
                    status_code
                );
                state.show_error_dialog(format!("SAP iFlow error: {detail}"));
            }
        }
        Msg::SubmissionFailed { request_id, reason } => {
            state.finish_submission(request_id);
            state.show_error_dialog(format!("Failed to send request to HR_iflow: {reason}"));
        }
        Msg::DownloadFormRequested(url) => {
            let request_id = state.next_request_id();
            effects.push(Effect::DownloadForm { request_id, url });
            state.notify("Form download started");
        }
        Msg::FormDownloaded { location, .. } => {
            state.notify(format!("Form saved to {location}"));
        }
        Msg::FormDownloadFailed { reason, .. } => {
            state.notify(format!("Form download failed: {reason}"));
        }
        Msg::FileChosen { file_name, path } => {
            if !is_supported_upload(&file_name) {
                state.notify(unsupported_notice());
                return (state, effects);
            }
            state.set_upload_progress(0);
            append(
                &mut state,
                &mut effects,
                MessageKind::Info,
                format!("📤 Uploading {file_name}..."),
            );
            let request_id = state.next_request_id();
            if let Some(previous) = state.begin_upload(request_id) {
                orch_info!("Upload {} supersedes upload {}", request_id, previous);
                effects.push(Effect::CancelRequest {
                    request_id: previous,
                });
            }
            effects.push(Effect::UploadFile {
                request_id,
                file_name,
                path,
            });
        }
        Msg::UploadProgressed {
            request_id,
            percent,
        } => {
            if state.is_current_upload(request_id) {
                state.set_upload_progress(percent);
            }
        }
        Msg::UploadResponded {
            request_id,
            response,
        } => {
            if state.finish_upload(request_id) {
                append(
                    &mut state,
                    &mut effects,
                    MessageKind::Success,
                    "✅ File uploaded successfully!",
                );
                handle_agent_response(&mut state, &mut effects, &response);
                state.set_upload_progress(0);
            } else {
                orch_debug!("Dropping stale upload reply for request {}", request_id);
            }
        }
        Msg::UploadFailed {
            request_id,
            failure,
        } => {
            if state.finish_upload(request_id) {
                let text = match failure {
                    RequestFailure::Status { text, .. } => format!("❌ Upload failed: {text}"),
                    RequestFailure::Transport(_) => "❌ Upload failed: Network error".to_string(),
                };
                append(&mut state, &mut effects, MessageKind::Error, text);
                state.set_upload_progress(0);
            } else {
                orch_debug!("Dropping stale upload failure for request {}", request_id);
            }
        }
        Msg::HealthChecked(outcome) => match outcome {
            Ok(()) => append(
                &mut state,
                &mut effects,
                MessageKind::Info,
                "Orchestrator is reachable",
            ),
            Err(reason) => append(
                &mut state,
                &mut effects,
                MessageKind::Error,
                format!("Orchestrator health check failed: {reason}"),
            ),
        },
        Msg::ChatScrolled => state.scroll_to_end(),
        Msg::ErrorDialogDismissed => state.dismiss_error_dialog(),
        Msg::Tick | Msg::NoOp => {}
    }

    (state, effects)
}

fn submit_task(state: &mut AppState, effects: &mut Vec<Effect>) {
    let task = state.task_input().to_string();
    if task.trim().is_empty() {
        state.notify("Please enter a question");
        return;
    }

    append(state, effects, MessageKind::User, task.clone());
    state.set_loading(true);

    let request_id = state.next_request_id();
    if let Some(previous) = state.begin_task(request_id) {
        orch_info!("Task {} supersedes task {}", request_id, previous);
        effects.push(Effect::CancelRequest {
            request_id: previous,
        });
    }
    effects.push(Effect::SubmitTask {
        request_id,
        domain: state.selected_domain().to_string(),
        task,
    });
}

fn handle_agent_response(state: &mut AppState, effects: &mut Vec<Effect>, response: &AgentResponse) {
    let result = response
        .result
        .as_deref()
        .filter(|text| !text.is_empty())
        .unwrap_or(NO_RESPONSE);
    append(state, effects, MessageKind::Agent, result);

    if mentions_form_download(response.result_text()) {
        state.append_form_download(FORM_READY, leave_request_form());
        request_scroll(effects);
        state.show_upload_area();
        state.notify("Form ready for download!");
    }

    if let Some(payload) = response.extracted_payload() {
        match ExtractedData::from_payload(payload) {
            Ok(data) => state.open_confirmation(data),
            Err(err) => {
                orch_warn!("Could not resolve extracted data: {}", err);
                state.notify("Error parsing extracted data");
            }
        }
    }

    if let Some(source) = response.source() {
        append(state, effects, MessageKind::Info, format!("Source: {source}"));
    }
}

fn append(
    state: &mut AppState,
    effects: &mut Vec<Effect>,
    kind: MessageKind,
    content: impl Into<String>,
) {
    state.append_message(kind, content);
    request_scroll(effects);
}

fn request_scroll(effects: &mut Vec<Effect>) {
    let scroll = Effect::ScrollToBottom {
        delay: SCROLL_DELAY,
    };
    if !effects.contains(&scroll) {
        effects.push(scroll);
    }
}
