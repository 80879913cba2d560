use std::sync::Once;

use orchestrator_core::{
    recommendations_for, update, AgentResponse, AppState, Clock, Effect, MessageKind, Msg,
    RequestFailure, SCROLL_DELAY,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(orchestrator_logging::initialize_for_tests);
}

fn fixed_state() -> AppState {
    AppState::with_clock(Clock::new(|| "09:30:00".to_string()))
}

fn submit(state: AppState, task: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(task.to_string()));
    update(state, Msg::TaskSubmitted)
}

fn submitted_request(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::SubmitTask { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .expect("submit effect")
}

fn reply(result: &str) -> AgentResponse {
    AgentResponse {
        result: Some(result.to_string()),
        ..AgentResponse::default()
    }
}

fn kinds(state: &AppState) -> Vec<MessageKind> {
    state.view().conversation.iter().map(|m| m.kind).collect()
}

#[test]
fn starts_on_hr_recommendations() {
    let view = AppState::new().view();
    let keys: Vec<_> = view.domains.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys, vec!["hr", "finance", "procurement"]);
    assert_eq!(view.selected_domain, "hr");
    assert_eq!(view.recommended, recommendations_for("hr"));
    assert!(view.conversation.is_empty());
    assert!(!view.is_loading);
    assert!(!view.show_upload_area);
    assert_eq!(view.upload_progress, 0);
    assert!(view.extracted_data.is_none());
    assert!(!view.show_confirmation);
}

#[test]
fn session_start_checks_health() {
    let (_, effects) = update(AppState::new(), Msg::SessionStarted);
    assert_eq!(effects, vec![Effect::CheckHealth]);
}

#[test]
fn domain_change_replaces_recommendations() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::DomainSelected("finance".into()));
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.selected_domain, "finance");
    let questions: Vec<_> = view.recommended.iter().map(|q| q.question.as_str()).collect();
    assert_eq!(
        questions,
        vec![
            "Show me the latest invoice status",
            "How to claim expenses?",
            "I need to process an invoice",
        ]
    );

    let (state, _) = update(state, Msg::DomainSelected("legal".into()));
    assert!(state.view().recommended.is_empty());
}

#[test]
fn recommended_press_only_fills_input() {
    let (mut state, effects) = update(
        fixed_state(),
        Msg::RecommendedPressed("How to order new laptops?".into()),
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.task_input, "How to order new laptops?");
    assert!(view.conversation.is_empty());
    assert!(state.take_notices().is_empty());
}

#[test]
fn blank_submit_is_rejected_without_network() {
    init_logging();
    for blank in ["", "   ", "\n\t "] {
        let (mut state, effects) = submit(fixed_state(), blank);
        assert!(effects.is_empty(), "{blank:?}");
        assert!(state.view().conversation.is_empty());
        assert!(!state.view().is_loading);
        assert_eq!(state.take_notices(), vec!["Please enter a question".to_string()]);
    }
}

#[test]
fn submit_appends_user_message_and_posts_task() {
    init_logging();
    let state = fixed_state();
    let (state, _) = update(state, Msg::DomainSelected("procurement".into()));
    let (state, effects) = submit(state, "I want to place an order");

    assert_eq!(
        effects,
        vec![
            Effect::ScrollToBottom {
                delay: SCROLL_DELAY
            },
            Effect::SubmitTask {
                request_id: 1,
                domain: "procurement".to_string(),
                task: "I want to place an order".to_string(),
            },
        ]
    );
    let view = state.view();
    assert!(view.is_loading);
    assert_eq!(view.conversation.len(), 1);
    assert_eq!(view.conversation[0].kind, MessageKind::User);
    assert_eq!(view.conversation[0].content, "I want to place an order");
    assert_eq!(view.conversation[0].timestamp, "09:30:00");
}

#[test]
fn successful_reply_clears_loading_and_input() {
    let (state, effects) = submit(fixed_state(), "Tell me about leave policy in the company");
    let request_id = submitted_request(&effects);

    let (state, _) = update(
        state,
        Msg::TaskResponded {
            request_id,
            response: reply("Employees get 24 days."),
        },
    );
    let view = state.view();
    assert!(!view.is_loading);
    assert_eq!(view.task_input, "");
    assert_eq!(kinds(&state), vec![MessageKind::User, MessageKind::Agent]);
    assert_eq!(view.conversation[1].content, "Employees get 24 days.");
    assert!(!view.show_upload_area);
}

#[test]
fn empty_reply_uses_fallback_text() {
    let (state, effects) = submit(fixed_state(), "hello");
    let request_id = submitted_request(&effects);
    let (state, _) = update(
        state,
        Msg::TaskResponded {
            request_id,
            response: AgentResponse::default(),
        },
    );
    assert_eq!(state.view().conversation[1].content, "No response received");
}

#[test]
fn failed_submit_reports_status() {
    let (state, effects) = submit(fixed_state(), "hello");
    let request_id = submitted_request(&effects);
    let (state, _) = update(
        state,
        Msg::TaskFailed {
            request_id,
            failure: RequestFailure::Status {
                code: 502,
                text: "Bad Gateway".into(),
            },
        },
    );
    let view = state.view();
    assert!(!view.is_loading);
    assert_eq!(view.task_input, "hello");
    assert_eq!(view.conversation[1].kind, MessageKind::Error);
    assert_eq!(view.conversation[1].content, "Error: 502 Bad Gateway");
}

#[test]
fn transport_failure_reports_status_zero() {
    let (state, effects) = submit(fixed_state(), "hello");
    let request_id = submitted_request(&effects);
    let (state, _) = update(
        state,
        Msg::TaskFailed {
            request_id,
            failure: RequestFailure::Transport("connection refused".into()),
        },
    );
    assert_eq!(state.view().conversation[1].content, "Error: 0 connection refused");
}

#[test]
fn form_keywords_in_any_case_offer_download() {
    init_logging();
    for text in [
        "Please Download the leave FORM",
        "DOWNLOAD form here",
        "the form is ready to download",
    ] {
        let (state, effects) = submit(fixed_state(), "leave");
        let request_id = submitted_request(&effects);
        let (mut state, _) = update(
            state,
            Msg::TaskResponded {
                request_id,
                response: reply(text),
            },
        );
        let view = state.view();
        let forms = view
            .conversation
            .iter()
            .filter(|m| m.kind == MessageKind::FormDownload)
            .count();
        assert_eq!(forms, 1, "{text}");
        assert!(view.show_upload_area);
        let form = view.latest_form.expect("form offered");
        assert_eq!(form.download_url, "/download/leave_request_form");
        assert_eq!(form.form_name, "Leave Request Form");
        assert_eq!(form.instructions.len(), 4);
        assert!(state
            .take_notices()
            .contains(&"Form ready for download!".to_string()));
    }
}

#[test]
fn single_keyword_does_not_offer_download() {
    for text in ["You can download it later", "Fill in the form at HR"] {
        let (state, effects) = submit(fixed_state(), "leave");
        let request_id = submitted_request(&effects);
        let (state, _) = update(
            state,
            Msg::TaskResponded {
                request_id,
                response: reply(text),
            },
        );
        assert_eq!(kinds(&state), vec![MessageKind::User, MessageKind::Agent], "{text}");
        assert!(!state.view().show_upload_area);
    }
}

#[test]
fn source_document_is_cited() {
    let (state, effects) = submit(fixed_state(), "policy?");
    let request_id = submitted_request(&effects);
    let (state, _) = update(
        state,
        Msg::TaskResponded {
            request_id,
            response: AgentResponse {
                result: Some("24 days".into()),
                source_document: Some("leave_policy.pdf".into()),
                ..AgentResponse::default()
            },
        },
    );
    let view = state.view();
    assert_eq!(view.conversation[2].kind, MessageKind::Info);
    assert_eq!(view.conversation[2].content, "Source: leave_policy.pdf");
}

#[test]
fn newer_submit_cancels_and_supersedes_older() {
    init_logging();
    let (state, first) = submit(fixed_state(), "first");
    let first_id = submitted_request(&first);
    let (state, second) = submit(state, "second");
    let second_id = submitted_request(&second);
    assert!(second.contains(&Effect::CancelRequest {
        request_id: first_id
    }));

    // The superseded reply arrives late and is ignored.
    let (state, _) = update(
        state,
        Msg::TaskResponded {
            request_id: first_id,
            response: reply("stale"),
        },
    );
    assert!(state.view().is_loading);
    assert_eq!(kinds(&state), vec![MessageKind::User, MessageKind::User]);

    let (state, _) = update(
        state,
        Msg::TaskResponded {
            request_id: second_id,
            response: reply("fresh"),
        },
    );
    let view = state.view();
    assert!(!view.is_loading);
    assert_eq!(view.conversation.last().unwrap().content, "fresh");
}

#[test]
fn chat_scrolls_after_delay() {
    let (state, _) = submit(fixed_state(), "hello");
    assert_eq!(state.view().scroll_anchor, 0);
    let (mut state, effects) = update(state, Msg::ChatScrolled);
    assert!(effects.is_empty());
    assert_eq!(state.view().scroll_anchor, 1);
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, Msg::ChatScrolled);
    assert!(!state.consume_dirty());
}

#[test]
fn health_check_outcome_is_logged_in_chat() {
    let (state, _) = update(fixed_state(), Msg::HealthChecked(Ok(())));
    let (state, _) = update(state, Msg::HealthChecked(Err("timeout".into())));
    let view = state.view();
    assert_eq!(view.conversation[0].content, "Orchestrator is reachable");
    assert_eq!(view.conversation[1].kind, MessageKind::Error);
    assert_eq!(
        view.conversation[1].content,
        "Orchestrator health check failed: timeout"
    );
}

#[test]
fn download_request_emits_effect_and_notice() {
    let (mut state, effects) = update(
        fixed_state(),
        Msg::DownloadFormRequested("/download/leave_request_form".into()),
    );
    assert_eq!(
        effects,
        vec![Effect::DownloadForm {
            request_id: 1,
            url: "/download/leave_request_form".into(),
        }]
    );
    assert_eq!(state.take_notices(), vec!["Form download started".to_string()]);

    let (mut state, _) = update(
        state,
        Msg::FormDownloaded {
            request_id: 1,
            location: "downloads/leave_request_form".into(),
        },
    );
    assert_eq!(
        state.take_notices(),
        vec!["Form saved to downloads/leave_request_form".to_string()]
    );
}

#[test]
fn end_to_end_leave_request_offers_form() {
    init_logging();
    let (state, _) = update(fixed_state(), Msg::DomainSelected("hr".into()));
    let (state, effects) = submit(state, "I want to apply for leave");
    assert!(effects.contains(&Effect::SubmitTask {
        request_id: 1,
        domain: "hr".into(),
        task: "I want to apply for leave".into(),
    }));

    let (state, _) = update(
        state,
        Msg::TaskResponded {
            request_id: 1,
            response: reply("Please download the leave form"),
        },
    );
    assert_eq!(
        kinds(&state),
        vec![MessageKind::User, MessageKind::Agent, MessageKind::FormDownload]
    );
    assert!(state.view().show_upload_area);
}
