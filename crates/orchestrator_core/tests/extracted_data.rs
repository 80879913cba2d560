use orchestrator_core::{update, AgentResponse, AppState, Clock, Effect, Msg};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn state_with_reply(response: AgentResponse) -> AppState {
    let state = AppState::with_clock(Clock::new(|| "10:00:00".to_string()));
    let (state, _) = update(state, Msg::InputChanged("process my document".into()));
    let (state, _) = update(state, Msg::TaskSubmitted);
    let (state, _) = update(
        state,
        Msg::TaskResponded {
            request_id: 1,
            response,
        },
    );
    state
}

fn extracted(payload: Value) -> AgentResponse {
    AgentResponse {
        result: Some("I extracted these details".into()),
        extracted_data: Some(payload),
        source_document: None,
    }
}

#[test]
fn string_payload_opens_editable_dialog() {
    let state = state_with_reply(extracted(json!("{\"name\":\"Alice\"}")));
    let view = state.view();
    assert!(view.show_confirmation);
    assert_eq!(view.confirmation_rows.len(), 1);
    assert_eq!(view.confirmation_rows[0].key, "name");
    assert_eq!(view.confirmation_rows[0].label, "Name");
    assert_eq!(view.confirmation_rows[0].value, "Alice");
}

#[test]
fn edited_field_is_submitted() {
    let state = state_with_reply(extracted(json!("{\"name\":\"Alice\"}")));
    let (state, effects) = update(
        state,
        Msg::ConfirmationFieldEdited {
            key: "name".into(),
            value: "Bob".into(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().confirmation_rows[0].value, "Bob");

    let (state, effects) = update(state, Msg::ConfirmationSubmitted);
    let expected = json!({"name": "Bob"});
    assert_eq!(
        effects,
        vec![Effect::SubmitExtractedData {
            request_id: 2,
            data: expected.as_object().unwrap().clone(),
        }]
    );
    let view = state.view();
    assert!(!view.show_confirmation);
    assert!(view.is_submitting);
}

#[test]
fn object_payload_keeps_hidden_fields_in_submission() {
    let state = state_with_reply(extracted(json!({
        "employee_name": "Alice",
        "leave_type": "annual",
        "manager": null
    })));
    let labels: Vec<_> = state
        .view()
        .confirmation_rows
        .iter()
        .map(|row| row.label.clone())
        .collect();
    assert_eq!(labels, vec!["Employee Name", "Leave Type"]);

    let (_, effects) = update(state, Msg::ConfirmationSubmitted);
    match &effects[..] {
        [Effect::SubmitExtractedData { data, .. }] => {
            let keys: Vec<_> = data.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["employee_name", "leave_type", "manager"]);
            assert_eq!(data["manager"], Value::Null);
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn cancel_discards_without_effect() {
    let state = state_with_reply(extracted(json!({"name": "Alice"})));
    let (state, effects) = update(state, Msg::ConfirmationCancelled);
    assert!(effects.is_empty());
    let view = state.view();
    assert!(!view.show_confirmation);
    assert!(view.extracted_data.is_none());

    // Nothing left to submit.
    let (_, effects) = update(state, Msg::ConfirmationSubmitted);
    assert!(effects.is_empty());
}

#[test]
fn malformed_payload_shows_notice_and_keeps_going() {
    let mut state = state_with_reply(extracted(json!("{name: Alice")));
    let view = state.view();
    assert!(!view.show_confirmation);
    assert!(view.extracted_data.is_none());
    assert_eq!(view.conversation.len(), 2);
    assert_eq!(
        state.take_notices(),
        vec!["Error parsing extracted data".to_string()]
    );
}

#[test]
fn empty_string_payload_is_ignored() {
    let mut state = state_with_reply(extracted(json!("")));
    assert!(!state.view().show_confirmation);
    assert!(state.take_notices().is_empty());
}

#[test]
fn downstream_acceptance_shows_notice() {
    let state = state_with_reply(extracted(json!({"name": "Alice"})));
    let (state, _) = update(state, Msg::ConfirmationSubmitted);
    let (mut state, _) = update(
        state,
        Msg::SubmissionResponded {
            request_id: 2,
            status_code: Some(200),
            detail: "null".into(),
        },
    );
    let view = state.view();
    assert!(!view.is_submitting);
    assert!(view.error_dialog.is_none());
    assert_eq!(
        state.take_notices(),
        vec!["Leave request submitted to HR_iflow!".to_string()]
    );
}

#[test]
fn downstream_rejection_opens_error_dialog() {
    let state = state_with_reply(extracted(json!({"name": "Alice"})));
    let (state, _) = update(state, Msg::ConfirmationSubmitted);
    let (state, _) = update(
        state,
        Msg::SubmissionResponded {
            request_id: 2,
            status_code: Some(500),
            detail: "{\"error\":\"iflow down\"}".into(),
        },
    );
    assert_eq!(
        state.view().error_dialog.as_deref(),
        Some("SAP iFlow error: {\"error\":\"iflow down\"}")
    );

    let (state, _) = update(state, Msg::ErrorDialogDismissed);
    assert!(state.view().error_dialog.is_none());
}

#[test]
fn transport_failure_opens_error_dialog() {
    let state = state_with_reply(extracted(json!({"name": "Alice"})));
    let (state, _) = update(state, Msg::ConfirmationSubmitted);
    let (state, _) = update(
        state,
        Msg::SubmissionFailed {
            request_id: 2,
            reason: "connection reset".into(),
        },
    );
    let view = state.view();
    assert!(!view.is_submitting);
    assert_eq!(
        view.error_dialog.as_deref(),
        Some("Failed to send request to HR_iflow: connection reset")
    );
}
