//! Tests for decoding transport frames.

use pretty_assertions::assert_eq;
use roci_stream::error::{ErrorCategory, ReducerError};
use roci_stream::protocol::{
    decode_frame, EventKind, MessageDelta, StatusUpdate, StepDeclared, StreamEvent, ToolCallRef,
};
use roci_stream::types::{ContentFragment, ImageUrl, StepKind, ToolCallFragment};

#[test]
fn decodes_step_declaration() {
    let event = decode_frame(
        r#"{"event":"on_run_step","data":{"id":"s1","runId":"r1","index":2,"stepDetails":{"type":"tool_calls","tool_calls":[{"id":"tc1","name":"search"}]}}}"#,
    )
    .unwrap();

    let StreamEvent::StepDeclared(step) = event else {
        panic!("expected step declaration, got {event:?}");
    };
    assert_eq!(
        step,
        StepDeclared::new("s1", "r1", 2).with_tool_calls(vec![ToolCallRef::new("tc1", "search")])
    );
    assert_eq!(step.kind(), StepKind::ToolCalls);
}

#[test]
fn step_without_details_is_message_creation() {
    let event = decode_frame(r#"{"event":"step_declared","data":{"id":"s1","run_id":"r1","index":0}}"#)
        .unwrap();

    assert_eq!(event, StreamEvent::StepDeclared(StepDeclared::new("s1", "r1", 0)));
}

#[test]
fn decodes_text_delta_with_fragment_list() {
    let event = decode_frame(
        r#"{"event":"on_message_delta","data":{"id":"s1","delta":{"content":[{"type":"text","text":"Hi"}]}}}"#,
    )
    .unwrap();

    assert_eq!(event, StreamEvent::TextDelta(MessageDelta::text("s1", "Hi")));
    assert_eq!(event.kind(), Some(EventKind::TextDelta));
}

#[test]
fn decodes_reasoning_delta_by_alias() {
    let event = decode_frame(
        r#"{"event":"reasoning_delta","data":{"stepRefId":"s1","delta":{"content":{"type":"think","think":"hm"}}}}"#,
    )
    .unwrap();

    assert_eq!(event, StreamEvent::ReasoningDelta(MessageDelta::think("s1", "hm")));
}

#[test]
fn fragment_kinds_decode_to_closed_variants() {
    let event = decode_frame(
        r#"{"event":"on_message_delta","data":{"id":"s1","delta":{"content":[
            {"type":"image_url","image_url":{"url":"https://img.example/a.png"}},
            {"kind":"reasoning","think":"aside"},
            {"type":"video","url":"https://v.example"}
        ]}}}"#,
    )
    .unwrap();

    let StreamEvent::TextDelta(delta) = event else {
        panic!("expected text delta");
    };
    assert_eq!(
        delta.delta.content,
        vec![
            ContentFragment::ImageUrl {
                image_url: ImageUrl {
                    url: "https://img.example/a.png".to_string(),
                    detail: None,
                },
            },
            ContentFragment::think("aside"),
            ContentFragment::Unknown {
                kind: "video".to_string(),
            },
        ]
    );
}

#[test]
fn decodes_step_delta_with_expiry() {
    let event = decode_frame(
        r#"{"event":"on_run_step_delta","data":{"id":"s2","delta":{"type":"tool_calls","tool_calls":[{"args":"{\"q\":"}],"auth":"https://auth.example","expiresAt":1700000000}}}"#,
    )
    .unwrap();

    let StreamEvent::StepDelta(delta) = event else {
        panic!("expected step delta");
    };
    assert_eq!(delta.id, "s2");
    assert_eq!(delta.delta.kind.as_deref(), Some("tool_calls"));
    assert_eq!(delta.delta.tool_calls, vec![ToolCallFragment::args("{\"q\":")]);
    assert_eq!(delta.delta.auth.as_deref(), Some("https://auth.example"));
    assert_eq!(delta.delta.expires_at, Some(1_700_000_000));
}

#[test]
fn completion_output_may_be_structured_json() {
    let event = decode_frame(
        r#"{"event":"on_run_step_completed","data":{"result":{"id":"s2","tool_call":{"id":"tc1","name":"calc","args":{"a":1},"output":{"n":42}}}}}"#,
    )
    .unwrap();

    let StreamEvent::StepCompleted(completed) = event else {
        panic!("expected completion");
    };
    assert_eq!(completed.result.id, "s2");
    assert_eq!(
        completed.result.tool_call,
        ToolCallFragment {
            id: Some("tc1".to_string()),
            name: Some("calc".to_string()),
            args: Some(r#"{"a":1}"#.to_string()),
            output: Some(r#"{"n":42}"#.to_string()),
            ..Default::default()
        }
    );
}

#[test]
fn decodes_status_update_shapes() {
    let flat = decode_frame(r#"{"event":"on_agent_update","data":{"runId":"r1","text":"Working"}}"#)
        .unwrap();
    let nested = decode_frame(
        r#"{"event":"on_agent_update","data":{"agent_update":{"runId":"r1","text":"Working"}}}"#,
    )
    .unwrap();

    let expected = StreamEvent::StatusUpdate(StatusUpdate::new("r1", "Working"));
    assert_eq!(flat, expected);
    assert_eq!(nested, expected);
}

#[test]
fn unknown_event_names_are_preserved() {
    let event = decode_frame(r#"{"event":"on_chain_end"}"#).unwrap();

    assert_eq!(
        event,
        StreamEvent::Unknown {
            event: "on_chain_end".to_string()
        }
    );
    assert_eq!(event.kind(), None);
}

#[test]
fn missing_required_field_is_malformed() {
    let cases = [
        r#"{"event":"on_run_step","data":{"id":"s1","runId":"r1"}}"#,
        r#"{"event":"on_run_step"}"#,
        r#"{"event":"on_agent_update","data":{"runId":"r1"}}"#,
        r#"{"event":"on_message_delta","data":{"id":"s1","delta":{"content":{"type":"text"}}}}"#,
    ];

    for raw in cases {
        let err = decode_frame(raw).unwrap_err();
        assert!(matches!(err, ReducerError::MalformedEvent(_)), "{raw}: {err}");
        assert_eq!(err.category(), ErrorCategory::MalformedEventShape);
    }
}

#[test]
fn invalid_json_is_a_serialization_error() {
    let err = decode_frame("{not-json").unwrap_err();

    assert!(matches!(err, ReducerError::Serialization(_)));
    assert!(err.is_recoverable());
}
