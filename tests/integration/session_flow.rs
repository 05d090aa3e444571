//! Integration tests for the chat session flow
//!
//! Tests the flow: MockConversationService -> stream events -> transcript
//! state verification, exercised through the public crate API only.

use std::sync::Arc;
use std::time::Duration;

use inconvo_relay::client::mock::{MockConversationService, MockEventBuilder, MockScript};
use inconvo_relay::client::types::{InconvoResponse, ResponsePayload, StreamEvent};
use inconvo_relay::session::{
    ChatSession, Role, ScopeChange, SessionStatus, SubmitOutcome, FAILURE_MESSAGE,
    THINKING_MESSAGE,
};

fn session_with(script: MockScript) -> (Arc<ChatSession>, Arc<MockConversationService>) {
    let service = Arc::new(MockConversationService::new().with_script(script));
    let session = Arc::new(ChatSession::new(service.clone()));
    (session, service)
}

/// A full question-and-answer turn, from placeholder to final response.
#[tokio::test]
async fn test_full_turn_updates_transcript() {
    let events = MockEventBuilder::new()
        .progress("Querying the orders table...")
        .progress("Aggregating by week...")
        .completed_text("resp-001", "You had 128 orders last week.")
        .build();
    let (session, service) = session_with(
        MockScript::default()
            .with_conversation_id("conv-001")
            .with_events(events),
    );

    let outcome = session.submit("How many orders last week?").await;

    assert_eq!(outcome, SubmitOutcome::Completed);
    assert_eq!(session.status(), SessionStatus::Idle);
    assert_eq!(session.conversation_id().await.as_deref(), Some("conv-001"));

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content.message, "How many orders last week?");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].id, "resp-001");
    assert_eq!(messages[1].content.message, "You had 128 orders last week.");

    assert_eq!(service.create_calls(), 1);
    assert_eq!(
        service.captured_messages(),
        vec![("conv-001".to_string(), "How many orders last week?".to_string())]
    );
}

/// Multiple turns share one upstream conversation.
#[tokio::test]
async fn test_turns_share_one_conversation() {
    let events = MockEventBuilder::new()
        .completed_text("r", "answered")
        .build();
    let (session, service) = session_with(MockScript::default().with_events(events));

    session.submit("first question").await;
    session.submit("second question").await;
    session.submit("third question").await;

    assert_eq!(service.create_calls(), 1);
    assert_eq!(session.messages().len(), 6);

    let ids: Vec<String> = service
        .captured_messages()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert!(ids.iter().all(|id| id == &ids[0]));
}

/// A chart response survives the round trip into the transcript.
#[tokio::test]
async fn test_chart_response_reaches_transcript() {
    let response: InconvoResponse = serde_json::from_value(serde_json::json!({
        "id": "resp-chart",
        "message": "Revenue by month",
        "type": "chart",
        "chart": {
            "type": "line",
            "title": "Monthly revenue",
            "data": {
                "labels": ["Jan", "Feb", "Mar"],
                "datasets": [{"name": "Revenue", "values": [10.0, 12.5, 9.75]}]
            }
        }
    }))
    .unwrap();
    let events = MockEventBuilder::new()
        .progress("Drawing the chart...")
        .completed(response)
        .build();
    let (session, _service) = session_with(MockScript::default().with_events(events));

    session.submit("Show revenue by month").await;

    let messages = session.messages();
    match messages[1].content.payload() {
        ResponsePayload::Chart(chart) => {
            assert_eq!(chart.data.labels.len(), 3);
            assert_eq!(chart.data.datasets[0].values[1], 12.5);
        }
        other => panic!("Expected chart payload, got {:?}", other),
    }
}

/// A failed creation shows an inline error instead of losing the turn.
#[tokio::test]
async fn test_creation_failure_is_visible_inline() {
    let (session, _service) = session_with(MockScript::default().failing_create());

    let outcome = session.submit("anything").await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(session.status(), SessionStatus::Error);

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content.message, "anything");
    assert_eq!(messages[1].content.message, FAILURE_MESSAGE);

    // The session recovers on the next submit.
    assert_eq!(session.conversation_id().await, None);
}

/// A mid-stream transport error marks the placeholder as failed.
#[tokio::test]
async fn test_stream_error_fails_the_turn() {
    use inconvo_relay::client::mock::MockStreamError;

    let events = MockEventBuilder::new().progress("working...").build();
    let (session, _service) = session_with(
        MockScript::default()
            .with_events(events)
            .with_stream_error(MockStreamError::Transport),
    );

    let outcome = session.submit("hello").await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(session.status(), SessionStatus::Error);
    assert_eq!(session.messages()[1].content.message, FAILURE_MESSAGE);
}

/// Cancellation stops the stream without disturbing the transcript.
#[tokio::test]
async fn test_cancel_preserves_transcript() {
    let (session, _service) = session_with(MockScript::default().hanging_stream());

    let handle = {
        let session = session.clone();
        tokio::spawn(async move { session.submit("long running question").await })
    };

    // Give the submission time to open the stream.
    tokio::time::sleep(Duration::from_millis(20)).await;
    session.cancel();

    let outcome = handle.await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Cancelled);
    assert_eq!(session.status(), SessionStatus::Idle);

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content.message, THINKING_MESSAGE);
}

/// Scope changes with history are gated behind confirmation; confirming
/// discards the transcript and the conversation.
#[tokio::test]
async fn test_scope_switch_requires_confirmation_then_resets() {
    let events = MockEventBuilder::new().completed_text("r", "ok").build();
    let service = Arc::new(
        MockConversationService::new().with_script(MockScript::default().with_events(events)),
    );
    let session = ChatSession::new(service.clone()).with_tenant_scope(Some(1));

    session.submit("scoped question").await;
    assert_eq!(service.captured_creates()[0].organisation_id, Some(1));

    assert_eq!(
        session.propose_tenant_scope(Some(2)).await,
        ScopeChange::ConfirmationRequired
    );
    assert!(session.has_messages());

    assert_eq!(
        session.apply_tenant_scope(Some(2)).await,
        ScopeChange::Applied
    );
    assert!(!session.has_messages());

    session.submit("fresh question").await;
    assert_eq!(service.create_calls(), 2);
    assert_eq!(service.captured_creates()[1].organisation_id, Some(2));
}

/// Unknown event kinds in the stream are skipped without breaking the turn.
#[tokio::test]
async fn test_unknown_events_are_skipped() {
    let events = vec![
        StreamEvent::Unknown,
        StreamEvent::Progress {
            message: Some("still working".to_string()),
        },
        StreamEvent::Unknown,
        StreamEvent::Completed {
            response: InconvoResponse::text("done"),
        },
    ];
    let (session, _service) = session_with(MockScript::default().with_events(events));

    let outcome = session.submit("hello").await;

    assert_eq!(outcome, SubmitOutcome::Completed);
    assert_eq!(session.messages()[1].content.message, "done");
}
