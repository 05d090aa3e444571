//! Mock conversation service for deterministic testing
//!
//! Implements the `ConversationService` trait to emit pre-configured
//! stream events without touching the network. Use this for session and
//! relay tests that need to verify chat flows.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;

use crate::client::error::ClientError;
use crate::client::service::{ConversationService, CreateConversationParams, EventStream};
use crate::client::types::{Conversation, InconvoResponse, StreamEvent};

/// Scripted behavior for [`MockConversationService`].
#[derive(Clone, Default)]
pub struct MockScript {
    /// Conversation id returned by creation (default "conv-mock-1").
    pub conversation_id: Option<String>,
    /// Events emitted by every opened response stream.
    pub events: Vec<StreamEvent>,
    /// Error yielded after the scripted events, simulating a mid-stream
    /// transport failure.
    pub stream_error: Option<MockStreamError>,
    /// Artificial delay before creation resolves (single-flight tests).
    pub create_delay: Duration,
    /// Whether creation should fail.
    pub fail_create: bool,
    /// Whether the stream should never produce anything (cancellation
    /// tests select against this).
    pub hang_stream: bool,
}

/// Error kinds the mock can inject mid-stream.
#[derive(Clone, Copy, Debug)]
pub enum MockStreamError {
    Cancelled,
    Transport,
}

impl MockStreamError {
    fn into_client_error(self) -> ClientError {
        match self {
            MockStreamError::Cancelled => ClientError::Cancelled,
            MockStreamError::Transport => {
                ClientError::Status(reqwest::StatusCode::BAD_GATEWAY)
            }
        }
    }
}

impl MockScript {
    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_events(mut self, events: Vec<StreamEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    pub fn with_stream_error(mut self, error: MockStreamError) -> Self {
        self.stream_error = Some(error);
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn hanging_stream(mut self) -> Self {
        self.hang_stream = true;
        self
    }
}

/// Builder for event sequences used in tests.
pub struct MockEventBuilder {
    events: Vec<StreamEvent>,
}

impl MockEventBuilder {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn progress(mut self, message: &str) -> Self {
        self.events.push(StreamEvent::Progress {
            message: Some(message.to_string()),
        });
        self
    }

    pub fn completed(mut self, response: InconvoResponse) -> Self {
        self.events.push(StreamEvent::Completed { response });
        self
    }

    pub fn completed_text(self, id: &str, message: &str) -> Self {
        self.completed(InconvoResponse {
            id: Some(id.to_string()),
            ..InconvoResponse::text(message)
        })
    }

    pub fn error(mut self, message: &str) -> Self {
        self.events.push(StreamEvent::Error {
            message: Some(message.to_string()),
        });
        self
    }

    pub fn build(self) -> Vec<StreamEvent> {
        self.events
    }
}

impl Default for MockEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock conversation service for testing.
///
/// Captures every interaction for later verification and replays the
/// scripted event sequence on each opened stream.
pub struct MockConversationService {
    script: MockScript,
    /// Captured creation params for assertions
    captured_creates: Arc<Mutex<Vec<CreateConversationParams>>>,
    /// Captured (conversation_id, message) pairs from opened streams
    captured_messages: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockConversationService {
    pub fn new() -> Self {
        Self {
            script: MockScript::default(),
            captured_creates: Arc::new(Mutex::new(Vec::new())),
            captured_messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_script(mut self, script: MockScript) -> Self {
        self.script = script;
        self
    }

    pub fn captured_creates(&self) -> Vec<CreateConversationParams> {
        self.captured_creates.lock().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.captured_creates.lock().len()
    }

    pub fn captured_messages(&self) -> Vec<(String, String)> {
        self.captured_messages.lock().clone()
    }

    fn conversation(&self) -> Conversation {
        Conversation {
            id: self
                .script
                .conversation_id
                .clone()
                .unwrap_or_else(|| "conv-mock-1".to_string()),
            user_identifier: Some("demo_user_mock".to_string()),
            created_at: None,
        }
    }
}

impl Default for MockConversationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationService for MockConversationService {
    async fn create_conversation(
        &self,
        params: CreateConversationParams,
    ) -> Result<Conversation, ClientError> {
        if self.script.create_delay > Duration::ZERO {
            tokio::time::sleep(self.script.create_delay).await;
        }

        self.captured_creates.lock().push(params);

        if self.script.fail_create {
            return Err(ClientError::CreationFailed("mock failure".to_string()));
        }

        Ok(self.conversation())
    }

    async fn retrieve_conversation(&self, id: &str) -> Result<Conversation, ClientError> {
        let mut conversation = self.conversation();
        conversation.id = id.to_string();
        Ok(conversation)
    }

    async fn list_conversations(
        &self,
        _organisation_id: Option<i64>,
        _limit: usize,
    ) -> Result<Vec<Conversation>, ClientError> {
        Ok(vec![self.conversation()])
    }

    async fn open_response_stream(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<EventStream, ClientError> {
        self.captured_messages
            .lock()
            .push((conversation_id.to_string(), message.to_string()));

        if self.script.hang_stream {
            return Ok(Box::pin(stream::pending()));
        }

        let mut items: Vec<Result<StreamEvent, ClientError>> =
            self.script.events.iter().cloned().map(Ok).collect();
        if let Some(error) = self.script.stream_error {
            items.push(Err(error.into_client_error()));
        }

        Ok(Box::pin(stream::iter(items)))
    }
}
