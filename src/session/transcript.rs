//! Chat transcript state machine.
//!
//! The transcript is append-only: entries are added in submission order and
//! only the in-flight assistant placeholder is ever mutated, identified by
//! its client-generated id until a terminal event swaps in the upstream id.

use serde::Serialize;
use uuid::Uuid;

use crate::client::types::InconvoResponse;

/// Sentinel content shown while a response is streaming.
pub const THINKING_MESSAGE: &str = "Thinking...";

/// Content shown when a submission fails.
pub const FAILURE_MESSAGE: &str = "Sorry, something went wrong while fetching the response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. User content is always a `text` response; the
/// assistant entry starts as the thinking placeholder and is overwritten in
/// place as the stream progresses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: InconvoResponse,
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Append a user message and its assistant placeholder atomically.
    ///
    /// Returns the placeholder id, or `None` (with no mutation) when the
    /// text is blank after trimming.
    pub fn begin_turn(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let placeholder_id = generate_id();
        self.messages.push(ChatMessage {
            id: generate_id(),
            role: Role::User,
            content: InconvoResponse::text(text),
        });
        self.messages.push(ChatMessage {
            id: placeholder_id.clone(),
            role: Role::Assistant,
            content: InconvoResponse::text(THINKING_MESSAGE),
        });
        Some(placeholder_id)
    }

    fn placeholder_mut(&mut self, placeholder_id: &str) -> Option<&mut ChatMessage> {
        self.messages
            .iter_mut()
            .find(|msg| msg.id == placeholder_id)
    }

    /// Overwrite the placeholder content with a partial status string.
    /// The message keeps its client-generated id.
    pub fn apply_progress(&mut self, placeholder_id: &str, status: &str) {
        if let Some(msg) = self.placeholder_mut(placeholder_id) {
            msg.content = InconvoResponse::text(status);
        }
    }

    /// Finalize the placeholder: adopt the upstream-assigned id when one is
    /// present (otherwise the placeholder id stands) and swap in the full
    /// payload. The message is not mutated again after this.
    pub fn apply_completed(&mut self, placeholder_id: &str, response: InconvoResponse) {
        if let Some(msg) = self.placeholder_mut(placeholder_id) {
            if let Some(id) = response.id.clone() {
                msg.id = id;
            }
            msg.content = response;
        }
    }

    /// Replace the placeholder with the generic failure message.
    pub fn fail_turn(&mut self, placeholder_id: &str) {
        if let Some(msg) = self.placeholder_mut(placeholder_id) {
            msg.content = InconvoResponse::text(FAILURE_MESSAGE);
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
