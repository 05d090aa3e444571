use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::client::error::ClientError;
use crate::client::types::{Conversation, StreamEvent};

/// Boxed stream of decoded upstream events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ClientError>> + Send>>;

/// Parameters for creating a conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateConversationParams {
    /// Tenant scope. `None` means unscoped; the scope is baked into the
    /// conversation upstream at creation time.
    pub organisation_id: Option<i64>,
    /// Stable identifier for the end user. Defaults upstream-side handling
    /// is the caller's concern; see [`InconvoClient`](crate::client::InconvoClient).
    pub user_identifier: Option<String>,
}

impl CreateConversationParams {
    pub fn scoped(organisation_id: Option<i64>) -> Self {
        Self {
            organisation_id,
            user_identifier: None,
        }
    }
}

/// Seam between the session/relay layers and the hosted conversational
/// analytics API. Implemented by the real HTTP client and by
/// [`MockConversationService`](crate::client::mock::MockConversationService)
/// for tests.
#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Create a conversation bound to an optional tenant scope.
    async fn create_conversation(
        &self,
        params: CreateConversationParams,
    ) -> Result<Conversation, ClientError>;

    /// Fetch a single conversation by id.
    async fn retrieve_conversation(&self, id: &str) -> Result<Conversation, ClientError>;

    /// List conversations, optionally filtered by tenant scope.
    async fn list_conversations(
        &self,
        organisation_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Conversation>, ClientError>;

    /// Send a user message and open the streaming response.
    async fn open_response_stream(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<EventStream, ClientError>;
}
