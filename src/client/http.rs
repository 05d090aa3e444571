//! HTTP client for the hosted Inconvo API.

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::client::error::ClientError;
use crate::client::ndjson::event_stream;
use crate::client::service::{ConversationService, CreateConversationParams, EventStream};
use crate::client::types::{Conversation, ConversationList};
use crate::config::Config;

/// Client for the hosted conversational-analytics API.
///
/// Constructed explicitly and injected wherever a
/// [`ConversationService`] is needed; there is no process-global instance.
#[derive(Debug, Clone)]
pub struct InconvoClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    agent_id: String,
}

impl InconvoClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        agent_id: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(base_url.into()),
            api_key: api_key.into(),
            agent_id: agent_id.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_base_url, &config.api_key, &config.agent_id)
    }

    /// Replace the underlying transport (connection pool reuse, test
    /// configuration).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    fn conversations_url(&self) -> String {
        format!("{}/agents/{}/conversations", self.base_url, self.agent_id)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.api_key)
    }
}

fn normalize_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[async_trait]
impl ConversationService for InconvoClient {
    async fn create_conversation(
        &self,
        params: CreateConversationParams,
    ) -> Result<Conversation, ClientError> {
        let user_identifier = params
            .user_identifier
            .unwrap_or_else(|| format!("demo_user_{}", Uuid::new_v4()));

        let mut body = json!({ "userIdentifier": user_identifier });
        if let Some(organisation_id) = params.organisation_id {
            body["userContext"] = json!({ "organisationId": organisation_id });
        }

        let response = self
            .authorized(self.http.post(self.conversations_url()))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::CreationFailed(format!(
                "upstream returned status {}",
                response.status()
            )));
        }

        let conversation: Conversation = response
            .json()
            .await
            .map_err(|e| ClientError::CreationFailed(format!("invalid response body: {e}")))?;

        if conversation.id.is_empty() {
            return Err(ClientError::CreationFailed(
                "response body missing conversation id".to_string(),
            ));
        }

        tracing::debug!(conversation_id = %conversation.id, "Created conversation");
        Ok(conversation)
    }

    async fn retrieve_conversation(&self, id: &str) -> Result<Conversation, ClientError> {
        let url = format!("{}/{}", self.conversations_url(), id);
        let response = self.authorized(self.http.get(url)).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    async fn list_conversations(
        &self,
        organisation_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Conversation>, ClientError> {
        let mut request = self
            .authorized(self.http.get(self.conversations_url()))
            .query(&[("limit", limit.to_string())]);
        if let Some(organisation_id) = organisation_id {
            request = request.query(&[("organisationId", organisation_id.to_string())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let list: ConversationList = response.json().await?;
        Ok(list.data)
    }

    async fn open_response_stream(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<EventStream, ClientError> {
        let url = format!("{}/conversations/{}/response", self.base_url, conversation_id);
        let response = self
            .authorized(self.http.post(url))
            .json(&json!({ "message": message, "stream": true }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        // Box the byte stream so the decoder can poll it unpinned.
        Ok(Box::pin(event_stream(Box::pin(response.bytes_stream()))))
    }
}
