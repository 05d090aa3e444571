//! Conversation session manager.
//!
//! Owns conversation identity and tenant scoping for one chat session,
//! drives the streaming event loop, and applies decoded events to the
//! transcript. Single-writer: only this type mutates the transcript; UI
//! layers read snapshots.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::client::error::ClientError;
use crate::client::service::{ConversationService, CreateConversationParams, EventStream};
use crate::client::types::StreamEvent;
use crate::session::abort::AbortCoordinator;
use crate::session::transcript::{ChatMessage, Transcript};
use futures::StreamExt;

/// Visual state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No active submission.
    Idle,
    /// One submission in flight; the transcript holds its placeholder.
    Running,
    /// The last submission failed. Equivalent to Idle for new input.
    Error,
}

/// Result of a [`ChatSession::submit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// The stream finished (terminal event or clean end-of-stream).
    Completed,
    /// The request was deliberately cancelled; transcript left as-is.
    Cancelled,
    /// Creation or streaming failed; the placeholder carries the error text.
    Failed,
}

/// Result of a tenant scope change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeChange {
    /// Same scope by value; nothing happened.
    Unchanged,
    /// Scope updated and the session reset.
    Applied,
    /// The transcript has messages; the caller must confirm before the
    /// switch discards them, then call [`ChatSession::apply_tenant_scope`].
    ConfirmationRequired,
}

#[derive(Debug)]
struct SessionState {
    transcript: Transcript,
    status: SessionStatus,
    loading: bool,
    tenant_scope: Option<i64>,
    aborts: AbortCoordinator,
}

/// A chat session bound to at most one upstream conversation.
///
/// The conversation is created lazily on the first submission and its scope
/// is baked in upstream at creation time, which is why a scope change
/// always discards the conversation instead of resuming it.
///
/// At most one submission is meaningful at a time; callers are expected to
/// disable input while [`SessionStatus::Running`]. Concurrent submissions
/// are neither queued nor rejected here.
pub struct ChatSession {
    service: Arc<dyn ConversationService>,
    state: Mutex<SessionState>,
    /// Single-flight cell: held across the creation round trip so
    /// concurrent callers share one creation call and one id.
    conversation: tokio::sync::Mutex<Option<String>>,
}

impl ChatSession {
    pub fn new(service: Arc<dyn ConversationService>) -> Self {
        Self {
            service,
            state: Mutex::new(SessionState {
                transcript: Transcript::new(),
                status: SessionStatus::Idle,
                loading: false,
                tenant_scope: None,
                aborts: AbortCoordinator::new(),
            }),
            conversation: tokio::sync::Mutex::new(None),
        }
    }

    pub fn with_tenant_scope(self, scope: Option<i64>) -> Self {
        self.state.lock().tenant_scope = scope;
        self
    }

    /// Snapshot of the transcript.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().transcript.messages().to_vec()
    }

    pub fn has_messages(&self) -> bool {
        self.state.lock().transcript.has_messages()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    /// True while a conversation creation round trip is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn tenant_scope(&self) -> Option<i64> {
        self.state.lock().tenant_scope
    }

    pub async fn conversation_id(&self) -> Option<String> {
        self.conversation.lock().await.clone()
    }

    /// Return the existing conversation id or create one bound to the
    /// current tenant scope.
    ///
    /// Idempotent under concurrency: the cell's lock is held across the
    /// creation call, so later callers block until the first resolves and
    /// then observe its id.
    pub async fn ensure_conversation(&self) -> Result<String, ClientError> {
        let mut slot = self.conversation.lock().await;
        if let Some(id) = slot.as_deref() {
            return Ok(id.to_string());
        }

        let scope = self.state.lock().tenant_scope;
        self.state.lock().loading = true;
        let result = self
            .service
            .create_conversation(CreateConversationParams::scoped(scope))
            .await;
        self.state.lock().loading = false;

        let conversation = result?;
        *slot = Some(conversation.id.clone());
        Ok(conversation.id)
    }

    /// Submit a user message and drive its response stream to completion.
    ///
    /// Blank input is a no-op. The user message and assistant placeholder
    /// are appended together before any network activity, so a creation
    /// failure surfaces as an inline error rather than a vanished turn.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let trimmed = text.trim().to_string();
        let placeholder = {
            let mut state = self.state.lock();
            match state.transcript.begin_turn(&trimmed) {
                Some(id) => {
                    state.status = SessionStatus::Running;
                    id
                }
                None => return SubmitOutcome::Ignored,
            }
        };

        let conversation_id = match self.ensure_conversation().await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Unable to prepare conversation: {e}");
                return self.finish_failed(&placeholder);
            }
        };

        let token = self.state.lock().aborts.start_request();

        let stream = match self
            .service
            .open_response_stream(&conversation_id, &trimmed)
            .await
        {
            Ok(stream) => stream,
            Err(e) if e.is_cancellation() => return self.finish_cancelled(),
            Err(e) => {
                tracing::error!("Failed to open response stream: {e}");
                return self.finish_failed(&placeholder);
            }
        };

        self.drive_stream(stream, &placeholder, &token).await
    }

    async fn drive_stream(
        &self,
        mut stream: EventStream,
        placeholder: &str,
        token: &CancellationToken,
    ) -> SubmitOutcome {
        loop {
            let next = tokio::select! {
                _ = token.cancelled() => return self.finish_cancelled(),
                next = stream.next() => next,
            };

            match next {
                Some(Ok(StreamEvent::Progress { message })) => {
                    if let Some(message) = message {
                        self.state
                            .lock()
                            .transcript
                            .apply_progress(placeholder, &message);
                    }
                }
                Some(Ok(StreamEvent::Completed { response })) => {
                    // The upstream may continue the conversation under a
                    // new identifier; adopt it for subsequent requests.
                    if let Some(next_id) = response.conversation_id.clone() {
                        *self.conversation.lock().await = Some(next_id);
                    }
                    let mut state = self.state.lock();
                    state.transcript.apply_completed(placeholder, response);
                    state.status = SessionStatus::Idle;
                    state.aborts.clear();
                    return SubmitOutcome::Completed;
                }
                Some(Ok(StreamEvent::Error { message })) => {
                    tracing::error!(
                        "Upstream reported an error: {}",
                        message.as_deref().unwrap_or("unknown")
                    );
                    return self.finish_failed(placeholder);
                }
                Some(Ok(StreamEvent::Unknown)) => continue,
                Some(Err(e)) if e.is_cancellation() => return self.finish_cancelled(),
                Some(Err(e)) => {
                    tracing::error!("Streaming error: {e}");
                    return self.finish_failed(placeholder);
                }
                None => {
                    // Stream ended without a terminal event; the placeholder
                    // keeps its last progress text.
                    let mut state = self.state.lock();
                    state.status = SessionStatus::Idle;
                    state.aborts.clear();
                    return SubmitOutcome::Completed;
                }
            }
        }
    }

    fn finish_failed(&self, placeholder: &str) -> SubmitOutcome {
        let mut state = self.state.lock();
        state.transcript.fail_turn(placeholder);
        state.status = SessionStatus::Error;
        state.aborts.clear();
        SubmitOutcome::Failed
    }

    fn finish_cancelled(&self) -> SubmitOutcome {
        let mut state = self.state.lock();
        state.status = SessionStatus::Idle;
        state.aborts.clear();
        SubmitOutcome::Cancelled
    }

    /// Abort the in-flight request, if any. The transcript is left exactly
    /// as it was; cancellation is never surfaced as an error.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if !state.aborts.has_live_request() {
            return;
        }
        state.aborts.cancel();
        state.status = SessionStatus::Idle;
    }

    /// Tear the session back to its initial empty state: abort any live
    /// request, discard the conversation id, clear the transcript.
    pub async fn reset(&self) {
        {
            let mut state = self.state.lock();
            state.aborts.cancel();
            state.transcript.clear();
            state.status = SessionStatus::Idle;
            state.loading = false;
        }
        *self.conversation.lock().await = None;
    }

    /// Request a tenant scope change, compared by value.
    ///
    /// When the transcript already has messages the change is withheld and
    /// [`ScopeChange::ConfirmationRequired`] returned: the owning UI gates
    /// the destructive switch and calls [`Self::apply_tenant_scope`] once
    /// confirmed.
    pub async fn propose_tenant_scope(&self, scope: Option<i64>) -> ScopeChange {
        {
            let state = self.state.lock();
            if state.tenant_scope == scope {
                return ScopeChange::Unchanged;
            }
            if state.transcript.has_messages() {
                return ScopeChange::ConfirmationRequired;
            }
        }
        self.apply_tenant_scope(scope).await
    }

    /// Apply a tenant scope change unconditionally, resetting the session.
    /// Conversations are not resumable across scopes: the scope is baked in
    /// at creation time upstream.
    pub async fn apply_tenant_scope(&self, scope: Option<i64>) -> ScopeChange {
        {
            let mut state = self.state.lock();
            if state.tenant_scope == scope {
                return ScopeChange::Unchanged;
            }
            state.tenant_scope = scope;
        }
        self.reset().await;
        ScopeChange::Applied
    }
}
