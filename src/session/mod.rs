//! Chat session layer
//!
//! Owns the transcript state machine, the cancellation coordinator, and
//! the conversation session manager that ties them to the upstream
//! streaming API.

pub mod abort;
pub mod manager;
pub mod transcript;

pub use abort::AbortCoordinator;
pub use manager::{ChatSession, ScopeChange, SessionStatus, SubmitOutcome};
pub use transcript::{ChatMessage, Role, Transcript, FAILURE_MESSAGE, THINKING_MESSAGE};
