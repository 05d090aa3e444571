pub mod client;
pub mod config;
pub mod data;
pub mod session;
pub mod web;

pub use client::{
    ClientError, Conversation, ConversationService, CreateConversationParams, InconvoClient,
    InconvoResponse, StreamEvent,
};
pub use config::Config;
pub use data::{OrganisationOption, RowFetchClient, RowQuery};
pub use session::{ChatSession, SessionStatus, Transcript};
pub use web::{run_server, RelayState, ServerConfig};
