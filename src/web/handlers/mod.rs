//! HTTP handlers for the relay API.

pub mod conversations;
pub mod respond;

pub use conversations::{create_conversation, get_conversations};
pub use respond::respond;
