//! REST API route definitions for the relay.

use axum::{
    routing::{get, post},
    Router,
};

use crate::web::handlers::{create_conversation, get_conversations, respond};
use crate::web::state::RelayState;

/// Build the relay API routes.
///
/// Mounted under `/api` by the server:
/// - `POST /api/inconvo` relays a message and streams NDJSON events back
/// - `POST /api/inconvo/conversations` creates a conversation
/// - `GET /api/inconvo/conversations` retrieves or lists conversations
pub fn api_routes() -> Router<RelayState> {
    Router::new()
        .route("/inconvo", post(respond))
        .route(
            "/inconvo/conversations",
            post(create_conversation).get(get_conversations),
        )
}
