//! Web relay layer: Axum server exposing the original HTTP API.
//!
//! Proxies conversation creation, retrieval, and NDJSON response streaming
//! to the upstream conversational-analytics API, keeping the API key
//! server-side.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::WebError;
pub use server::{build_router, run_server, ServerConfig};
pub use state::RelayState;
