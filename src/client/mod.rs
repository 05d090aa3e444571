pub mod error;
pub mod http;
pub mod mock;
pub mod ndjson;
pub mod service;
pub mod types;

pub use error::ClientError;
pub use http::InconvoClient;
pub use ndjson::{event_stream, NdjsonDecoder};
pub use service::{ConversationService, CreateConversationParams, EventStream};
pub use types::{
    Chart, ChartData, ChartKind, Conversation, ConversationList, Dataset, InconvoResponse,
    ResponseKind, ResponsePayload, StreamEvent, Table,
};
