use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One frame of the upstream NDJSON response stream.
///
/// The upstream emits any number of `response.progress` events followed by
/// exactly one terminal event (`response.completed` on success, `error` on
/// failure). Tags we don't recognize deserialize as [`StreamEvent::Unknown`]
/// and are skipped by every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    #[serde(rename = "response.progress")]
    Progress {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    #[serde(rename = "response.completed")]
    Completed { response: InconvoResponse },

    #[serde(rename = "error")]
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// True when no further events will follow for this response.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed { .. } | StreamEvent::Error { .. })
    }
}

/// Kind tag of a finalized response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Text,
    Chart,
    Table,
}

/// Finalized assistant response payload.
///
/// `id` and `conversationId` are optional because the same shape doubles as
/// transcript message content before the upstream has assigned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InconvoResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<Chart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
}

/// Structured view of a response, resolving the kind tag against the
/// payload that is actually present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponsePayload<'a> {
    Text(&'a str),
    Chart(&'a Chart),
    Table(&'a Table),
    /// The tag promised a chart or table but the payload is missing.
    /// Renderers should show an "unavailable" state, not crash.
    Unavailable(ResponseKind),
}

impl InconvoResponse {
    /// Plain-text response.
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            id: None,
            conversation_id: None,
            message: message.into(),
            kind: ResponseKind::Text,
            chart: None,
            table: None,
        }
    }

    pub fn payload(&self) -> ResponsePayload<'_> {
        match self.kind {
            ResponseKind::Text => ResponsePayload::Text(&self.message),
            ResponseKind::Chart => match &self.chart {
                Some(chart) => ResponsePayload::Chart(chart),
                None => ResponsePayload::Unavailable(ResponseKind::Chart),
            },
            ResponseKind::Table => match &self.table {
                Some(table) => ResponsePayload::Table(table),
                None => ResponsePayload::Unavailable(ResponseKind::Table),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "xLabel", skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, rename = "yLabel", skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
}

/// A conversation as returned by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Wrapper for conversation list responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationList {
    #[serde(default)]
    pub data: Vec<Conversation>,
}
