//! Streaming response relay handler.
//!
//! Re-emits the upstream NDJSON event stream as newline-delimited JSON,
//! ending the body after the terminal event.

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;

use crate::client::error::ClientError;
use crate::client::types::StreamEvent;
use crate::web::error::WebError;
use crate::web::state::RelayState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Serialize one event as an NDJSON frame.
fn encode_frame(event: &StreamEvent) -> Result<Bytes, ClientError> {
    let mut line = serde_json::to_vec(event)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// Relay a message to the upstream conversation and stream events back.
///
/// Both fields are required; the upstream event stream already terminates
/// after `response.completed` or `error`, so the relayed body does too.
pub async fn respond(
    State(state): State<RelayState>,
    body: Option<Json<RespondRequest>>,
) -> Result<Response, WebError> {
    let request = body.map(|Json(req)| req).unwrap_or_default();

    let conversation_id = request
        .conversation_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (Some(conversation_id), Some(message)) = (conversation_id, message) else {
        return Err(WebError::BadRequest(
            "conversationId and message are required".to_string(),
        ));
    };

    let events = state
        .service()
        .open_response_stream(conversation_id, message)
        .await?;

    // Unknown event kinds are not forwarded; clients only understand the
    // published event vocabulary.
    let frames = events.filter_map(|item| async move {
        match item {
            Ok(StreamEvent::Unknown) => None,
            Ok(event) => Some(encode_frame(&event)),
            Err(e) => {
                tracing::error!("Upstream stream error during relay: {e}");
                Some(Err(e))
            }
        }
    });

    let response = Response::builder()
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from_stream(frames))
        .map_err(|e| WebError::Internal(e.to_string()))?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_end_with_newline() {
        let frame = encode_frame(&StreamEvent::Progress {
            message: Some("Working".into()),
        })
        .unwrap();
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["type"], "response.progress");
    }

    #[test]
    fn respond_request_tolerates_missing_fields() {
        let request: RespondRequest = serde_json::from_str("{}").unwrap();
        assert!(request.conversation_id.is_none());
        assert!(request.message.is_none());
    }
}
