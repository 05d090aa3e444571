use reqwest::StatusCode;

/// Error type for upstream API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Conversation could not be created (non-success response or a body
    /// without an identifier).
    #[error("conversation creation failed: {0}")]
    CreationFailed(String),

    /// Non-2xx status before streaming started.
    #[error("upstream returned status {0}")]
    Status(StatusCode),

    /// Transport-level failure (connect, read, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Event could not be serialized for relaying.
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    /// The request was deliberately cancelled. Always recovered silently.
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Distinguishes deliberate cancellation from genuine failures.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_distinguished() {
        assert!(ClientError::Cancelled.is_cancellation());
        assert!(!ClientError::CreationFailed("bad body".into()).is_cancellation());
        assert!(!ClientError::Status(StatusCode::BAD_GATEWAY).is_cancellation());
    }
}
