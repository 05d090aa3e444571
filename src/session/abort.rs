use tokio_util::sync::CancellationToken;

/// Tracks the cancellation token of the one in-flight streaming request.
///
/// Starting a new request replaces the live slot without cancelling the
/// previous token; cancelling a superseded request is the caller's call.
/// Dropping the coordinator cancels whatever is still live so a torn-down
/// session never leaves orphaned network activity.
#[derive(Debug, Default)]
pub struct AbortCoordinator {
    live: Option<CancellationToken>,
}

impl AbortCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new in-flight request and return its token.
    pub fn start_request(&mut self) -> CancellationToken {
        let token = CancellationToken::new();
        self.live = Some(token.clone());
        token
    }

    /// Abort the live request, if any, and clear the slot.
    pub fn cancel(&mut self) {
        if let Some(token) = self.live.take() {
            token.cancel();
        }
    }

    /// Clear the slot without cancelling (the request finished on its own).
    pub fn clear(&mut self) {
        self.live = None;
    }

    pub fn has_live_request(&self) -> bool {
        self.live.is_some()
    }
}

impl Drop for AbortCoordinator {
    fn drop(&mut self) {
        self.cancel();
    }
}
