use std::sync::Arc;

use crate::client::service::ConversationService;

/// Shared state for relay handlers: the upstream conversation service.
#[derive(Clone)]
pub struct RelayState {
    service: Arc<dyn ConversationService>,
}

impl RelayState {
    pub fn new(service: Arc<dyn ConversationService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<dyn ConversationService> {
        &self.service
    }
}
