use std::sync::Arc;

use flighthours_core::id_codec::IdCodec;
use flighthours_core::messages::MessageCatalog;
use flighthours_core::tx::TransactionManager;

use crate::config::ServerConfig;
use crate::services::Services;

/// Shared application state available to all handlers via Axum's `State` extractor.
///
/// Cloned per request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Public identifier codec.
    pub codec: Arc<IdCodec>,
    /// Process-wide message cache used to render every envelope.
    pub messages: Arc<MessageCatalog>,
    pub services: Arc<Services>,
    /// Used by the health check to ping the store.
    pub tx: Arc<dyn TransactionManager>,
}

impl AppState {
    /// Canonical URL of a resource, with the id in its public form.
    pub fn resource_url(&self, collection: &str, id: uuid::Uuid) -> String {
        format!("/api/v1/{collection}/{}", self.codec.encode(id))
    }
}
