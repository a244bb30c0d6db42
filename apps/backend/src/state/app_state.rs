use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::Dealer;
use crate::services::coordinator::SessionCoordinator;
use crate::store::{KvStore, MemoryStore};
use crate::ws::hub::{Hub, HubHandle};

/// Shared handles for HTTP handlers and websocket sessions.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub coordinator: Arc<SessionCoordinator>,
    pub hub: HubHandle,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Start the persistence sink and the hub on the current runtime.
    pub fn start(config: AppConfig, store: Arc<dyn KvStore>, dealer: Dealer) -> Self {
        let coordinator = Arc::new(SessionCoordinator::start(
            Arc::clone(&store),
            dealer,
            config.trick_strictness,
            config.persistence.clone(),
        ));
        let hub = Hub::start(config.hub.clone(), Arc::clone(&coordinator));
        Self {
            store,
            coordinator,
            hub,
            config: Arc::new(config),
        }
    }

    /// Default configuration over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::start(
            AppConfig::default(),
            Arc::new(MemoryStore::new()),
            Dealer::default(),
        )
    }

    /// Stop the hub, then drain outstanding side effects.
    pub async fn shutdown(&self) {
        self.hub.stop().await;
        self.coordinator.flush().await;
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
