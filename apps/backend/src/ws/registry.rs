//! Connection registry: live connection → session.
//!
//! Owned exclusively by the hub's dispatch task, so no locking.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::ws::connection::Connection;

#[derive(Default)]
pub struct ConnectionRegistry {
    sessions: HashMap<String, HashMap<Uuid, Arc<dyn Connection>>>,
    session_of: HashMap<Uuid, String>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-registering a connection id moves it to the new session.
    pub fn register(&mut self, conn_id: Uuid, session_id: String, connection: Arc<dyn Connection>) {
        self.deregister(conn_id);
        self.sessions
            .entry(session_id.clone())
            .or_default()
            .insert(conn_id, connection);
        self.session_of.insert(conn_id, session_id);
    }

    /// Idempotent; returns the removed connection.
    pub fn deregister(&mut self, conn_id: Uuid) -> Option<Arc<dyn Connection>> {
        let session_id = self.session_of.remove(&conn_id)?;
        let peers = self.sessions.get_mut(&session_id)?;
        let removed = peers.remove(&conn_id);
        if peers.is_empty() {
            self.sessions.remove(&session_id);
        }
        removed
    }

    pub fn peers(&self, session_id: &str) -> Vec<(Uuid, Arc<dyn Connection>)> {
        self.sessions
            .get(session_id)
            .map(|peers| {
                peers
                    .iter()
                    .map(|(id, conn)| (*id, Arc::clone(conn)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.session_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.session_of.is_empty()
    }

    pub fn session_len(&self, session_id: &str) -> usize {
        self.sessions.get(session_id).map_or(0, HashMap::len)
    }

    pub fn drain(&mut self) -> Vec<Arc<dyn Connection>> {
        self.session_of.clear();
        self.sessions
            .drain()
            .flat_map(|(_, peers)| peers.into_values())
            .collect()
    }
}
