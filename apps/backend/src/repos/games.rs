//! Session records (`game/<id>`).

use crate::domain::GameSession;
use crate::store::{self, keys, KvStore, StoreError};

pub async fn find(store: &dyn KvStore, session_id: &str) -> Result<Option<GameSession>, StoreError> {
    store::get_json(store, &keys::session_key(session_id)).await
}

pub async fn save(store: &dyn KvStore, session: &GameSession) -> Result<(), StoreError> {
    store::set_json(store, &keys::session_key(&session.id), session).await
}

/// Current round counter, if the session exists.
pub async fn current_round(store: &dyn KvStore, session_id: &str) -> Result<Option<u32>, StoreError> {
    Ok(find(store, session_id).await?.map(|session| session.round))
}
