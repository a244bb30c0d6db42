//! Player records (`player/<id>`).

use crate::domain::Player;
use crate::store::{self, keys, KvStore, StoreError};

pub async fn find(store: &dyn KvStore, player_id: &str) -> Result<Option<Player>, StoreError> {
    store::get_json(store, &keys::player_key(player_id)).await
}

pub async fn save(store: &dyn KvStore, player: &Player) -> Result<(), StoreError> {
    store::set_json(store, &keys::player_key(&player.id), player).await
}
