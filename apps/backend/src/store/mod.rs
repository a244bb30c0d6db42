//! Key-value store collaborator.
//!
//! The realtime engine only needs get/set/delete by key plus an append-only
//! set and a flat hash; last writer wins and there are no transactions.
//! Redis backs production, [`memory::MemoryStore`] backs tests and
//! store-less local runs.

pub mod keys;
pub mod memory;
pub mod redis_store;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("failed to (de)serialize {key}: {detail}")]
    Serialization { key: String, detail: String },
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Returns whether the member was newly added.
    async fn add_to_set(&self, key: &str, member: String) -> Result<bool, StoreError>;

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    async fn put_hash(&self, key: &str, fields: Vec<(String, String)>) -> Result<(), StoreError>;

    async fn get_hash(&self, key: &str) -> Result<BTreeMap<String, String>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(raw) => decode(key, &raw).map(Some),
        None => Ok(None),
    }
}

pub async fn set_json<T: Serialize>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    store.set(key, encode(key, value)?).await
}

pub fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|err| StoreError::Serialization {
        key: key.to_string(),
        detail: err.to_string(),
    })
}

pub fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|err| StoreError::Serialization {
        key: key.to_string(),
        detail: err.to_string(),
    })
}
