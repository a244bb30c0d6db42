//! In-process store with the same semantics as the Redis layout.
//!
//! Supports fault injection (`fail_next`) and artificial latency
//! (`set_latency`) so tests can drive the store error and slow-store paths.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use super::{KvStore, StoreError};

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    Set(BTreeSet<String>),
    Hash(BTreeMap<String, String>),
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
    failures_pending: AtomicUsize,
    latency: Mutex<Option<Duration>>,
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::Backend(format!(
        "WRONGTYPE Operation against a key holding the wrong kind of value: {key}"
    ))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` operations with `StoreError::Unavailable`.
    pub fn fail_next(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn before_op(&self) -> Result<(), StoreError> {
        let latency = *self.latency.lock();
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        let injected = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.before_op().await?;
        match self.entries.get(key).map(|v| v.value().clone()) {
            None => Ok(None),
            Some(Value::Text(text)) => Ok(Some(text)),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.before_op().await?;
        self.entries.insert(key.to_string(), Value::Text(value));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.before_op().await?;
        Ok(self.entries.remove(key).is_some())
    }

    async fn add_to_set(&self, key: &str, member: String) -> Result<bool, StoreError> {
        self.before_op().await?;
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Set(BTreeSet::new()));
        match entry.value_mut() {
            Value::Set(members) => Ok(members.insert(member)),
            _ => Err(wrong_type(key)),
        }
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.before_op().await?;
        match self.entries.get(key).map(|v| v.value().clone()) {
            None => Ok(Vec::new()),
            Some(Value::Set(members)) => Ok(members.into_iter().collect()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn put_hash(&self, key: &str, fields: Vec<(String, String)>) -> Result<(), StoreError> {
        self.before_op().await?;
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Hash(BTreeMap::new()));
        match entry.value_mut() {
            Value::Hash(map) => {
                map.extend(fields);
                Ok(())
            }
            _ => Err(wrong_type(key)),
        }
    }

    async fn get_hash(&self, key: &str) -> Result<BTreeMap<String, String>, StoreError> {
        self.before_op().await?;
        match self.entries.get(key).map(|v| v.value().clone()) {
            None => Ok(BTreeMap::new()),
            Some(Value::Hash(map)) => Ok(map),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.before_op().await
    }
}
