use std::collections::BTreeMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use tracing::info;

use super::{KvStore, StoreError};

/// Redis-backed store. `ConnectionManager` reconnects on its own and is
/// cheap to clone, so every command works on its own handle.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)
            .map_err(|err| StoreError::Unavailable(format!("Invalid REDIS_URL: {err}")))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|err| {
                StoreError::Unavailable(format!("Unable to initialize Redis connection manager: {err}"))
            })?;

        info!("Redis store connected");
        Ok(Self { manager })
    }

    fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }
}

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<String> = self.conn().get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.conn().set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let removed: i64 = self.conn().del(key).await?;
        Ok(removed > 0)
    }

    async fn add_to_set(&self, key: &str, member: String) -> Result<bool, StoreError> {
        let added: i64 = self.conn().sadd(key, member).await?;
        Ok(added > 0)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let members: Vec<String> = self.conn().smembers(key).await?;
        Ok(members)
    }

    async fn put_hash(&self, key: &str, fields: Vec<(String, String)>) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }
        self.conn().hset_multiple::<_, _, _, ()>(key, &fields).await?;
        Ok(())
    }

    async fn get_hash(&self, key: &str) -> Result<BTreeMap<String, String>, StoreError> {
        let fields: BTreeMap<String, String> = self.conn().hgetall(key).await?;
        Ok(fields)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn();
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
