use super::{merge_patch, prepare_insert, Store, Table};
use crate::error::{storage_error, DespachoResult, Error};
use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

/// Redis keys
mod keys {
    pub const TABLE_PREFIX: &str = "despacho:";
}

/// Redis-backed store: one hash per table, field = row id, value = row JSON
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    /// Create a client for `redis_url`; the connection is opened lazily
    pub fn new(redis_url: &str) -> DespachoResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = RedisClient::open(redis_url)
            .map_err(|e| storage_error(&format!("Failed to create Redis client: {}", e)))?;

        Ok(Self { client })
    }

    /// Get a Redis connection from the client
    async fn get_connection(&self) -> DespachoResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| storage_error(&format!("Failed to connect to Redis: {}", e)))
    }

    fn key(table: Table) -> String {
        format!("{}{}", keys::TABLE_PREFIX, table.name())
    }

    /// Ping the server
    pub async fn ping(&self) -> DespachoResult<()> {
        let mut conn = self.get_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn select(&self, table: Table) -> DespachoResult<Vec<Value>> {
        let mut conn = self.get_connection().await?;

        let rows: HashMap<String, String> = conn.hgetall(Self::key(table)).await?;

        rows.values()
            .map(|json| serde_json::from_str(json).map_err(Error::from))
            .collect()
    }

    async fn get(&self, table: Table, id: &str) -> DespachoResult<Option<Value>> {
        let mut conn = self.get_connection().await?;

        let row: Option<String> = conn.hget(Self::key(table), id).await?;

        match row {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, table: Table, mut row: Value) -> DespachoResult<Value> {
        let id = prepare_insert(&mut row)?;
        let json = serde_json::to_string(&row)?;

        let mut conn = self.get_connection().await?;
        conn.hset::<_, _, _, ()>(Self::key(table), &id, json).await?;

        debug!("Inserted {} into {}", id, table.name());
        Ok(row)
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> DespachoResult<()> {
        let key = Self::key(table);
        let mut conn = self.get_connection().await?;

        let existing: Option<String> = conn.hget(&key, id).await?;
        let existing = existing.ok_or_else(|| Error::NotFound {
            table: table.name(),
            id: id.to_string(),
        })?;

        let mut row: Value = serde_json::from_str(&existing)?;
        let object = row
            .as_object_mut()
            .ok_or_else(|| storage_error(&format!("Row {} in {} is not an object", id, table.name())))?;
        merge_patch(object, patch)?;

        let json = serde_json::to_string(&row)?;
        conn.hset::<_, _, _, ()>(&key, id, json).await?;

        debug!("Updated {} in {}", id, table.name());
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> DespachoResult<()> {
        let mut conn = self.get_connection().await?;
        conn.hdel::<_, _, ()>(Self::key(table), id).await?;

        debug!("Deleted {} from {}", id, table.name());
        Ok(())
    }
}
