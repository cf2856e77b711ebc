use crate::error::{storage_error, DespachoResult};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

pub mod files;
pub mod memory;
pub mod redis_store;

pub use files::{LocalObjectStorage, ObjectStorage};
pub use memory::InMemoryStore;
pub use redis_store::RedisStore;

/// Collections held by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Clients,
    Cases,
    Events,
    Documents,
    Accounts,
    Preferences,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Clients => "clients",
            Table::Cases => "cases",
            Table::Events => "events",
            Table::Documents => "documents",
            Table::Accounts => "lawyer_accounts",
            Table::Preferences => "user_preferences",
        }
    }
}

/// Row-oriented persistence backend. Rows are JSON objects keyed by `id`.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Every row of a table, in no particular order
    async fn select(&self, table: Table) -> DespachoResult<Vec<Value>>;

    /// One row by id
    async fn get(&self, table: Table, id: &str) -> DespachoResult<Option<Value>>;

    /// Store a new row, assigning `id` and `created_at` when absent, and
    /// return it as stored
    async fn insert(&self, table: Table, row: Value) -> DespachoResult<Value>;

    /// Shallow-merge `patch` into an existing row
    async fn update(&self, table: Table, id: &str, patch: Value) -> DespachoResult<()>;

    /// Remove a row; removing a missing id is not an error
    async fn delete(&self, table: Table, id: &str) -> DespachoResult<()>;
}

impl dyn Store {
    /// Every row of `table` that decodes. Rows that don't are logged and
    /// skipped.
    pub async fn select_as<T: DeserializeOwned>(&self, table: Table) -> DespachoResult<Vec<T>> {
        let rows = self
            .select(table)
            .await?
            .into_iter()
            .filter_map(|row| {
                let id = row
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("?")
                    .to_string();
                match serde_json::from_value(row) {
                    Ok(decoded) => Some(decoded),
                    Err(e) => {
                        warn!("Skipping unreadable row {} in {}: {}", id, table.name(), e);
                        None
                    }
                }
            })
            .collect();
        Ok(rows)
    }

    /// One row of `table`, decoded
    pub async fn get_as<T: DeserializeOwned>(&self, table: Table, id: &str) -> DespachoResult<Option<T>> {
        match self.get(table, id).await? {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Insert a typed payload and decode the stored row
    pub async fn insert_as<P: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: Table,
        payload: &P,
    ) -> DespachoResult<T> {
        let row = self.insert(table, serde_json::to_value(payload)?).await?;
        Ok(serde_json::from_value(row)?)
    }

    /// Update with a typed patch
    pub async fn update_with<P: Serialize + Sync>(
        &self,
        table: Table,
        id: &str,
        patch: &P,
    ) -> DespachoResult<()> {
        self.update(table, id, serde_json::to_value(patch)?).await
    }

    /// Insert or replace a whole row under a caller-chosen id
    pub async fn upsert_as<P: Serialize + Sync>(
        &self,
        table: Table,
        id: &str,
        row: &P,
    ) -> DespachoResult<()> {
        let mut value = serde_json::to_value(row)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("id".to_string(), Value::String(id.to_string()));
        }
        if self.get(table, id).await?.is_some() {
            self.update(table, id, value).await
        } else {
            self.insert(table, value).await.map(|_| ())
        }
    }
}

/// Current time in the format rows carry
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Validate a new row and fill `id` / `created_at`. Returns the id.
pub(crate) fn prepare_insert(row: &mut Value) -> DespachoResult<String> {
    let object = row
        .as_object_mut()
        .ok_or_else(|| storage_error("Rows must be JSON objects"))?;

    let id = match object.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            let id = uuid::Uuid::new_v4().to_string();
            object.insert("id".to_string(), Value::String(id.clone()));
            id
        }
    };

    if !matches!(object.get("created_at"), Some(Value::String(_))) {
        object.insert("created_at".to_string(), Value::String(timestamp_now()));
    }

    Ok(id)
}

/// Shallow merge; `id` is never overwritten
pub(crate) fn merge_patch(row: &mut Map<String, Value>, patch: Value) -> DespachoResult<()> {
    let Value::Object(patch) = patch else {
        return Err(storage_error("Patches must be JSON objects"));
    };
    for (key, value) in patch {
        if key != "id" {
            row.insert(key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Deserialize)]
    struct Named {
        id: String,
        name: String,
    }

    #[tokio::test]
    async fn test_select_as_skips_rows_that_do_not_decode() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        store
            .insert(Table::Clients, json!({"id": "ok", "name": "Ana"}))
            .await
            .unwrap();
        store
            .insert(Table::Clients, json!({"id": "bad", "name": 42}))
            .await
            .unwrap();

        let rows: Vec<Named> = store.select_as(Table::Clients).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].id.as_str(), rows[0].name.as_str()), ("ok", "Ana"));
    }

    #[test]
    fn test_prepare_insert_assigns_id_and_timestamp() {
        let mut row = json!({"name": "Ana"});
        let id = prepare_insert(&mut row).unwrap();
        assert_eq!(row["id"], Value::String(id.clone()));
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert!(row["created_at"].is_string());
    }

    #[test]
    fn test_prepare_insert_keeps_given_id() {
        let mut row = json!({"id": "fixed", "created_at": "2024-01-01T00:00:00Z"});
        assert_eq!(prepare_insert(&mut row).unwrap(), "fixed");
        assert_eq!(row["created_at"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_prepare_insert_rejects_non_objects() {
        assert!(prepare_insert(&mut json!([1, 2])).is_err());
    }

    #[test]
    fn test_merge_patch_is_shallow_and_protects_id() {
        let mut row = json!({"id": "a", "name": "Ana", "phone": "099"})
            .as_object()
            .cloned()
            .unwrap();
        merge_patch(&mut row, json!({"id": "b", "name": "Ana María", "phone": null})).unwrap();
        assert_eq!(row["id"], "a");
        assert_eq!(row["name"], "Ana María");
        assert!(row["phone"].is_null());
    }
}
