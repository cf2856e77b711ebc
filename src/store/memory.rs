use super::{merge_patch, prepare_insert, Store, Table};
use crate::error::{storage_error, DespachoResult, Error};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory implementation of the store (for tests and demo runs)
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<Table, HashMap<String, Map<String, Value>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn select(&self, table: Table) -> DespachoResult<Vec<Value>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .map(|rows| rows.values().cloned().map(Value::Object).collect())
            .unwrap_or_default())
    }

    async fn get(&self, table: Table, id: &str) -> DespachoResult<Option<Value>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .and_then(|rows| rows.get(id))
            .cloned()
            .map(Value::Object))
    }

    async fn insert(&self, table: Table, mut row: Value) -> DespachoResult<Value> {
        let id = prepare_insert(&mut row)?;
        let object = row
            .as_object()
            .cloned()
            .ok_or_else(|| storage_error("Rows must be JSON objects"))?;

        let mut tables = self.tables.write().await;
        tables.entry(table).or_default().insert(id, object);
        Ok(row)
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> DespachoResult<()> {
        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&table)
            .and_then(|rows| rows.get_mut(id))
            .ok_or_else(|| Error::NotFound {
                table: table.name(),
                id: id.to_string(),
            })?;
        merge_patch(row, patch)
    }

    async fn delete(&self, table: Table, id: &str) -> DespachoResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.get_mut(&table) {
            rows.remove(id);
        }
        Ok(())
    }
}
