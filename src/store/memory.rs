//! 内存记录存储（测试与无数据目录时使用）

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::StoreError;
use crate::store::{Filter, RecordId, RecordStore, Row, Tables};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self, table: &str) -> usize {
        self.tables.read().await.len(table)
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn insert(&self, table: &str, row: Row) -> Result<RecordId, StoreError> {
        self.tables.write().await.insert(table, row)
    }

    async fn upsert(&self, table: &str, row: Row, conflict_key: &str) -> Result<RecordId, StoreError> {
        self.tables.write().await.upsert(table, row, conflict_key)
    }

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        Ok(self.tables.read().await.select(table, filter))
    }
}
