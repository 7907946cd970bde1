//! JSON 文件记录存储
//!
//! 整个存储是一个 JSON 文档（表名 -> 行数组）。每次写操作后先写临时文件再 rename，
//! 文件不存在时视为空存储；父目录不存在时自动创建。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::StoreError;
use crate::store::{Filter, RecordId, RecordStore, Row, Tables};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tables: Mutex<Tables>,
}

impl JsonFileStore {
    /// 打开（或新建）存储文件
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let tables = match tokio::fs::read_to_string(&path).await {
            Ok(data) if data.trim().is_empty() => Tables::default(),
            Ok(data) => serde_json::from_str(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tables::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), "record store opened");
        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    async fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(tables)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn insert(&self, table: &str, row: Row) -> Result<RecordId, StoreError> {
        let mut tables = self.tables.lock().await;
        // 写盘失败时丢弃内存中的修改，保持与文件一致
        let mut next = tables.clone();
        let id = next.insert(table, row)?;
        self.persist(&next).await?;
        *tables = next;
        Ok(id)
    }

    async fn upsert(&self, table: &str, row: Row, conflict_key: &str) -> Result<RecordId, StoreError> {
        let mut tables = self.tables.lock().await;
        let mut next = tables.clone();
        let id = next.upsert(table, row, conflict_key)?;
        self.persist(&next).await?;
        *tables = next;
        Ok(id)
    }

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        Ok(self.tables.lock().await.select(table, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        let id = store.insert("projects", row! { "name" => "Apollo" }).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let rows = reopened
            .select("projects", &Filter::all().eq("id", id.as_str()))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Apollo");
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("none.json")).await.unwrap();
        let rows = store.select("tasks", &Filter::all()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Serde(_)));
    }
}
