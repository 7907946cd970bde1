//! RecordStore trait 与通用的表操作
//!
//! 行（Row）是 JSON 对象；每行在插入时获得字符串 `id`。
//! `Tables` 是内存与文件两种实现共享的纯数据部分。

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::StoreError;

/// 单行记录
pub type Row = Map<String, Value>;

/// 记录主键
pub type RecordId = String;

/// 记录存储：插入、按冲突键 upsert、按条件查询
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 插入新行；行内无 `id` 时自动分配，返回最终 id
    async fn insert(&self, table: &str, row: Row) -> Result<RecordId, StoreError>;

    /// 以 `conflict_key` 字段判重：已存在则合并覆盖，否则插入（幂等，可安全重试）
    async fn upsert(&self, table: &str, row: Row, conflict_key: &str) -> Result<RecordId, StoreError>;

    /// 返回满足全部条件的行（按插入顺序）
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError>;
}

/// 单个查询条件
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// 字段值严格相等
    Eq(String, Value),
    /// 字符串字段包含子串（忽略大小写）
    Contains(String, String),
}

impl Predicate {
    fn matches(&self, row: &Row) -> bool {
        match self {
            Predicate::Eq(field, value) => row.get(field) == Some(value),
            Predicate::Contains(field, needle) => row
                .get(field)
                .and_then(Value::as_str)
                .map(|s| s.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
        }
    }
}

/// 条件的合取；空 Filter 匹配所有行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Eq(field.into(), value.into()));
        self
    }

    pub fn contains(mut self, field: impl Into<String>, needle: impl Into<String>) -> Self {
        self.predicates
            .push(Predicate::Contains(field.into(), needle.into()));
        self
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.predicates.iter().all(|p| p.matches(row))
    }
}

/// 表集合：表名 -> 行列表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tables {
    tables: BTreeMap<String, Vec<Row>>,
}

impl Tables {
    pub fn insert(&mut self, table: &str, mut row: Row) -> Result<RecordId, StoreError> {
        let id = ensure_id(&mut row);
        let rows = self.tables.entry(table.to_string()).or_default();
        if rows.iter().any(|r| r.get("id") == row.get("id")) {
            return Err(StoreError::Conflict {
                table: table.to_string(),
                key: id,
            });
        }
        rows.push(row);
        Ok(id)
    }

    pub fn upsert(&mut self, table: &str, row: Row, conflict_key: &str) -> Result<RecordId, StoreError> {
        let key = row.get(conflict_key).cloned().ok_or_else(|| {
            StoreError::Backend(format!("row for {table} is missing conflict key '{conflict_key}'"))
        })?;
        let rows = self.tables.entry(table.to_string()).or_default();
        if let Some(existing) = rows.iter_mut().find(|r| r.get(conflict_key) == Some(&key)) {
            for (k, v) in row {
                // 已有行的 id 保持不变
                if k != "id" {
                    existing.insert(k, v);
                }
            }
            return Ok(existing
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string());
        }
        let mut row = row;
        let id = ensure_id(&mut row);
        rows.push(row);
        Ok(id)
    }

    pub fn select(&self, table: &str, filter: &Filter) -> Vec<Row> {
        self.tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map(Vec::len).unwrap_or(0)
    }
}

fn ensure_id(row: &mut Row) -> RecordId {
    match row.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            row.insert("id".into(), Value::String(id.clone()));
            id
        }
    }
}

/// 便捷构造：`row! { "name" => "Acme", "size" => 12 }`
#[macro_export]
macro_rules! row {
    ($($k:expr => $v:expr),* $(,)?) => {{
        let mut r = $crate::store::Row::new();
        $( r.insert(($k).to_string(), ::serde_json::json!($v)); )*
        r
    }};
}
