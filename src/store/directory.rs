//! 项目 / 任务目录：在 RecordStore 之上的强类型查询
//!
//! 助手路由用 ProjectDirectory 校验用户给出的项目标识，用 TaskDirectory 创建任务与查找相似任务。

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::StoreError;
use crate::row;
use crate::store::{tables, Filter, RecordStore, Row};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "todo".to_string()
}

/// 待创建任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub project_id: String,
    pub name: String,
    pub description: String,
}

/// 相似度搜索结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTask {
    pub task: Task,
    pub score: f32,
}

fn from_row<T: serde::de::DeserializeOwned>(row: Row) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

#[derive(Clone)]
pub struct ProjectDirectory {
    store: Arc<dyn RecordStore>,
}

impl ProjectDirectory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// 按 id 精确查找，找不到再按名称（忽略大小写、首尾空白）查找；都没有返回 None
    pub async fn resolve(&self, ident: &str) -> Result<Option<Project>, StoreError> {
        let ident = ident.trim();
        if ident.is_empty() {
            return Ok(None);
        }
        let by_id = self
            .store
            .select(tables::PROJECTS, &Filter::all().eq("id", ident))
            .await?;
        if let Some(row) = by_id.into_iter().next() {
            return from_row(row).map(Some);
        }
        let candidates = self
            .store
            .select(tables::PROJECTS, &Filter::all().contains("name", ident))
            .await?;
        for row in candidates {
            let project: Project = from_row(row)?;
            if project.name.eq_ignore_ascii_case(ident) {
                return Ok(Some(project));
            }
        }
        Ok(None)
    }
}

#[derive(Clone)]
pub struct TaskDirectory {
    store: Arc<dyn RecordStore>,
}

impl TaskDirectory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, task: NewTask) -> Result<Task, StoreError> {
        let id = self
            .store
            .insert(
                tables::TASKS,
                row! {
                    "project_id" => task.project_id.clone(),
                    "name" => task.name.clone(),
                    "description" => task.description.clone(),
                    "status" => default_status(),
                    "created_at" => chrono::Utc::now().to_rfc3339(),
                },
            )
            .await?;
        tracing::info!(task_id = %id, project_id = %task.project_id, "task created");
        Ok(Task {
            id,
            project_id: task.project_id,
            name: task.name,
            description: task.description,
            status: default_status(),
        })
    }

    /// 按词重叠打分：名称命中计 2 分、描述命中计 1 分；按分数降序取前 `limit` 条
    pub async fn similar(&self, query: &str, limit: usize) -> Result<Vec<ScoredTask>, StoreError> {
        let terms = tokenize(query);
        if terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let rows = self.store.select(tables::TASKS, &Filter::all()).await?;
        let mut scored = Vec::new();
        for row in rows {
            let task: Task = from_row(row)?;
            let name_terms = tokenize(&task.name);
            let desc_terms = tokenize(&task.description);
            let score: f32 = terms
                .iter()
                .map(|t| {
                    if name_terms.contains(t) {
                        2.0
                    } else if desc_terms.contains(t) {
                        1.0
                    } else {
                        0.0
                    }
                })
                .sum();
            if score > 0.0 {
                scored.push(ScoredTask { task, score });
            }
        }
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }
}

/// 停用词之外、长度 >= 3 的小写词
fn tokenize(text: &str) -> HashSet<String> {
    const STOP_WORDS: &[&str] = &[
        "the", "and", "for", "with", "that", "this", "want", "find", "similar", "tasks", "task",
        "like", "about", "some",
    ];
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= 3 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    async fn seeded() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert(tables::PROJECTS, row! { "id" => "p-1", "name" => "Apollo" })
            .await
            .unwrap();
        store
            .insert(
                tables::TASKS,
                row! { "project_id" => "p-1", "name" => "Fix login redirect", "description" => "OAuth callback loops" },
            )
            .await
            .unwrap();
        store
            .insert(
                tables::TASKS,
                row! { "project_id" => "p-1", "name" => "Update billing page", "description" => "login banner copy" },
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_resolve_by_id_and_name() {
        let dir = ProjectDirectory::new(seeded().await);
        assert_eq!(dir.resolve("p-1").await.unwrap().unwrap().name, "Apollo");
        assert_eq!(dir.resolve(" apollo ").await.unwrap().unwrap().id, "p-1");
        assert!(dir.resolve("p-404").await.unwrap().is_none());
        assert!(dir.resolve("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_similar_ranks_name_hits_first() {
        let dir = TaskDirectory::new(seeded().await);
        let hits = dir.similar("login problems", 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].task.name, "Fix login redirect");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let dir = TaskDirectory::new(seeded().await);
        let created = dir
            .create(NewTask {
                project_id: "p-1".into(),
                name: "Sprint retro notes".into(),
                description: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(created.status, "todo");
        let hits = dir.similar("retro", 1).await.unwrap();
        assert_eq!(hits[0].task.id, created.id);
    }
}
