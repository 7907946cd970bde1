//! 错误类型：存储、通知、对话后端、向导提交、助手路由
//!
//! 致命错误（存储写入、项目/任务查询）以 Result 向上传播；
//! 通知发送失败属于非致命错误，只通过 [`crate::core::BestEffort`] 记录，不进入 `?` 链。

use thiserror::Error;

/// 记录存储（RecordStore）操作失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found in {table}: {key}")]
    NotFound { table: String, key: String },

    #[error("conflicting record in {table}: {key}")]
    Conflict { table: String, key: String },

    #[error("store I/O error: {0}")]
    Io(String),

    #[error("store serialization error: {0}")]
    Serde(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

/// 通知发送失败（永远只记录日志）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("notification rejected with status {status}")]
    Rejected { status: u16 },
}

/// 外部对话后端失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("chat backend error: {0}")]
    Backend(String),

    #[error("chat backend returned no messages")]
    EmptyResponse,
}

/// 向导终态提交失败：每个致命阶段一个变体
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("submit is only allowed from the terminal step (at {step} of {total})")]
    NotTerminal { step: usize, total: usize },

    #[error("step {step} has invalid fields: {fields:?}")]
    Invalid { step: usize, fields: Vec<String> },

    #[error("a submission is already in flight")]
    AlreadySubmitting,

    #[error("creating the primary record failed: {0}")]
    Primary(StoreError),

    #[error("writing dependent records failed: {0}")]
    Dependent(StoreError),

    #[error("writing auxiliary records failed: {0}")]
    Auxiliary(StoreError),
}

/// 助手路由中外部调用失败（全部致命：回到 Idle 并给出道歉消息）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssistantError {
    #[error("project lookup failed: {0}")]
    Lookup(StoreError),

    #[error("task creation failed: {0}")]
    Create(StoreError),

    #[error("similarity search failed: {0}")]
    Search(StoreError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}
