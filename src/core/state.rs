//! UI 状态投影
//!
//! UI 只持有轻量的 UiState（阶段、对话标签、日志副本、输入锁）；完整状态由 Assistant 维护并投影到 UiState。

use serde::Serialize;

use crate::assistant::{Assistant, LogEntry};

/// 助手阶段（UI 投影用）
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AssistantPhase {
    /// 无活动流程
    Idle,
    /// 正在某个多轮流程中等待用户回答
    InFlow,
    /// 外部调用进行中
    Waiting,
}

#[derive(Clone, Debug, Serialize)]
pub struct UiState {
    pub phase: AssistantPhase,
    /// 当前对话步骤的标签（如 "new task: name"）
    pub conversation: &'static str,
    pub history: Vec<LogEntry>,
    pub input_locked: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            phase: AssistantPhase::Idle,
            conversation: "idle",
            history: Vec::new(),
            input_locked: false,
        }
    }
}

impl UiState {
    /// 从 Assistant 投影；日志末尾是加载占位时视为等待中并锁定输入
    pub fn project(assistant: &Assistant) -> Self {
        let waiting = assistant.log().is_loading();
        let phase = if waiting {
            AssistantPhase::Waiting
        } else if assistant.state().is_idle() {
            AssistantPhase::Idle
        } else {
            AssistantPhase::InFlow
        };
        Self {
            phase,
            conversation: assistant.state().label(),
            history: assistant.log().entries().to_vec(),
            input_locked: waiting,
        }
    }
}
