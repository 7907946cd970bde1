//! 对话状态：一次只有一个流程处于活动状态
//!
//! 每个步骤只携带到该步为止已经收集的槽位，不可能出现「步骤与流程不匹配」的组合。

use crate::store::Project;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    CreatingTask(CreateTaskStep),
    FindingSimilar(FindSimilarStep),
}

/// 创建任务流程：项目 → 名称 → 描述 → 确认
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateTaskStep {
    AskProject,
    AskTaskName {
        project: Project,
    },
    AskDescription {
        project: Project,
        task_name: String,
    },
    Confirm {
        project: Project,
        task_name: String,
        description: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindSimilarStep {
    AskQuery,
}

impl ConversationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ConversationState::Idle)
    }

    /// UI 标题栏展示用
    pub fn label(&self) -> &'static str {
        match self {
            ConversationState::Idle => "idle",
            ConversationState::CreatingTask(step) => match step {
                CreateTaskStep::AskProject => "new task: project",
                CreateTaskStep::AskTaskName { .. } => "new task: name",
                CreateTaskStep::AskDescription { .. } => "new task: description",
                CreateTaskStep::Confirm { .. } => "new task: confirm",
            },
            ConversationState::FindingSimilar(FindSimilarStep::AskQuery) => "find similar: query",
        }
    }
}
