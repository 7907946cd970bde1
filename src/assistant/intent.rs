//! 意图识别
//!
//! 关键词规则匹配（忽略大小写的子串匹配，按词表顺序第一个命中者胜出），不调用 LLM；
//! 未命中的一律委托给对话后端。

use serde::{Deserialize, Serialize};

/// 识别出的意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// 引导式创建任务
    CreateTask,
    /// 查找相似任务
    FindSimilar,
    /// 交给对话后端
    Delegate,
}

/// 词表：顺序即优先级
const VOCABULARY: &[(&str, Intent)] = &[
    ("create task", Intent::CreateTask),
    ("new task", Intent::CreateTask),
    ("find", Intent::FindSimilar),
    ("similar", Intent::FindSimilar),
];

pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();
    let intent = VOCABULARY
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Delegate);
    tracing::debug!(?intent, "classified user input");
    intent
}
