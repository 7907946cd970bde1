//! AI 助手侧边栏：意图识别 → 按意图的多轮槽位收集 → 外部调用
//!
//! - **intent**: 关键词意图分类
//! - **conversation**: 对话状态（带槽位的和类型）
//! - **log**: 消息日志（追加 / 替换占位 / 移除占位）
//! - **router**: 纯状态转移 `step` / `finish`
//! - **session**: Assistant，执行外部调用并维护日志

pub mod conversation;
pub mod intent;
pub mod log;
pub mod router;
pub mod session;

pub use conversation::{ConversationState, CreateTaskStep, FindSimilarStep};
pub use intent::{classify, Intent};
pub use log::{LogEntry, LogRole, MessageLog};
pub use router::{Effect, Outcome, RenderSettings, Step};
pub use session::Assistant;
