//! 核心层：错误类型、尽力而为副作用、UI 状态投影、助手主控循环

pub mod effect;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use effect::BestEffort;
pub use error::{AssistantError, ChatError, NotifyError, StoreError, SubmitError};
pub use orchestrator::{build_assistant, spawn_assistant, Command};
pub use state::{AssistantPhase, UiState};
