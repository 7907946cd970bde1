//! 助手编排器：主控循环
//!
//! 建立 cmd/state 两通道，并在后台任务中按顺序消费用户命令（Submit/Clear/Quit）：
//! 每条命令（含其中的外部调用）执行完毕后才读取下一条，因此同一会话最多只有一个在途请求。

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::assistant::{Assistant, MessageLog, RenderSettings};
use crate::config::AppConfig;
use crate::core::UiState;
use crate::llm::{create_llm_from_config, ChatBackend, LlmChatBackend};
use crate::store::RecordStore;

/// 从 UI 发往编排器的用户命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 提交用户输入
    Submit(String),
    /// 清空对话并回到 Idle
    Clear,
    /// 退出
    Quit,
}

/// 按配置组装 Assistant（LLM 后端由 [llm] 段决定）
pub fn build_assistant(cfg: &AppConfig, store: Arc<dyn RecordStore>) -> Assistant {
    let llm = create_llm_from_config(&cfg.llm);
    let chat: Arc<dyn ChatBackend> =
        Arc::new(LlmChatBackend::new(llm, cfg.assistant.system_prompt.clone()));
    Assistant::new(store, chat)
        .with_settings(RenderSettings {
            max_similar_results: cfg.assistant.max_similar_results,
            description_preview_chars: cfg.assistant.description_preview_chars,
        })
        .with_log(MessageLog::with_max_entries(cfg.app.max_log_entries))
}

/// 启动后台命令循环：返回命令发送端与状态接收端
pub fn spawn_assistant(
    mut assistant: Assistant,
) -> (mpsc::UnboundedSender<Command>, watch::Receiver<UiState>) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (state_tx, state_rx) = watch::channel(UiState::project(&assistant));

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                Command::Submit(input) => {
                    if let Some(effect) = assistant.begin(&input) {
                        // 先推送加载占位，再等待外部调用
                        let _ = state_tx.send(UiState::project(&assistant));
                        assistant.resolve(effect).await;
                    }
                    let _ = state_tx.send(UiState::project(&assistant));
                }
                Command::Clear => {
                    assistant.reset();
                    let _ = state_tx.send(UiState::project(&assistant));
                }
                Command::Quit => break,
            }
        }
        tracing::debug!("assistant command loop stopped");
    });

    (cmd_tx, state_rx)
}
