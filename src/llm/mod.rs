//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Mock），以及助手委托使用的对话后端

pub mod chat;
pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use chat::{ChatBackend, ChatMessage, ChatReply, ChatRole, ConversationHandle, LlmChatBackend};
pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use traits::{LlmClient, Message, Role};

use crate::config::LlmSection;

/// 根据配置与环境变量选择 LLM 后端（OpenAI 兼容 / Mock）
pub fn create_llm_from_config(cfg: &LlmSection) -> Arc<dyn LlmClient> {
    let provider = cfg.provider.to_lowercase();
    match (provider.as_str(), std::env::var("OPENAI_API_KEY")) {
        ("openai", Ok(key)) => {
            tracing::info!("Using OpenAI-compatible LLM ({})", cfg.model);
            Arc::new(OpenAiClient::new(
                cfg.base_url.as_deref(),
                &cfg.model,
                &key,
                cfg.timeouts.request,
            ))
        }
        ("openai", Err(_)) => {
            tracing::warn!("provider = openai but OPENAI_API_KEY is not set, using Mock LLM");
            Arc::new(MockLlmClient)
        }
        _ => {
            tracing::info!("Using Mock LLM");
            Arc::new(MockLlmClient)
        }
    }
}
