//! Mock LLM 客户端（用于测试与未配置 API Key 时，无需网络）
//!
//! 取最后一条 User 消息并回显，附带上下文中用户消息的条数，便于确认会话句柄是否保留了历史。

use async_trait::async_trait;

use crate::core::ChatError;
use crate::llm::{LlmClient, Message, Role};

#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, ChatError> {
        let user_turns = messages.iter().filter(|m| m.role == Role::User).count();
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!("(mock, turn {user_turns}) You said: {last_user}"))
    }
}
