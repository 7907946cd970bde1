//! 对话后端：把一条用户消息与不透明的会话句柄交给后端，取回新句柄与回复消息
//!
//! `LlmChatBackend` 用 LlmClient 实现：每个句柄在内存中保留一段历史，保证后续调用带上前文。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::core::ChatError;
use crate::llm::{LlmClient, Message};

/// 后端侧会话的不透明句柄
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationHandle(String);

impl ConversationHandle {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ConversationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 后端回复消息的角色（封闭枚举，新增角色必须在渲染处显式处理）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Assistant,
    /// 代理 / 工具代答，与 Assistant 一样展示给用户
    Agent,
    /// 后端内部消息，不展示
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub handle: ConversationHandle,
    pub messages: Vec<ChatMessage>,
}

impl ChatReply {
    /// 需要展示给用户的文本（Assistant / Agent），按顺序以空行连接
    pub fn visible_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| match m.role {
                ChatRole::Assistant | ChatRole::Agent => true,
                ChatRole::System => false,
            })
            .map(|m| m.content.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `handle` 为 None 或后端不认识时开启新会话
    async fn converse(
        &self,
        message: &str,
        handle: Option<&ConversationHandle>,
    ) -> Result<ChatReply, ChatError>;
}

/// 每个会话保留的最多消息条数（user + assistant）
const MAX_HISTORY: usize = 40;

/// 基于 LlmClient 的对话后端
pub struct LlmChatBackend {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    sessions: Mutex<HashMap<ConversationHandle, Vec<Message>>>,
}

impl LlmChatBackend {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ChatBackend for LlmChatBackend {
    async fn converse(
        &self,
        message: &str,
        handle: Option<&ConversationHandle>,
    ) -> Result<ChatReply, ChatError> {
        // 不跨 LLM 调用持锁：先取历史快照，回复成功后再写回
        let (handle, history) = {
            let sessions = self.sessions.lock().await;
            match handle.and_then(|h| sessions.get(h).map(|hist| (h.clone(), hist.clone()))) {
                Some(found) => found,
                None => (ConversationHandle::generate(), Vec::new()),
            }
        };

        let mut context = Vec::with_capacity(history.len() + 2);
        context.push(Message::system(self.system_prompt.clone()));
        context.extend(history);
        context.push(Message::user(message));

        let reply = self.llm.complete(&context).await?;
        tracing::debug!(%handle, chars = reply.len(), "chat backend replied");

        let mut sessions = self.sessions.lock().await;
        let entry = sessions.entry(handle.clone()).or_default();
        entry.push(Message::user(message));
        entry.push(Message::assistant(reply.clone()));
        if entry.len() > MAX_HISTORY {
            let excess = entry.len() - MAX_HISTORY;
            entry.drain(..excess);
        }

        Ok(ChatReply {
            handle,
            messages: vec![ChatMessage {
                role: ChatRole::Assistant,
                content: reply,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    #[tokio::test]
    async fn test_handle_threads_history() {
        let backend = LlmChatBackend::new(Arc::new(MockLlmClient), "sys");
        let first = backend.converse("hello", None).await.unwrap();
        assert!(first.visible_text().unwrap().contains("turn 1"));

        let second = backend.converse("again", Some(&first.handle)).await.unwrap();
        assert_eq!(second.handle, first.handle);
        assert!(second.visible_text().unwrap().contains("turn 2"));

        // 未知句柄开启新会话
        let fresh = backend
            .converse("new", Some(&ConversationHandle::generate()))
            .await
            .unwrap();
        assert!(fresh.visible_text().unwrap().contains("turn 1"));
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let backend = LlmChatBackend::new(Arc::new(MockLlmClient), "sys");
        let mut handle = None;
        for i in 0..30 {
            let reply = backend.converse(&format!("msg {i}"), handle.as_ref()).await.unwrap();
            handle = Some(reply.handle);
        }
        let sessions = backend.sessions.lock().await;
        let history = sessions.get(handle.as_ref().unwrap()).unwrap();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.last().unwrap().content, "(mock, turn 21) You said: msg 29");
    }

    #[test]
    fn test_system_messages_are_hidden() {
        let reply = ChatReply {
            handle: ConversationHandle::generate(),
            messages: vec![
                ChatMessage {
                    role: ChatRole::System,
                    content: "internal".into(),
                },
                ChatMessage {
                    role: ChatRole::Agent,
                    content: "from agent".into(),
                },
            ],
        };
        assert_eq!(reply.visible_text().as_deref(), Some("from agent"));
    }
}
