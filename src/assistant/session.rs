//! 助手会话：持有对话状态、消息日志、后端会话句柄，并执行外部调用
//!
//! 一次用户输入分两段：`begin` 记录用户消息并给出需要的外部调用（此时日志末尾是加载占位），
//! `resolve` 执行调用后把占位替换为回复；失败时移除占位、追加道歉消息并回到 Idle。
//! 调用方保证同一会话一次只有一个外部调用在途。

use std::sync::Arc;

use crate::assistant::router::{self, Effect, Outcome, RenderSettings, Step, APOLOGY};
use crate::assistant::{ConversationState, MessageLog};
use crate::core::{AssistantError, ChatError};
use crate::llm::{ChatBackend, ConversationHandle};
use crate::store::{ProjectDirectory, RecordStore, TaskDirectory};

pub struct Assistant {
    state: ConversationState,
    log: MessageLog,
    handle: Option<ConversationHandle>,
    projects: ProjectDirectory,
    tasks: TaskDirectory,
    chat: Arc<dyn ChatBackend>,
    settings: RenderSettings,
}

impl Assistant {
    pub fn new(store: Arc<dyn RecordStore>, chat: Arc<dyn ChatBackend>) -> Self {
        Self {
            state: ConversationState::Idle,
            log: MessageLog::new(),
            handle: None,
            projects: ProjectDirectory::new(store.clone()),
            tasks: TaskDirectory::new(store),
            chat,
            settings: RenderSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_log(mut self, log: MessageLog) -> Self {
        self.log = log;
        self
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn handle(&self) -> Option<&ConversationHandle> {
        self.handle.as_ref()
    }

    /// 清空日志与状态，并丢弃后端会话句柄
    pub fn reset(&mut self) {
        self.state = ConversationState::Idle;
        self.log.clear();
        self.handle = None;
    }

    /// 处理一条用户输入的前半段；返回 Some 表示日志末尾已放置加载占位，需要调用 `resolve`
    pub fn begin(&mut self, text: &str) -> Option<Effect> {
        if text.trim().is_empty() {
            return None;
        }
        self.log.push_user(text);
        match router::step(&self.state, text) {
            Step::Reply { next, text } => {
                tracing::info!(from = self.state.label(), to = next.label(), "conversation transition");
                self.state = next;
                self.log.push_assistant(text);
                None
            }
            Step::Call(effect) => {
                self.log.push_loading();
                Some(effect)
            }
        }
    }

    /// 执行外部调用并落定结果；日志中不会残留加载占位
    pub async fn resolve(&mut self, effect: Effect) {
        match self.run(effect).await {
            Ok(outcome) => {
                if let Outcome::Chat(reply) = &outcome {
                    self.handle = Some(reply.handle.clone());
                }
                let (next, text) = router::finish(outcome, &self.settings);
                tracing::info!(from = self.state.label(), to = next.label(), "conversation transition");
                self.state = next;
                if !self.log.replace_last(text.clone()) {
                    self.log.push_assistant(text);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, state = self.state.label(), "assistant call failed, back to idle");
                self.log.remove_last_if_loading();
                self.log.push_assistant(APOLOGY);
                self.state = ConversationState::Idle;
            }
        }
    }

    /// 完整处理一条输入（begin + resolve）
    pub async fn handle_message(&mut self, text: &str) {
        if let Some(effect) = self.begin(text) {
            self.resolve(effect).await;
        }
    }

    async fn run(&self, effect: Effect) -> Result<Outcome, AssistantError> {
        match effect {
            Effect::LookupProject(ident) => {
                let found = self
                    .projects
                    .resolve(&ident)
                    .await
                    .map_err(AssistantError::Lookup)?;
                Ok(Outcome::Project { ident, found })
            }
            Effect::CreateTask { project, task } => {
                let task = self.tasks.create(task).await.map_err(AssistantError::Create)?;
                Ok(Outcome::Created { project, task })
            }
            Effect::SearchSimilar(query) => {
                let hits = self
                    .tasks
                    .similar(&query, self.settings.max_similar_results)
                    .await
                    .map_err(AssistantError::Search)?;
                Ok(Outcome::Similar(hits))
            }
            Effect::Delegate(message) => {
                let reply = self.chat.converse(&message, self.handle.as_ref()).await?;
                if reply.visible_text().is_none() {
                    return Err(ChatError::EmptyResponse.into());
                }
                Ok(Outcome::Chat(reply))
            }
        }
    }
}
