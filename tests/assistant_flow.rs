//! 助手集成测试：意图路由、多轮槽位收集、外部调用失败后的日志与状态

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sprintly::assistant::router::{APOLOGY, ASK_PROJECT, ASK_QUERY};
use sprintly::assistant::{Assistant, ConversationState, CreateTaskStep, FindSimilarStep, LogRole};
use sprintly::core::{ChatError, StoreError};
use sprintly::llm::{ChatBackend, ChatMessage, ChatReply, ChatRole, ConversationHandle};
use sprintly::row;
use sprintly::store::{tables, Filter, InMemoryStore, RecordId, RecordStore, Row};

/// 记录每次调用收到的句柄；`fail` 为 true 时返回错误
#[derive(Default)]
struct RecordingChat {
    seen: Mutex<Vec<Option<ConversationHandle>>>,
    fail: bool,
}

impl RecordingChat {
    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatBackend for RecordingChat {
    async fn converse(
        &self,
        message: &str,
        handle: Option<&ConversationHandle>,
    ) -> Result<ChatReply, ChatError> {
        self.seen.lock().unwrap().push(handle.cloned());
        if self.fail {
            return Err(ChatError::Backend("503".into()));
        }
        Ok(ChatReply {
            handle: handle.cloned().unwrap_or_else(ConversationHandle::generate),
            messages: vec![ChatMessage {
                role: ChatRole::Agent,
                content: format!("echo: {message}"),
            }],
        })
    }
}

/// select 一律失败的存储
struct BrokenStore;

#[async_trait]
impl RecordStore for BrokenStore {
    async fn insert(&self, _t: &str, _r: Row) -> Result<RecordId, StoreError> {
        Err(StoreError::Backend("down".into()))
    }

    async fn upsert(&self, _t: &str, _r: Row, _k: &str) -> Result<RecordId, StoreError> {
        Err(StoreError::Backend("down".into()))
    }

    async fn select(&self, _t: &str, _f: &Filter) -> Result<Vec<Row>, StoreError> {
        Err(StoreError::Backend("down".into()))
    }
}

async fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store
        .insert(tables::PROJECTS, row! { "id" => "p-1", "name" => "Apollo" })
        .await
        .unwrap();
    store
        .insert(
            tables::TASKS,
            row! {
                "project_id" => "p-1",
                "name" => "Fix login redirect",
                "description" => "When the OAuth callback fails the user is sent back to the login page, which immediately retries and loops forever.",
            },
        )
        .await
        .unwrap();
    store
}

fn last_text(a: &Assistant) -> &str {
    &a.log().entries().last().unwrap().content
}

#[tokio::test]
async fn scenario_find_similar_asks_for_query_without_calls() {
    let chat = Arc::new(RecordingChat::default());
    let mut a = Assistant::new(seeded_store().await, chat.clone());

    assert!(a.begin("I want to find similar tasks").is_none());
    assert_eq!(a.state(), &ConversationState::FindingSimilar(FindSimilarStep::AskQuery));
    assert_eq!(last_text(&a), ASK_QUERY);
    assert_eq!(chat.calls(), 0);
}

#[tokio::test]
async fn scenario_unknown_project_reprompts() {
    let mut a = Assistant::new(seeded_store().await, Arc::new(RecordingChat::default()));
    a.handle_message("new task").await;
    assert_eq!(last_text(&a), ASK_PROJECT);

    a.handle_message("p-404").await;
    assert_eq!(a.state(), &ConversationState::CreatingTask(CreateTaskStep::AskProject));
    assert!(last_text(&a).contains("p-404"));
    assert!(!a.log().is_loading());
}

#[tokio::test]
async fn scenario_chat_failure_removes_placeholder() {
    let chat = Arc::new(RecordingChat {
        fail: true,
        ..Default::default()
    });
    let mut a = Assistant::new(seeded_store().await, chat);

    let effect = a.begin("how is the sprint going?").unwrap();
    assert!(a.log().is_loading());
    a.resolve(effect).await;

    let entries = a.log().entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| !e.loading));
    assert_eq!(entries[1].role, LogRole::Assistant);
    assert_eq!(entries[1].content, APOLOGY);
    assert!(a.state().is_idle());
}

#[tokio::test]
async fn create_task_end_to_end_with_skip() {
    let store = seeded_store().await;
    let chat = Arc::new(RecordingChat::default());
    let mut a = Assistant::new(store.clone(), chat.clone());

    for msg in ["Please create task", "apollo", "Write release notes", "SKIP"] {
        a.handle_message(msg).await;
    }
    match a.state() {
        ConversationState::CreatingTask(CreateTaskStep::Confirm { description, project, .. }) => {
            assert!(description.is_empty());
            assert_eq!(project.id, "p-1");
        }
        other => panic!("unexpected state {other:?}"),
    }

    a.handle_message("y").await;
    assert!(a.state().is_idle());
    assert!(last_text(&a).contains("Write release notes"));

    let tasks = store
        .select(tables::TASKS, &Filter::all().eq("name", "Write release notes"))
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["description"], "");
    assert_eq!(chat.calls(), 0);
}

#[tokio::test]
async fn declining_confirmation_creates_nothing() {
    let store = seeded_store().await;
    let mut a = Assistant::new(store.clone(), Arc::new(RecordingChat::default()));
    for msg in ["new task", "p-1", "Spike", "investigate caching", "nope"] {
        a.handle_message(msg).await;
    }
    assert!(a.state().is_idle());
    assert_eq!(store.count(tables::TASKS).await, 1);
}

#[tokio::test]
async fn similar_search_truncates_descriptions() {
    let mut a = Assistant::new(seeded_store().await, Arc::new(RecordingChat::default()));
    a.handle_message("find").await;
    a.handle_message("login loops").await;

    assert!(a.state().is_idle());
    let text = last_text(&a);
    assert!(text.contains("Fix login redirect"));
    let line = text.lines().nth(1).unwrap();
    let description = line.split_once(": ").unwrap().1;
    assert!(description.chars().count() <= 100);
    assert!(description.ends_with("..."));
}

#[tokio::test]
async fn delegate_threads_conversation_handle() {
    let chat = Arc::new(RecordingChat::default());
    let mut a = Assistant::new(seeded_store().await, chat.clone());

    a.handle_message("hello").await;
    assert_eq!(last_text(&a), "echo: hello");
    let handle = a.handle().cloned().unwrap();

    a.handle_message("what's our velocity?").await;
    let seen = chat.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![None, Some(handle)]);
}

#[tokio::test]
async fn lookup_failure_returns_to_idle_with_apology() {
    let mut a = Assistant::new(Arc::new(BrokenStore), Arc::new(RecordingChat::default()));
    a.handle_message("new task").await;
    a.handle_message("p-1").await;

    assert!(a.state().is_idle());
    assert_eq!(last_text(&a), APOLOGY);
    assert!(a.log().entries().iter().all(|e| !e.loading));
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let mut a = Assistant::new(seeded_store().await, Arc::new(RecordingChat::default()));
    assert!(a.begin("   ").is_none());
    assert!(a.log().is_empty());
}
