//! 消息日志：按顺序追加的 user / assistant 消息
//!
//! 除追加外只允许两种修改：把末尾的加载占位替换为真实回复，或在出错时移除末尾的加载占位。
//! 可选的条数上限只会丢弃最旧的消息。

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub role: LogRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// 外部调用进行中的占位
    pub loading: bool,
}

impl LogEntry {
    fn new(role: LogRole, content: impl Into<String>, loading: bool) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            loading,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
    max_entries: Option<usize>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: Some(max_entries.max(1)),
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(LogEntry::new(LogRole::User, content, false));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(LogEntry::new(LogRole::Assistant, content, false));
    }

    pub fn push_loading(&mut self) {
        self.push(LogEntry::new(LogRole::Assistant, "…", true));
    }

    /// 末尾是加载占位时原地替换为回复并返回 true；否则不做任何事
    pub fn replace_last(&mut self, content: impl Into<String>) -> bool {
        match self.entries.last_mut() {
            Some(last) if last.loading => {
                *last = LogEntry::new(LogRole::Assistant, content, false);
                true
            }
            _ => false,
        }
    }

    /// 末尾是加载占位时移除并返回 true
    pub fn remove_last_if_loading(&mut self) -> bool {
        if self.is_loading() {
            self.entries.pop();
            true
        } else {
            false
        }
    }

    pub fn is_loading(&self) -> bool {
        self.entries.last().map(|e| e.loading).unwrap_or(false)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
        if let Some(max) = self.max_entries {
            if self.entries.len() > max {
                let excess = self.entries.len() - max;
                self.entries.drain(..excess);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_only_touches_loading_tail() {
        let mut log = MessageLog::new();
        log.push_user("hi");
        assert!(!log.replace_last("nope"));
        log.push_loading();
        assert!(log.is_loading());
        assert!(log.replace_last("hello"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[1].content, "hello");
        assert!(!log.entries()[1].loading);
    }

    #[test]
    fn test_remove_then_add_on_error() {
        let mut log = MessageLog::new();
        log.push_loading();
        assert!(log.remove_last_if_loading());
        assert!(log.is_empty());
        log.push_assistant("Sorry");
        assert_eq!(log.len(), 1);
        assert!(!log.remove_last_if_loading());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_max_entries_drops_oldest() {
        let mut log = MessageLog::with_max_entries(2);
        log.push_user("a");
        log.push_assistant("b");
        log.push_user("c");
        let contents: Vec<&str> = log.entries().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["b", "c"]);
    }
}
