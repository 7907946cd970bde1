//! 键盘输入
//!
//! 按键先映射为 [`KeyAction`]：Ctrl+L 清空会话，Ctrl+Q / Ctrl+C / Esc 退出，
//! Enter 提交输入行，方向键与翻页键滚动对话区，其余可见字符写入输入行。

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::Command;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const PAGE: usize = 10;

/// 一次按键对应的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// 直接转发给编排器的命令（Clear / Quit）
    Send(Command),
    /// 提交当前输入行
    Submit,
    Insert(char),
    DeleteBack,
    Scroll(Scroll),
}

/// 对话区滚动；偏移量 `usize::MAX` 表示贴底，由渲染层夹到实际行数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    Up(usize),
    Down(usize),
    Top,
    Bottom,
}

impl Scroll {
    pub fn apply(self, offset: usize) -> usize {
        match self {
            Scroll::Up(n) => offset.saturating_sub(n),
            Scroll::Down(n) => offset.saturating_add(n),
            Scroll::Top => 0,
            Scroll::Bottom => usize::MAX,
        }
    }
}

/// 等待至多 100ms 的一次按下事件（忽略释放/重复）
pub fn poll_key() -> anyhow::Result<Option<KeyEvent>> {
    if event::poll(POLL_INTERVAL)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(Some(key));
            }
        }
    }
    Ok(None)
}

pub fn key_action(key: KeyEvent) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Char('l') if ctrl => KeyAction::Send(Command::Clear),
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => KeyAction::Send(Command::Quit),
        KeyCode::Esc => KeyAction::Send(Command::Quit),
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(c) => KeyAction::Insert(c),
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Backspace => KeyAction::DeleteBack,
        KeyCode::Up => KeyAction::Scroll(Scroll::Up(1)),
        KeyCode::Down => KeyAction::Scroll(Scroll::Down(1)),
        KeyCode::PageUp => KeyAction::Scroll(Scroll::Up(PAGE)),
        KeyCode::PageDown => KeyAction::Scroll(Scroll::Down(PAGE)),
        KeyCode::Home => KeyAction::Scroll(Scroll::Top),
        KeyCode::End => KeyAction::Scroll(Scroll::Bottom),
        _ => return None,
    };
    Some(action)
}

/// 底部输入行
#[derive(Debug, Default)]
pub struct InputLine {
    buffer: String,
}

impl InputLine {
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn insert(&mut self, c: char) {
        self.buffer.push(c);
    }

    pub fn delete_back(&mut self) {
        self.buffer.pop();
    }

    /// 取出去掉首尾空白的内容并清空输入行；全空白时返回 None
    pub fn take_submission(&mut self) -> Option<String> {
        let text = self.buffer.trim().to_string();
        self.buffer.clear();
        (!text.is_empty()).then_some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_shortcuts_map_to_commands() {
        let ctrl = KeyModifiers::CONTROL;
        assert_eq!(key_action(key(KeyCode::Char('l'), ctrl)), Some(KeyAction::Send(Command::Clear)));
        assert_eq!(key_action(key(KeyCode::Char('q'), ctrl)), Some(KeyAction::Send(Command::Quit)));
        assert_eq!(key_action(key(KeyCode::Char('c'), ctrl)), Some(KeyAction::Send(Command::Quit)));
        assert_eq!(key_action(key(KeyCode::Esc, KeyModifiers::NONE)), Some(KeyAction::Send(Command::Quit)));
        assert_eq!(key_action(key(KeyCode::Char('x'), ctrl)), None);
    }

    #[test]
    fn test_plain_keys_edit_and_scroll() {
        let none = KeyModifiers::NONE;
        assert_eq!(key_action(key(KeyCode::Char('q'), none)), Some(KeyAction::Insert('q')));
        assert_eq!(key_action(key(KeyCode::Char('Y'), KeyModifiers::SHIFT)), Some(KeyAction::Insert('Y')));
        assert_eq!(key_action(key(KeyCode::Enter, none)), Some(KeyAction::Submit));
        assert_eq!(key_action(key(KeyCode::PageUp, none)), Some(KeyAction::Scroll(Scroll::Up(PAGE))));
        assert_eq!(key_action(key(KeyCode::Tab, none)), None);
    }

    #[test]
    fn test_scroll_saturates() {
        assert_eq!(Scroll::Up(10).apply(3), 0);
        assert_eq!(Scroll::Down(1).apply(usize::MAX), usize::MAX);
        assert_eq!(Scroll::Top.apply(42), 0);
        assert_eq!(Scroll::Bottom.apply(0), usize::MAX);
    }

    #[test]
    fn test_input_line_submission() {
        let mut line = InputLine::default();
        for c in "  new task ".chars() {
            line.insert(c);
        }
        line.insert('!');
        line.delete_back();
        assert_eq!(line.take_submission().as_deref(), Some("new task"));
        assert_eq!(line.as_str(), "");

        line.insert(' ');
        assert_eq!(line.take_submission(), None);
        assert_eq!(line.as_str(), "");
    }
}
