//! TUI 应用主循环
//!
//! 进入全屏/原始模式，轮询 state_rx 与键盘事件，将用户输入与快捷键转为 Command 发送给编排器，
//! 每帧用 draw 渲染 UiState 与输入缓冲。

use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};

use crate::core::{Command, UiState};
use crate::ui::event::{key_action, poll_key, InputLine, KeyAction};
use crate::ui::render::draw;

/// 运行 TUI：启用原始模式与全屏，循环 poll 事件 + 渲染，退出时恢复终端
pub async fn run_app(
    state_rx: watch::Receiver<UiState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, state_rx, cmd_tx).await;

    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: watch::Receiver<UiState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
) -> anyhow::Result<()> {
    let mut input = InputLine::default();
    let mut conversation_scroll = usize::MAX;
    let mut last_history_len = 0usize;

    loop {
        let state = state_rx.borrow().clone();

        // 有新消息时滚到底部
        if state.history.len() != last_history_len {
            last_history_len = state.history.len();
            conversation_scroll = usize::MAX;
        }

        if let Some(action) = poll_key()?.and_then(key_action) {
            match action {
                KeyAction::Send(Command::Quit) => {
                    let _ = cmd_tx.send(Command::Quit);
                    break;
                }
                KeyAction::Send(cmd) => {
                    let _ = cmd_tx.send(cmd);
                }
                // 等待外部调用期间输入行保留，Enter 不生效
                KeyAction::Submit if state.input_locked => {}
                KeyAction::Submit => {
                    if let Some(text) = input.take_submission() {
                        let _ = cmd_tx.send(Command::Submit(text));
                    }
                }
                KeyAction::Insert(c) => input.insert(c),
                KeyAction::DeleteBack => input.delete_back(),
                KeyAction::Scroll(scroll) => conversation_scroll = scroll.apply(conversation_scroll),
            }
        }

        let mut scroll_info = (0usize, 0usize);
        terminal.draw(|f| {
            draw(f, &state, input.as_str(), conversation_scroll, &mut scroll_info);
        })?;
        let (total_lines, viewport_height) = scroll_info;
        conversation_scroll = conversation_scroll.min(total_lines.saturating_sub(viewport_height));

        tokio::task::yield_now().await;
    }
    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
