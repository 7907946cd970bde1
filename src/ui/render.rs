//! 界面渲染
//!
//! 根据 UiState（阶段、对话标签、消息日志）与 input_buffer 绘制：标题栏显示阶段与当前流程步骤，
//! 主体为消息日志（按角色着色、加载占位显示为等待提示、按宽度换行），底部为输入框与快捷键提示。

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::assistant::LogRole;
use crate::core::{AssistantPhase, UiState};

/// 将内容按宽度换行，支持 UTF-8（按字符数，避免在 UTF-8 中间截断）
fn wrap_text(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    for para in s.split('\n') {
        let mut line = String::new();
        for ch in para.chars() {
            if line.chars().count() >= width {
                lines.push(std::mem::take(&mut line));
            }
            line.push(ch);
        }
        lines.push(line);
    }
    lines
}

fn phase_label(phase: &AssistantPhase) -> &'static str {
    match phase {
        AssistantPhase::Idle => "ready",
        AssistantPhase::InFlow => "waiting for you",
        AssistantPhase::Waiting => "thinking…",
    }
}

/// 绘制一帧：上方对话区（标题 + 日志 + 滚动条），下方输入区；将 (总行数, 可视高度) 写入 out 供外部 clamp 滚动
pub fn draw(
    f: &mut Frame,
    state: &UiState,
    input_buffer: &str,
    conversation_scroll: usize,
    out: &mut (usize, usize),
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(4)])
        .split(f.area());

    let conv_area = chunks[0];
    let content_width = conv_area.width.saturating_sub(3) as usize; // 边框 + 滚动条

    let title = format!(
        " Sprintly │ {} │ {} ",
        phase_label(&state.phase),
        state.conversation
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let mut text_lines: Vec<Line> = Vec::new();
    for (idx, entry) in state.history.iter().enumerate() {
        if idx > 0 {
            text_lines.push(Line::from(Span::raw("")));
        }
        let (prefix, color) = match entry.role {
            LogRole::User => ("You ", Color::Cyan),
            LogRole::Assistant => ("AI  ", Color::Green),
        };
        if entry.loading {
            text_lines.push(Line::from(vec![
                Span::styled(prefix, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled("…", Style::default().fg(Color::DarkGray)),
            ]));
            continue;
        }
        let stamp = entry.timestamp.format("%H:%M").to_string();
        for (i, line) in wrap_text(&entry.content, content_width.saturating_sub(10).max(20))
            .into_iter()
            .enumerate()
        {
            let pref = if i == 0 { prefix } else { "    " };
            let mut spans = vec![
                Span::styled(pref, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::raw(line),
            ];
            if i == 0 {
                spans.push(Span::styled(
                    format!("  {stamp}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            text_lines.push(Line::from(spans));
        }
    }

    let inner = block.inner(conv_area);
    let content_height = inner.height as usize;
    let total_lines = text_lines.len();
    let scroll_offset = conversation_scroll.min(total_lines.saturating_sub(content_height));

    f.render_widget(block, conv_area);
    let paragraph = Paragraph::new(Text::from(text_lines))
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset as u16, 0));
    f.render_widget(paragraph, inner);

    if total_lines > content_height {
        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .position(scroll_offset)
            .viewport_content_length(content_height);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_symbol("█")
            .track_symbol(Some("░"));
        f.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
    }

    let input_prompt = if state.input_locked {
        " waiting for reply… "
    } else {
        " message "
    };
    let hint = " Enter send │ ↑↓ PgUp/PgDn scroll │ Ctrl+L clear │ Esc quit ";
    let input_block = Block::default()
        .title(input_prompt)
        .title_bottom(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let input = Paragraph::new(input_buffer)
        .block(input_block)
        .wrap(Wrap { trim: false })
        .style(if state.input_locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        });
    f.render_widget(input, chunks[1]);

    out.0 = total_lines;
    out.1 = content_height;
}
