use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, ViewMode};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();

    match &app.view_mode {
        ViewMode::Board if app.board.dragged().is_some() => {
            spans.push(hint("←→", "target column"));
            spans.push(hint("space", "drop"));
            spans.push(hint("esc", "cancel"));
        }
        ViewMode::Board => {
            spans.push(hint("←→↑↓", "navigate"));
            spans.push(hint("space", "move"));
            spans.push(hint("n", "new"));
            spans.push(hint("e", "edit"));
            spans.push(hint("x", "delete"));
            spans.push(hint("p", "project"));
            spans.push(hint("r", "reload"));
            spans.push(hint("q", "quit"));
        }
        ViewMode::Form(_) => {
            spans.push(hint("tab", "next field"));
            spans.push(hint("←→", "change"));
            spans.push(hint("enter", "save"));
            spans.push(hint("esc", "close"));
        }
        ViewMode::ConfirmDelete { .. } => {
            spans.push(hint("y", "delete"));
            spans.push(hint("n", "keep"));
        }
    }

    if app.loading() {
        spans.push(Span::styled(" loading… ", Style::default().fg(Color::Cyan)));
    }

    // Flash message
    if let Some((msg, _)) = &app.flash_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans));
    f.render_widget(paragraph, area);
}

fn hint(key: &str, desc: &str) -> Span<'static> {
    Span::styled(
        format!(" {key}:{desc} "),
        Style::default().fg(Color::DarkGray),
    )
}
