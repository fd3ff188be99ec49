use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FormState};
use crate::board::form::FormField;

pub fn render(f: &mut Frame, area: Rect, app: &App, state: &FormState) {
    let mut lines: Vec<Line> = Vec::new();

    for (i, field) in FormField::ALL.iter().enumerate() {
        let focused = i == state.focus;
        let value = state.form.value(*field);
        let shown = if field.is_text() {
            let mut v = value.to_string();
            if focused {
                v.push('▏');
            }
            v
        } else {
            format!("‹ {} ›", app.option_label(*field, value))
        };

        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", field.label()), label_style),
            Span::raw(shown),
        ]));

        if let Some(err) = state.error.as_ref().filter(|e| e.field == *field) {
            lines.push(Line::styled(
                format!("{:<12}{}", "", err.message),
                Style::default().fg(Color::Red),
            ));
        }
    }

    lines.push(Line::raw(""));
    if state.loading {
        lines.push(Line::styled("Saving…", Style::default().fg(Color::Cyan)));
    } else if state.success {
        lines.push(Line::styled(
            "Task saved successfully",
            Style::default().fg(Color::Green),
        ));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(state.title()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}
