use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::app::App;
use crate::board::view::{CardView, ColumnView};
use crate::ui::theme::{severity_color, status_color};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let view = app.board.view();
    let areas = Layout::horizontal([Constraint::Ratio(1, 5); 5]).split(area);

    for (i, column) in view.columns.iter().enumerate() {
        render_column(f, areas[i], app, column, i == app.selected_column);
    }
}

fn render_column(f: &mut Frame, area: Rect, app: &App, column: &ColumnView, active: bool) {
    let color = status_color(column.status);
    let dragging = app.board.dragged().is_some();

    let border_style = if active && dragging {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else if active {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = column
        .cards
        .iter()
        .map(|card| ListItem::new(card_text(card, app.board.dragged() == Some(card.task_id), width)))
        .collect();

    let title = Line::from(vec![
        Span::styled(format!(" {} ", column.status.label()), Style::default().fg(color)),
        Span::styled(format!("({}) ", column.count()), Style::default().fg(Color::Gray)),
    ]);

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::Rgb(0x26, 0x32, 0x38)));

    let mut state = ListState::default();
    if active && !column.cards.is_empty() {
        state.select(Some(app.selected_card));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn card_text(card: &CardView, dragged: bool, width: usize) -> Text<'static> {
    let mut title_spans = Vec::new();
    if dragged {
        title_spans.push(Span::styled("⇄ ", Style::default().fg(Color::Yellow)));
    }
    title_spans.push(Span::styled(
        truncate(&card.title, width),
        Style::default().add_modifier(Modifier::BOLD),
    ));

    let priority = match &card.priority {
        Some((label, severity)) => Span::styled(
            format!("● {label}"),
            Style::default().fg(severity_color(*severity)),
        ),
        None => Span::raw(card.priority_label().to_string()),
    };

    Text::from(vec![
        Line::from(title_spans),
        Line::styled(truncate(&card.description, width), Style::default().fg(Color::Gray)),
        meta("Project", Span::raw(truncate(&card.project, width))),
        meta("Priority", priority),
        meta("Due", Span::raw(card.due.clone())),
        meta("Assigned", Span::raw(truncate(&card.assignee, width))),
        Line::raw(""),
    ])
}

fn meta(label: &str, value: Span<'static>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
        value,
    ])
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
