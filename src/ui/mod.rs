pub mod board;
pub mod confirm;
pub mod footer;
pub mod task_form;
pub mod theme;

use ratatui::{
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, ViewMode};

pub fn render(f: &mut Frame, app: &App) {
    let size = f.area();

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(6),    // board
            Constraint::Length(1), // footer
        ])
        .split(size);

    render_header(f, vertical[0], app);
    board::render(f, vertical[1], app);
    footer::render(f, vertical[2], app);

    match &app.view_mode {
        ViewMode::Board => {}
        ViewMode::Form(state) => {
            task_form::render(f, centered(size, 60, 18), app, state);
        }
        ViewMode::ConfirmDelete { prompt, .. } => {
            confirm::render(f, centered(size, 50, 8), prompt);
        }
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let filter = match app.board.project_filter() {
        Some(id) => app.board.project_name(id).unwrap_or("unknown project").to_string(),
        None => "All projects".to_string(),
    };
    let mut spans = vec![
        Span::styled(" Planny ", Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(filter, Style::default().fg(Color::Gray)),
    ];
    if let Some(err) = app.board.load_error() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(err, Style::default().fg(Color::Red)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}
