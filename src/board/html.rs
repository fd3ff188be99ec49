use std::fmt::Write;

use super::view::{BoardView, CardView, ColumnView};
use crate::model::task::Status;
use crate::util::html::escape_html;

/// Render the board as the `kanbanContainer` markup: one `.kanban-column`
/// per status with a count badge and a `#column-<id>` card list.
pub fn render_board(view: &BoardView) -> String {
    let mut out = String::from("<div id=\"kanbanContainer\" class=\"kanban-container\">\n");
    for column in &view.columns {
        render_column(&mut out, column);
    }
    out.push_str("</div>\n");
    out
}

/// A standalone page wrapping `render_board`, used by `planny export`.
pub fn render_page(view: &BoardView, title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        render_board(view)
    )
}

fn render_column(out: &mut String, column: &ColumnView) {
    let status = column.status;
    let _ = write!(
        out,
        "<div class=\"kanban-column\">\n\
         <div class=\"kanban-column-header\"><span>{}</span><span class=\"badge\">{}</span></div>\n\
         <div class=\"kanban-cards\" id=\"column-{}\">\n",
        status.label(),
        column.count(),
        status.id()
    );
    for card in &column.cards {
        render_card(out, status, card);
    }
    out.push_str("</div>\n</div>\n");
}

fn render_card(out: &mut String, status: Status, card: &CardView) {
    let priority = match &card.priority {
        Some((label, severity)) => format!(
            "<span class=\"badge badge-dot\"><i class=\"{}\"></i> {}</span>",
            severity.css_class(),
            escape_html(label)
        ),
        None => card.priority_label().to_string(),
    };

    let _ = write!(
        out,
        "<div class=\"kanban-card {class}\" draggable=\"true\" data-task-id=\"{id}\">\n\
         <div class=\"kanban-card-title\">{title}</div>\n\
         <div class=\"kanban-card-description\">{description}</div>\n\
         <div class=\"kanban-card-meta\">\n\
         {project}{priority}{due}{assignee}\
         </div>\n\
         <div class=\"dropdown\"><div class=\"dropdown-menu\">\
         <a class=\"dropdown-item\" data-action=\"edit\" data-task-id=\"{id}\">Edit</a>\
         <a class=\"dropdown-item\" data-action=\"delete\" data-task-id=\"{id}\">Delete</a>\
         </div></div>\n\
         </div>\n",
        class = status.css_class(),
        id = card.task_id,
        title = escape_html(&card.title),
        description = escape_html(&card.description),
        project = meta_item("Project:", &escape_html(&card.project)),
        priority = meta_item("Priority:", &priority),
        due = meta_item("Due:", &escape_html(&card.due)),
        assignee = meta_item("Assigned:", &escape_html(&card.assignee)),
    );
}

fn meta_item(label: &str, value_html: &str) -> String {
    format!(
        "<div class=\"kanban-card-meta-item\"><span class=\"kanban-card-label\">{label}</span>\
         <span class=\"kanban-card-value\">{value_html}</span></div>\n"
    )
}
