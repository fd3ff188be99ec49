use crate::model::task::{Severity, Status, Task, TaskId};

pub const NO_DESCRIPTION: &str = "No description";
pub const NO_PRIORITY: &str = "None";
pub const NO_DUE_DATE: &str = "No date";
pub const UNASSIGNED: &str = "Unassigned";

/// Display-ready snapshot of the board: five columns in status order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub status: Status,
    pub cards: Vec<CardView>,
}

impl ColumnView {
    pub fn count(&self) -> usize {
        self.cards.len()
    }
}

/// One card with every fallback already applied. Text is unescaped; each
/// output format escapes for itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub task_id: TaskId,
    pub title: String,
    pub description: String,
    pub project: String,
    pub priority: Option<(String, Severity)>,
    pub due: String,
    pub assignee: String,
}

impl CardView {
    pub fn from_task(task: &Task) -> Self {
        Self {
            task_id: task.id,
            title: task.title.clone(),
            description: non_empty(task.description.as_deref())
                .unwrap_or(NO_DESCRIPTION)
                .to_string(),
            project: task.project_name.clone().unwrap_or_default(),
            priority: non_empty(task.priority.as_deref())
                .map(|p| (p.to_string(), Severity::of(p))),
            due: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| NO_DUE_DATE.to_string()),
            assignee: non_empty(task.assigned_to_name.as_deref())
                .unwrap_or(UNASSIGNED)
                .to_string(),
        }
    }

    pub fn priority_label(&self) -> &str {
        self.priority.as_ref().map(|(p, _)| p.as_str()).unwrap_or(NO_PRIORITY)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}

/// Partition `tasks` into the five status columns, keeping input order
/// within each column. Tasks with an unknown status code are left out.
pub fn build<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> BoardView {
    let mut columns: Vec<ColumnView> = Status::ALL
        .iter()
        .map(|&status| ColumnView {
            status,
            cards: Vec::new(),
        })
        .collect();

    for task in tasks {
        if let Some(status) = task.status() {
            columns[status.index()].cards.push(CardView::from_task(task));
        }
    }

    BoardView { columns }
}

impl BoardView {
    pub fn column(&self, status: Status) -> &ColumnView {
        &self.columns[status.index()]
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(ColumnView::count).sum()
    }

    /// Column currently holding `task_id`, if rendered.
    pub fn status_of(&self, task_id: TaskId) -> Option<Status> {
        self.columns
            .iter()
            .find(|c| c.cards.iter().any(|card| card.task_id == task_id))
            .map(|c| c.status)
    }
}
