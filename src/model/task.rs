use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TaskId = i64;
pub type ProjectId = i64;
pub type DeveloperId = i64;

/// The five board columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    ToDo,
    InProgress,
    BugReport,
    Testing,
    Complete,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::ToDo,
        Status::InProgress,
        Status::BugReport,
        Status::Testing,
        Status::Complete,
    ];

    pub fn id(&self) -> u32 {
        match self {
            Status::ToDo => 1,
            Status::InProgress => 2,
            Status::BugReport => 3,
            Status::Testing => 4,
            Status::Complete => 5,
        }
    }

    pub fn from_id(id: u32) -> Option<Status> {
        Status::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::ToDo => "To-Do",
            Status::InProgress => "In Progress",
            Status::BugReport => "Bug Report",
            Status::Testing => "Testing",
            Status::Complete => "Complete",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Status::ToDo => "status-todo",
            Status::InProgress => "status-in-progress",
            Status::BugReport => "status-bug-report",
            Status::Testing => "status-testing",
            Status::Complete => "status-complete",
        }
    }

    /// Position in `ALL`, used as the column index.
    pub fn index(&self) -> usize {
        self.id() as usize - 1
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Selectable priority values offered by the task forms.
pub const PRIORITIES: [&str; 3] = ["Low", "Medium", "High"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
    Other,
}

impl Severity {
    pub fn of(priority: &str) -> Severity {
        match priority {
            "High" => Severity::High,
            "Medium" => Severity::Medium,
            "Low" => Severity::Low,
            _ => Severity::Other,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Severity::High => "bg-danger",
            Severity::Medium => "bg-warning",
            Severity::Low => "bg-info",
            Severity::Other => "bg-secondary",
        }
    }
}

/// A task as returned by `GET /api/kanban-tasks/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "taskID")]
    pub id: TaskId,
    #[serde(rename = "taskTitle")]
    pub title: String,
    #[serde(rename = "taskDescription", default)]
    pub description: Option<String>,
    #[serde(rename = "statusID")]
    pub status_id: u32,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(rename = "dueDate", default)]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "assignedTo", default)]
    pub assigned_to: Option<DeveloperId>,
    #[serde(rename = "assignedToName", default)]
    pub assigned_to_name: Option<String>,
    #[serde(rename = "projectID")]
    pub project_id: ProjectId,
    #[serde(rename = "projectName", default)]
    pub project_name: Option<String>,
}

impl Task {
    /// `None` when the backend reports a status code outside the board.
    pub fn status(&self) -> Option<Status> {
        Status::from_id(self.status_id)
    }
}

/// Full-replace request body for create and edit. Absent optional fields are
/// sent as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    #[serde(rename = "taskTitle")]
    pub title: String,
    #[serde(rename = "taskDescription")]
    pub description: String,
    #[serde(rename = "statusID")]
    pub status_id: u32,
    #[serde(rename = "dueDate")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<DeveloperId>,
    #[serde(rename = "projectID")]
    pub project_id: ProjectId,
    pub priority: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ids_round_trip_in_display_order() {
        let ids: Vec<u32> = Status::ALL.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        for s in Status::ALL {
            assert_eq!(Status::from_id(s.id()), Some(s));
        }
        assert_eq!(Status::from_id(0), None);
        assert_eq!(Status::from_id(6), None);
    }

    #[test]
    fn status_labels_and_classes() {
        assert_eq!(Status::BugReport.label(), "Bug Report");
        assert_eq!(Status::InProgress.css_class(), "status-in-progress");
        assert_eq!(Status::Complete.index(), 4);
    }

    #[test]
    fn severity_classification() {
        assert_eq!(Severity::of("High").css_class(), "bg-danger");
        assert_eq!(Severity::of("Medium").css_class(), "bg-warning");
        assert_eq!(Severity::of("Low").css_class(), "bg-info");
        assert_eq!(Severity::of("Urgent"), Severity::Other);
        assert_eq!(Severity::of("high"), Severity::Other);
    }

    #[test]
    fn deserializes_backend_task_with_nulls() {
        let json = r#"{
            "taskID": 7,
            "taskTitle": "Write docs",
            "taskDescription": null,
            "statusID": 2,
            "dueDate": "2025-03-14",
            "projectID": 3,
            "projectName": "Website",
            "assignedTo": null,
            "assignedToName": null
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.status(), Some(Status::InProgress));
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 3, 14));
        assert_eq!(task.description, None);
        assert_eq!(task.priority, None);
        assert_eq!(task.assigned_to, None);
    }

    #[test]
    fn unknown_status_has_no_column() {
        let json = r#"{"taskID":1,"taskTitle":"x","statusID":9,"projectID":1}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status(), None);
    }

    #[test]
    fn payload_sends_explicit_nulls() {
        let payload = TaskPayload {
            title: "T".into(),
            description: String::new(),
            status_id: 1,
            due_date: None,
            assigned_to: None,
            project_id: 4,
            priority: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["dueDate"].is_null());
        assert!(value["assignedTo"].is_null());
        assert!(value["priority"].is_null());
        assert_eq!(value["projectID"], 4);
        assert_eq!(value["statusID"], 1);
    }
}
