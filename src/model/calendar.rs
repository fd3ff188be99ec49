use serde::{Deserialize, Serialize};

use super::task::TaskId;

/// A calendar entry produced by the backend for a task. Only the task
/// reference is interpreted; the rest (summary, start, end, attendees) is
/// kept as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(rename = "taskID")]
    pub task_id: TaskId,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}
