//! In-memory stand-in for the backend used by controller and form tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ApiResult, BoardApi};
use crate::error::ApiError;
use crate::model::calendar::CalendarEvent;
use crate::model::lookup::{Developer, Project};
use crate::model::task::{ProjectId, Status, Task, TaskId, TaskPayload};

#[derive(Default)]
pub struct MockState {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub developers: Vec<Developer>,
    /// Every request in arrival order, e.g. `"PATCH 3"`.
    pub calls: Vec<String>,
    pub next_id: TaskId,
    pub fail_tasks: bool,
    pub fail_lookups: bool,
    pub fail_status_update: bool,
    pub fail_mutations: Option<String>,
    pub fail_calendar: bool,
    pub omit_created_id: bool,
    /// `fetch_tasks` never answers, like a request to a hung server.
    pub hang_tasks: bool,
}

#[derive(Clone, Default)]
pub struct MockApi {
    pub state: Arc<Mutex<MockState>>,
}

impl MockApi {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.tasks = tasks;
            state.next_id = next_id;
        }
        api
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn set(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.lock().unwrap());
    }

    fn record(&self, call: String) -> std::sync::MutexGuard<'_, MockState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

pub fn task(id: TaskId, title: &str, status_id: u32, project_id: ProjectId) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: None,
        status_id,
        priority: None,
        due_date: None,
        assigned_to: None,
        assigned_to_name: None,
        project_id,
        project_name: Some(format!("Project {project_id}")),
    }
}

fn server_error(message: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        message: message.to_string(),
    }
}

fn apply_payload(task: &mut Task, payload: &TaskPayload) {
    task.title = payload.title.clone();
    task.description = Some(payload.description.clone()).filter(|d| !d.is_empty());
    task.status_id = payload.status_id;
    task.due_date = payload.due_date;
    task.assigned_to = payload.assigned_to;
    task.project_id = payload.project_id;
    task.project_name = Some(format!("Project {}", payload.project_id));
    task.priority = payload.priority.clone();
}

#[async_trait]
impl BoardApi for MockApi {
    async fn fetch_tasks(&self) -> ApiResult<Vec<Task>> {
        let hang = self.record("GET tasks".into()).hang_tasks;
        if hang {
            std::future::pending::<()>().await;
        }
        let state = self.state.lock().unwrap();
        if state.fail_tasks {
            return Err(server_error("Failed to load tasks"));
        }
        Ok(state.tasks.clone())
    }

    async fn fetch_projects(&self) -> ApiResult<Vec<Project>> {
        let state = self.record("GET projects".into());
        if state.fail_lookups {
            return Err(server_error("Failed to load projects"));
        }
        Ok(state.projects.clone())
    }

    async fn fetch_developers(&self) -> ApiResult<Vec<Developer>> {
        let state = self.record("GET developers".into());
        if state.fail_lookups {
            return Err(server_error("Failed to load developers"));
        }
        Ok(state.developers.clone())
    }

    async fn update_status(&self, task_id: TaskId, status: Status) -> ApiResult<()> {
        let mut state = self.record(format!("PATCH {task_id}"));
        if state.fail_status_update {
            return Err(server_error("Failed to update task status"));
        }
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| server_error("Task not found"))?;
        task.status_id = status.id();
        Ok(())
    }

    async fn replace_task(&self, task_id: TaskId, payload: &TaskPayload) -> ApiResult<()> {
        let mut state = self.record(format!("PUT {task_id}"));
        if let Some(msg) = state.fail_mutations.clone() {
            return Err(server_error(&msg));
        }
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| server_error("Task not found"))?;
        apply_payload(task, payload);
        Ok(())
    }

    async fn delete_task(&self, task_id: TaskId) -> ApiResult<()> {
        let mut state = self.record(format!("DELETE {task_id}"));
        if let Some(msg) = state.fail_mutations.clone() {
            return Err(server_error(&msg));
        }
        state.tasks.retain(|t| t.id != task_id);
        Ok(())
    }

    async fn create_task(&self, payload: &TaskPayload) -> ApiResult<Option<TaskId>> {
        let mut state = self.record("POST tasks".into());
        if let Some(msg) = state.fail_mutations.clone() {
            return Err(server_error(&msg));
        }
        let id = state.next_id.max(1);
        state.next_id = id + 1;
        let mut created = task(id, "", 1, 0);
        apply_payload(&mut created, payload);
        state.tasks.push(created);
        Ok(if state.omit_created_id { None } else { Some(id) })
    }

    async fn create_calendar_event(&self, task_id: TaskId) -> ApiResult<Option<CalendarEvent>> {
        let state = self.record(format!("POST calendar {task_id}"));
        if state.fail_calendar {
            return Err(server_error("calendar backend down"));
        }
        let Some(task) = state.tasks.iter().find(|t| t.id == task_id) else {
            return Err(ApiError::Status {
                status: 404,
                message: "Task not found".into(),
            });
        };
        let Some(due) = task.due_date else {
            return Ok(None);
        };
        let mut details = serde_json::Map::new();
        details.insert("summary".into(), task.title.clone().into());
        details.insert(
            "start".into(),
            serde_json::json!({ "date": due.to_string() }),
        );
        Ok(Some(CalendarEvent { task_id, details }))
    }
}
