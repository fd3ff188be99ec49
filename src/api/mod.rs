pub mod http;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::calendar::CalendarEvent;
use crate::model::lookup::{Developer, Project};
use crate::model::task::{Status, Task, TaskId, TaskPayload};

pub use http::HttpBoardApi;

pub type ApiResult<T> = Result<T, ApiError>;

/// The REST surface the board consumes.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn fetch_tasks(&self) -> ApiResult<Vec<Task>>;
    async fn fetch_projects(&self) -> ApiResult<Vec<Project>>;
    async fn fetch_developers(&self) -> ApiResult<Vec<Developer>>;
    /// Partial update of the status column only.
    async fn update_status(&self, task_id: TaskId, status: Status) -> ApiResult<()>;
    /// Full replace of every editable field.
    async fn replace_task(&self, task_id: TaskId, payload: &TaskPayload) -> ApiResult<()>;
    async fn delete_task(&self, task_id: TaskId) -> ApiResult<()>;
    /// Returns the new task's id when the backend reports one.
    async fn create_task(&self, payload: &TaskPayload) -> ApiResult<Option<TaskId>>;
    async fn create_calendar_event(&self, task_id: TaskId) -> ApiResult<Option<CalendarEvent>>;
}

#[cfg(test)]
pub mod mock;
