use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{ApiResult, BoardApi};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::model::calendar::CalendarEvent;
use crate::model::lookup::{Developer, Project};
use crate::model::task::{Status, Task, TaskId, TaskPayload};
use crate::util::cookie::get_cookie;

const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "x-csrftoken";

pub struct HttpBoardApi {
    base_url: String,
    client: reqwest::Client,
    cookie: Option<String>,
    csrf_token: Option<String>,
}

impl HttpBoardApi {
    pub fn new(base_url: impl Into<String>, cookie: Option<String>) -> Self {
        let csrf_token = cookie.as_deref().and_then(|c| get_cookie(c, CSRF_COOKIE));
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            cookie,
            csrf_token,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.base_url.clone(), config.cookie.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(cookie) = self.cookie.as_deref().and_then(|c| HeaderValue::from_str(c).ok()) {
            headers.insert(COOKIE, cookie);
        }
        if let Some(token) = self
            .csrf_token
            .as_deref()
            .and_then(|t| HeaderValue::from_str(t).ok())
        {
            headers.insert(CSRF_HEADER, token);
        }
        headers
    }

    async fn send(&self, request: RequestBuilder, fallback: &str) -> ApiResult<Response> {
        let resp = request
            .headers(self.headers())
            .send()
            .await
            .map_err(ApiError::Transport)?;
        check_status(resp, fallback).await
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Turn a non-2xx response into `ApiError::Status`, preferring the body's
/// `error` field over `fallback`.
async fn check_status(resp: Response, fallback: &str) -> ApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string());
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
    let bytes = resp.bytes().await.map_err(ApiError::Transport)?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

#[derive(Deserialize)]
struct TasksEnvelope {
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
struct ProjectsEnvelope {
    projects: Vec<Project>,
}

#[derive(Deserialize)]
struct DevelopersEnvelope {
    developers: Vec<Developer>,
}

#[derive(Deserialize)]
struct CreatedEnvelope {
    #[serde(rename = "taskID")]
    task_id: Option<TaskId>,
}

#[derive(Deserialize)]
struct EventEnvelope {
    event: Option<CalendarEvent>,
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn fetch_tasks(&self) -> ApiResult<Vec<Task>> {
        let resp = self
            .send(self.client.get(self.url("/api/kanban-tasks/")), "Failed to load tasks")
            .await?;
        let envelope: TasksEnvelope = decode(resp).await?;
        debug!(count = envelope.tasks.len(), "fetched tasks");
        Ok(envelope.tasks)
    }

    async fn fetch_projects(&self) -> ApiResult<Vec<Project>> {
        let resp = self
            .send(self.client.get(self.url("/api/projects/")), "Failed to load projects")
            .await?;
        let envelope: ProjectsEnvelope = decode(resp).await?;
        Ok(envelope.projects)
    }

    async fn fetch_developers(&self) -> ApiResult<Vec<Developer>> {
        let resp = self
            .send(
                self.client.get(self.url("/api/developers/")),
                "Failed to load developers",
            )
            .await?;
        let envelope: DevelopersEnvelope = decode(resp).await?;
        Ok(envelope.developers)
    }

    async fn update_status(&self, task_id: TaskId, status: Status) -> ApiResult<()> {
        let body = serde_json::json!({ "statusID": status.id() });
        self.send(
            self.client
                .patch(self.url(&format!("/api/kanban-tasks/{task_id}/")))
                .json(&body),
            "Failed to update task status",
        )
        .await?;
        Ok(())
    }

    async fn replace_task(&self, task_id: TaskId, payload: &TaskPayload) -> ApiResult<()> {
        self.send(
            self.client
                .put(self.url(&format!("/api/kanban-tasks/{task_id}/")))
                .json(payload),
            "Failed to update task",
        )
        .await?;
        Ok(())
    }

    async fn delete_task(&self, task_id: TaskId) -> ApiResult<()> {
        self.send(
            self.client
                .delete(self.url(&format!("/api/kanban-tasks/{task_id}/"))),
            "Failed to delete task",
        )
        .await?;
        Ok(())
    }

    async fn create_task(&self, payload: &TaskPayload) -> ApiResult<Option<TaskId>> {
        let resp = self
            .send(
                self.client.post(self.url("/api/kanban-tasks/")).json(payload),
                "Failed to create task",
            )
            .await?;
        let created: CreatedEnvelope = decode(resp).await?;
        Ok(created.task_id)
    }

    async fn create_calendar_event(&self, task_id: TaskId) -> ApiResult<Option<CalendarEvent>> {
        let body = serde_json::json!({ "taskID": task_id });
        let resp = self
            .send(
                self.client.post(self.url("/api/calendar-event/")).json(&body),
                "Failed to create calendar event",
            )
            .await?;
        let envelope: EventEnvelope = decode(resp).await?;
        Ok(envelope.event)
    }
}
