pub mod form;
pub mod html;
pub mod view;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::{ApiResult, BoardApi};
use crate::model::lookup::{Developer, Project};
use crate::model::task::{ProjectId, Status, Task, TaskId};
use view::BoardView;

pub const LOAD_ERROR: &str = "Failed to load tasks. Please refresh the page.";

/// An optimistic column move waiting on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub task_id: TaskId,
    pub from: u32,
    pub to: Status,
}

/// Board state for one session: the last fetched task list, lookup data
/// for the forms and filter, and the card currently being dragged.
pub struct Board {
    api: Arc<dyn BoardApi>,
    tasks: Vec<Task>,
    projects: Vec<Project>,
    developers: Vec<Developer>,
    project_filter: Option<ProjectId>,
    dragged: Option<TaskId>,
    load_error: Option<String>,
}

/// Results of the three startup fetches, applied together.
#[derive(Debug)]
pub struct Snapshot {
    pub tasks: ApiResult<Vec<Task>>,
    pub projects: ApiResult<Vec<Project>>,
    pub developers: ApiResult<Vec<Developer>>,
}

pub async fn fetch_snapshot(api: &dyn BoardApi) -> Snapshot {
    let (tasks, projects, developers) = tokio::join!(
        api.fetch_tasks(),
        api.fetch_projects(),
        api.fetch_developers()
    );
    Snapshot {
        tasks,
        projects,
        developers,
    }
}

/// Tasks belonging to `project`, or all of them when no project is given.
pub fn filter_by_project(tasks: &[Task], project: Option<ProjectId>) -> Vec<&Task> {
    match project {
        None => tasks.iter().collect(),
        Some(id) => tasks.iter().filter(|t| t.project_id == id).collect(),
    }
}

impl Board {
    pub fn new(api: Arc<dyn BoardApi>) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            projects: Vec::new(),
            developers: Vec::new(),
            project_filter: None,
            dragged: None,
            load_error: None,
        }
    }

    pub fn api(&self) -> Arc<dyn BoardApi> {
        self.api.clone()
    }

    /// Initial load: tasks, projects and developers fetched concurrently.
    pub async fn load(&mut self) {
        let api = self.api.clone();
        let snapshot = fetch_snapshot(api.as_ref()).await;
        self.apply_snapshot(snapshot);
    }

    /// Lookup failures leave the dropdown data empty; only a task failure
    /// is reported on the page.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.apply_tasks(snapshot.tasks);
        match snapshot.projects {
            Ok(projects) => self.projects = projects,
            Err(e) => warn!(error = %e, "failed to load projects"),
        }
        match snapshot.developers {
            Ok(developers) => self.developers = developers,
            Err(e) => warn!(error = %e, "failed to load developers"),
        }
    }

    /// Re-fetch the task list and replace the cache. Returns `false` when the
    /// fetch failed and the previous cache was kept.
    pub async fn reload(&mut self) -> bool {
        let result = self.api.fetch_tasks().await;
        self.apply_tasks(result)
    }

    pub fn apply_tasks(&mut self, result: ApiResult<Vec<Task>>) -> bool {
        match result {
            Ok(tasks) => {
                info!(count = tasks.len(), "board loaded");
                self.tasks = tasks;
                self.load_error = None;
                true
            }
            Err(e) => {
                error!(error = %e, "failed to load tasks");
                self.load_error = Some(LOAD_ERROR.to_string());
                false
            }
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn developers(&self) -> &[Developer] {
        &self.developers
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn project_filter(&self) -> Option<ProjectId> {
        self.project_filter
    }

    pub fn project_name(&self, id: ProjectId) -> Option<&str> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }

    pub fn set_project_filter(&mut self, project: Option<ProjectId>) {
        self.project_filter = project;
    }

    /// Step the filter through "all", then each known project, then back.
    pub fn cycle_project_filter(&mut self) {
        let next = match self.project_filter {
            None => self.projects.first().map(|p| p.id),
            Some(current) => self
                .projects
                .iter()
                .position(|p| p.id == current)
                .and_then(|i| self.projects.get(i + 1))
                .map(|p| p.id),
        };
        self.project_filter = next;
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter_by_project(&self.tasks, self.project_filter)
    }

    pub fn view(&self) -> BoardView {
        view::build(self.visible_tasks())
    }

    pub fn dragged(&self) -> Option<TaskId> {
        self.dragged
    }

    pub fn drag_start(&mut self, task_id: TaskId) -> bool {
        if self.task(task_id).is_none() {
            return false;
        }
        self.dragged = Some(task_id);
        true
    }

    pub fn drag_end(&mut self) {
        self.dragged = None;
    }

    /// Drop the dragged card on `status`. Moves the cached task right away so
    /// the next render shows it in its new column; the caller sends the
    /// update and then calls `settle_status_change`. No-op without a drag.
    pub fn drop_on(&mut self, status: Status) -> Option<StatusChange> {
        let task_id = self.dragged.take()?;
        let task = self.tasks.iter_mut().find(|t| t.id == task_id)?;
        let change = StatusChange {
            task_id,
            from: task.status_id,
            to: status,
        };
        task.status_id = status.id();
        Some(change)
    }

    /// Log the outcome of a status change. The caller reloads either way,
    /// so a failed update reverts to server state.
    pub fn settle_status_change(&self, change: StatusChange, result: &ApiResult<()>) {
        match result {
            Ok(()) => info!(task_id = change.task_id, to = %change.to, "task status updated"),
            Err(e) => warn!(
                task_id = change.task_id,
                to = %change.to,
                error = %e,
                "status update failed; reloading board"
            ),
        }
    }

    /// Whole move in one call: optimistic move, awaited update, reload.
    pub async fn move_task(&mut self, task_id: TaskId, status: Status) -> ApiResult<()> {
        let change = if self.drag_start(task_id) {
            self.drop_on(status)
        } else {
            None
        };
        let result = self.api.update_status(task_id, status).await;
        if let Some(change) = change {
            self.settle_status_change(change, &result);
        }
        self.reload().await;
        result
    }

    /// Confirmation text for deleting `task_id`, `None` if it isn't cached.
    pub fn delete_prompt(&self, task_id: TaskId) -> Option<String> {
        self.task(task_id).map(|t| {
            format!(
                "Are you sure you want to delete the task \"{}\"?\n\nThis action cannot be undone.",
                t.title
            )
        })
    }

    /// Log the outcome of a delete. Only a successful delete calls for a
    /// reload; on failure the board is left untouched.
    pub fn settle_delete(&self, task_id: TaskId, result: &ApiResult<()>) -> bool {
        match result {
            Ok(()) => {
                info!(task_id, "task deleted");
                true
            }
            Err(e) => {
                warn!(task_id, error = %e, "delete failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{task, MockApi};
    use crate::board::form::{submit, FormMode, TaskForm};
    use crate::calendar::{mirror_task, CalendarLog};

    fn seeded() -> (MockApi, Board) {
        let api = MockApi::with_tasks(vec![
            task(1, "Design", 1, 10),
            task(2, "Build", 2, 10),
            task(3, "Fix crash", 3, 20),
            task(4, "QA pass", 4, 20),
            task(5, "Release", 5, 30),
        ]);
        api.set(|s| {
            s.projects = vec![
                Project { id: 10, name: "Web".into() },
                Project { id: 20, name: "Mobile".into() },
                Project { id: 30, name: "Ops".into() },
            ];
            s.developers = vec![Developer {
                id: 1,
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: String::new(),
            }];
        });
        let board = Board::new(Arc::new(api.clone()));
        (api, board)
    }

    #[tokio::test]
    async fn load_fetches_everything() {
        let (api, mut board) = seeded();
        board.load().await;

        assert_eq!(board.tasks().len(), 5);
        assert_eq!(board.projects().len(), 3);
        assert_eq!(board.developers()[0].full_name(), "Ada Lovelace");
        assert!(board.load_error().is_none());
        let mut calls = api.calls();
        calls.sort();
        assert_eq!(calls, vec!["GET developers", "GET projects", "GET tasks"]);
    }

    #[tokio::test]
    async fn lookup_failure_degrades_silently() {
        let (api, mut board) = seeded();
        api.set(|s| s.fail_lookups = true);
        board.load().await;

        assert_eq!(board.tasks().len(), 5);
        assert!(board.projects().is_empty());
        assert!(board.developers().is_empty());
        assert!(board.load_error().is_none());
    }

    #[tokio::test]
    async fn task_failure_reports_and_keeps_cache() {
        let (api, mut board) = seeded();
        board.load().await;
        api.set(|s| s.fail_tasks = true);

        assert!(!board.reload().await);
        assert_eq!(board.load_error(), Some(LOAD_ERROR));
        assert_eq!(board.tasks().len(), 5);

        api.set(|s| s.fail_tasks = false);
        assert!(board.reload().await);
        assert!(board.load_error().is_none());
    }

    #[test]
    fn filter_returns_exact_project_subset() {
        let tasks = vec![task(1, "a", 1, 10), task(2, "b", 2, 20), task(3, "c", 3, 10)];
        let web: Vec<TaskId> = filter_by_project(&tasks, Some(10)).iter().map(|t| t.id).collect();
        assert_eq!(web, vec![1, 3]);
        assert!(filter_by_project(&tasks, Some(99)).is_empty());
        let all: Vec<TaskId> = filter_by_project(&tasks, None).iter().map(|t| t.id).collect();
        assert_eq!(all, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn filter_does_not_refetch() {
        let (api, mut board) = seeded();
        board.load().await;
        let before = api.calls().len();

        board.set_project_filter(Some(20));
        let view = board.view();
        assert_eq!(view.total(), 2);
        assert_eq!(view.status_of(3), Some(Status::BugReport));
        assert_eq!(api.calls().len(), before);

        board.set_project_filter(None);
        assert_eq!(board.view().total(), 5);
    }

    #[tokio::test]
    async fn filter_survives_reload() {
        let (_api, mut board) = seeded();
        board.load().await;
        board.set_project_filter(Some(30));
        board.reload().await;
        assert_eq!(board.view().total(), 1);
    }

    #[tokio::test]
    async fn cycle_walks_projects_then_all() {
        let (_api, mut board) = seeded();
        board.load().await;

        let mut seen = Vec::new();
        for _ in 0..4 {
            board.cycle_project_filter();
            seen.push(board.project_filter());
        }
        assert_eq!(seen, vec![Some(10), Some(20), Some(30), None]);
    }

    #[tokio::test]
    async fn drop_without_drag_is_noop() {
        let (api, mut board) = seeded();
        board.load().await;
        let before = api.calls().len();

        assert_eq!(board.drop_on(Status::Complete), None);
        assert_eq!(board.view().status_of(1), Some(Status::ToDo));
        assert_eq!(api.calls().len(), before);
    }

    #[tokio::test]
    async fn drag_end_clears_reference() {
        let (_api, mut board) = seeded();
        board.load().await;
        assert!(board.drag_start(2));
        board.drag_end();
        assert_eq!(board.dragged(), None);
        assert_eq!(board.drop_on(Status::Testing), None);
        assert!(!board.drag_start(999));
    }

    #[tokio::test]
    async fn drop_moves_card_before_backend_answers() {
        let (api, mut board) = seeded();
        board.load().await;

        board.drag_start(1);
        let change = board.drop_on(Status::Testing).unwrap();
        assert_eq!(change.from, 1);
        assert_eq!(board.dragged(), None);

        let view = board.view();
        assert_eq!(view.status_of(1), Some(Status::Testing));
        assert_eq!(view.column(Status::ToDo).count(), 0);
        assert_eq!(view.column(Status::Testing).count(), 2);
        // the backend still has the old status
        assert_eq!(api.state.lock().unwrap().tasks[0].status_id, 1);
    }

    #[tokio::test]
    async fn successful_update_follows_server_status() {
        let (api, mut board) = seeded();
        board.load().await;

        board.drag_start(1);
        let change = board.drop_on(Status::Testing).unwrap();
        let result = api.update_status(change.task_id, change.to).await;
        // another client moves it again before our reload
        api.set(|s| s.tasks[0].status_id = Status::Complete.id());
        board.settle_status_change(change, &result);
        board.reload().await;

        assert_eq!(board.view().status_of(1), Some(Status::Complete));
    }

    #[tokio::test]
    async fn failed_update_reverts_to_server_state() {
        let (api, mut board) = seeded();
        board.load().await;
        api.set(|s| s.fail_status_update = true);

        let result = board.move_task(2, Status::Complete).await;
        assert!(result.is_err());
        let view = board.view();
        assert_eq!(view.status_of(2), Some(Status::InProgress));
        assert_eq!(view.column(Status::Complete).count(), 1);
    }

    #[tokio::test]
    async fn move_task_persists_and_reloads() {
        let (api, mut board) = seeded();
        board.load().await;

        board.move_task(3, Status::Complete).await.unwrap();
        assert_eq!(board.view().status_of(3), Some(Status::Complete));
        let calls = api.calls();
        assert_eq!(&calls[calls.len() - 2..], &["PATCH 3", "GET tasks"]);
    }

    #[tokio::test]
    async fn delete_removes_task_from_next_render() {
        let (api, mut board) = seeded();
        board.load().await;

        let prompt = board.delete_prompt(4).unwrap();
        assert!(prompt.contains("\"QA pass\""));
        assert!(prompt.contains("cannot be undone"));

        let result = api.delete_task(4).await;
        assert!(board.settle_delete(4, &result));
        board.reload().await;
        assert_eq!(board.view().status_of(4), None);
        assert_eq!(board.tasks().len(), 4);
        assert!(api.calls().contains(&"DELETE 4".to_string()));
    }

    #[tokio::test]
    async fn failed_delete_keeps_board() {
        let (api, mut board) = seeded();
        board.load().await;
        api.set(|s| s.fail_mutations = Some("Task is locked".into()));

        let result = api.delete_task(4).await;
        assert!(!board.settle_delete(4, &result));
        assert_eq!(result.unwrap_err().display_message(), "Task is locked");
        assert_eq!(board.tasks().len(), 5);
    }

    #[tokio::test]
    async fn calendar_failure_does_not_hide_new_task() {
        let (api, mut board) = seeded();
        board.load().await;
        api.set(|s| s.fail_calendar = true);
        let dir = tempfile::tempdir().unwrap();
        let log = CalendarLog::new(dir.path().join("events.json"));

        let form = TaskForm {
            title: "Brand new".into(),
            status: "1".into(),
            project: "10".into(),
            due_date: "2025-10-01".into(),
            ..Default::default()
        };
        let done = submit(&api, FormMode::Create, &form).await.unwrap();
        let id = done.task_id.unwrap();
        assert!(mirror_task(&api, &log, id).await.is_err());

        board.reload().await;
        assert_eq!(board.view().status_of(id), Some(Status::ToDo));
        assert!(log.load().await.is_empty());
    }
}
