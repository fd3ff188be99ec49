use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::ApiResult;
use crate::board::form::{self, FormError, FormField, FormMode, Submitted, TaskForm};
use crate::board::{self, Board, Snapshot, StatusChange};
use crate::calendar::{self, CalendarLog};
use crate::event::KeyAction;
use crate::model::task::{Status, Task, TaskId, PRIORITIES};

/// How long the success notice stays up before the modal closes.
pub const SUCCESS_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug)]
pub enum Action {
    Key(KeyAction),
    Tick,
    Loaded(Snapshot),
    TasksLoaded(ApiResult<Vec<Task>>),
    StatusUpdateFinished(StatusChange, ApiResult<()>),
    DeleteFinished(TaskId, ApiResult<()>),
    SubmitFinished(FormMode, Result<Submitted, FormError>),
    ModalSettled(FormMode),
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub mode: FormMode,
    pub form: TaskForm,
    pub focus: usize,
    pub error: Option<FormError>,
    pub loading: bool,
    pub success: bool,
}

impl FormState {
    fn new(mode: FormMode, form: TaskForm) -> Self {
        Self {
            mode,
            form,
            focus: 0,
            error: None,
            loading: false,
            success: false,
        }
    }

    pub fn focused(&self) -> FormField {
        FormField::ALL[self.focus]
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => " New Task ",
            FormMode::Edit(_) => " Edit Task ",
        }
    }

    fn busy(&self) -> bool {
        self.loading || self.success
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewMode {
    Board,
    Form(FormState),
    ConfirmDelete { task_id: TaskId, prompt: String },
}

pub struct App {
    pub board: Board,
    pub view_mode: ViewMode,
    pub selected_column: usize,
    pub selected_card: usize,
    pending_fetches: usize,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
    pub action_tx: mpsc::UnboundedSender<Action>,
    calendar: Arc<CalendarLog>,
}

impl App {
    pub fn new(
        board: Board,
        calendar: CalendarLog,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            board,
            view_mode: ViewMode::Board,
            selected_column: 0,
            selected_card: 0,
            pending_fetches: 0,
            flash_message: None,
            should_quit: false,
            action_tx,
            calendar: Arc::new(calendar),
        }
    }

    /// Start the initial fetch. The results come back as `Action::Loaded`.
    pub fn load(&mut self) {
        self.pending_fetches += 1;
        let api = self.board.api();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let snapshot = board::fetch_snapshot(api.as_ref()).await;
            let _ = tx.send(Action::Loaded(snapshot));
        });
    }

    fn reload(&mut self) {
        self.pending_fetches += 1;
        let api = self.board.api();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_tasks().await;
            let _ = tx.send(Action::TasksLoaded(result));
        });
    }

    /// True while any board fetch is still in flight.
    pub fn loading(&self) -> bool {
        self.pending_fetches > 0
    }

    fn fetch_finished(&mut self) {
        self.pending_fetches = self.pending_fetches.saturating_sub(1);
        self.clamp_selection();
    }

    pub fn update(&mut self, action: Action) {
        // Clear flash message after 3 seconds
        if let Some((_, t)) = &self.flash_message {
            if t.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }

        match action {
            Action::Key(key) => self.handle_key(key),
            Action::Tick => {}
            Action::Loaded(snapshot) => {
                self.board.apply_snapshot(snapshot);
                self.fetch_finished();
            }
            Action::TasksLoaded(result) => {
                self.board.apply_tasks(result);
                self.fetch_finished();
            }
            Action::StatusUpdateFinished(change, result) => {
                self.board.settle_status_change(change, &result);
                self.reload();
            }
            Action::DeleteFinished(task_id, result) => {
                if self.board.settle_delete(task_id, &result) {
                    self.flash("Task deleted");
                    self.reload();
                } else if let Err(e) = result {
                    self.flash(format!("Error deleting task: {}", e.display_message()));
                }
            }
            Action::SubmitFinished(mode, result) => self.handle_submitted(mode, result),
            Action::ModalSettled(mode) => {
                // The form may already be gone (closed with esc); the board
                // still needs the saved task.
                if matches!(&self.view_mode, ViewMode::Form(s) if s.mode == mode && s.success) {
                    self.view_mode = ViewMode::Board;
                }
                self.reload();
            }
            Action::Quit => {
                self.should_quit = true;
            }
        }
    }

    fn flash(&mut self, msg: impl Into<String>) {
        self.flash_message = Some((msg.into(), Instant::now()));
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.board
            .view()
            .columns
            .get(self.selected_column)
            .and_then(|c| c.cards.get(self.selected_card))
            .map(|card| card.task_id)
    }

    fn clamp_selection(&mut self) {
        let count = self.board.view().columns[self.selected_column].count();
        if self.selected_card >= count {
            self.selected_card = count.saturating_sub(1);
        }
    }

    fn handle_key(&mut self, key: KeyAction) {
        match self.view_mode {
            ViewMode::Board => self.handle_board_key(key),
            ViewMode::Form(_) => self.handle_form_key(key),
            ViewMode::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_board_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyAction::Right => {
                if self.selected_column < Status::ALL.len() - 1 {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyAction::Up => {
                if self.selected_card > 0 {
                    self.selected_card -= 1;
                }
            }
            KeyAction::Down => {
                let count = self.board.view().columns[self.selected_column].count();
                if count > 0 && self.selected_card < count - 1 {
                    self.selected_card += 1;
                }
            }
            KeyAction::Char(' ') | KeyAction::Select => self.grab_or_drop(),
            KeyAction::Escape => {
                if self.board.dragged().is_some() {
                    self.board.drag_end();
                    self.flash("Move cancelled");
                }
            }
            KeyAction::Char('n') => {
                self.view_mode = ViewMode::Form(FormState::new(FormMode::Create, TaskForm::default()));
            }
            KeyAction::Char('e') => {
                if let Some(task) = self.selected_task_id().and_then(|id| self.board.task(id)) {
                    let state = FormState::new(FormMode::Edit(task.id), TaskForm::from_task(task));
                    self.view_mode = ViewMode::Form(state);
                }
            }
            KeyAction::Char('x') | KeyAction::Delete => {
                if let Some(task_id) = self.selected_task_id() {
                    if let Some(prompt) = self.board.delete_prompt(task_id) {
                        self.view_mode = ViewMode::ConfirmDelete { task_id, prompt };
                    }
                }
            }
            KeyAction::Char('p') => {
                self.board.cycle_project_filter();
                self.selected_card = 0;
                self.clamp_selection();
                let label = match self.board.project_filter() {
                    Some(id) => format!(
                        "Project: {}",
                        self.board.project_name(id).unwrap_or("unknown")
                    ),
                    None => "All projects".to_string(),
                };
                self.flash(label);
            }
            KeyAction::Char('r') => self.reload(),
            KeyAction::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    /// First press picks up the selected card, second press drops it on
    /// the selected column.
    fn grab_or_drop(&mut self) {
        if self.board.dragged().is_none() {
            if let Some(task_id) = self.selected_task_id() {
                self.board.drag_start(task_id);
                self.flash("Moving card: ←/→ to pick a column, space to drop, esc to cancel");
            }
            return;
        }

        let status = Status::ALL[self.selected_column];
        let Some(change) = self.board.drop_on(status) else {
            return;
        };
        debug!(task_id = change.task_id, to = %status, "card dropped");

        // Follow the card into its new column.
        if let Some(pos) = self
            .board
            .view()
            .column(status)
            .cards
            .iter()
            .position(|c| c.task_id == change.task_id)
        {
            self.selected_card = pos;
        }

        let api = self.board.api();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = api.update_status(change.task_id, change.to).await;
            let _ = tx.send(Action::StatusUpdateFinished(change, result));
        });
    }

    fn handle_form_key(&mut self, key: KeyAction) {
        let ViewMode::Form(state) = &mut self.view_mode else {
            return;
        };
        if key == KeyAction::Escape {
            if !state.loading {
                self.view_mode = ViewMode::Board;
            }
            return;
        }
        if state.busy() {
            return;
        }

        let field = state.focused();
        match key {
            KeyAction::Tab | KeyAction::Down => {
                state.focus = (state.focus + 1) % FormField::ALL.len();
            }
            KeyAction::BackTab | KeyAction::Up => {
                state.focus = (state.focus + FormField::ALL.len() - 1) % FormField::ALL.len();
            }
            KeyAction::Left | KeyAction::Right if !field.is_text() => {
                let options = self.select_options(field);
                let ViewMode::Form(state) = &mut self.view_mode else {
                    return;
                };
                let current = options
                    .iter()
                    .position(|v| v == state.form.value(field))
                    .unwrap_or(0);
                let next = if key == KeyAction::Right {
                    (current + 1) % options.len()
                } else {
                    (current + options.len() - 1) % options.len()
                };
                *state.form.value_mut(field) = options[next].clone();
            }
            KeyAction::Char(c) if field.is_text() => state.form.value_mut(field).push(c),
            KeyAction::Backspace if field.is_text() => {
                state.form.value_mut(field).pop();
            }
            KeyAction::Select => self.submit_form(),
            _ => {}
        }
    }

    /// Option values for a select field, the empty "nothing selected"
    /// value first.
    pub fn select_options(&self, field: FormField) -> Vec<String> {
        let mut options = vec![String::new()];
        match field {
            FormField::Status => options.extend(Status::ALL.iter().map(|s| s.id().to_string())),
            FormField::Project => {
                options.extend(self.board.projects().iter().map(|p| p.id.to_string()))
            }
            FormField::AssignedTo => {
                options.extend(self.board.developers().iter().map(|d| d.id.to_string()))
            }
            FormField::Priority => options.extend(PRIORITIES.iter().map(|p| p.to_string())),
            _ => {}
        }
        options
    }

    /// Human text for a form value: labels for ids, the raw value otherwise.
    pub fn option_label(&self, field: FormField, value: &str) -> String {
        if value.is_empty() && !field.is_text() {
            return match field {
                FormField::AssignedTo => "Unassigned".into(),
                FormField::Priority => "None".into(),
                _ => "Select…".into(),
            };
        }
        let parsed = value.parse::<i64>().ok();
        let label = match field {
            FormField::Status => value
                .parse::<u32>()
                .ok()
                .and_then(Status::from_id)
                .map(|s| s.label().to_string()),
            FormField::Project => parsed
                .and_then(|id| self.board.project_name(id))
                .map(String::from),
            FormField::AssignedTo => parsed.and_then(|id| {
                self.board
                    .developers()
                    .iter()
                    .find(|d| d.id == id)
                    .map(|d| d.full_name())
            }),
            _ => None,
        };
        label.unwrap_or_else(|| value.to_string())
    }

    fn submit_form(&mut self) {
        let ViewMode::Form(state) = &mut self.view_mode else {
            return;
        };
        state.error = None;
        if let Err(e) = state.form.to_payload(state.mode) {
            state.error = Some(e);
            return;
        }
        state.loading = true;

        let api = self.board.api();
        let tx = self.action_tx.clone();
        let mode = state.mode;
        let form = state.form.clone();
        tokio::spawn(async move {
            let result = form::submit(api.as_ref(), mode, &form).await;
            let _ = tx.send(Action::SubmitFinished(mode, result));
        });
    }

    fn handle_submitted(&mut self, mode: FormMode, result: Result<Submitted, FormError>) {
        let ViewMode::Form(state) = &mut self.view_mode else {
            return;
        };
        if state.mode != mode {
            return;
        }
        state.loading = false;

        let submitted = match result {
            Ok(s) => s,
            Err(e) => {
                state.error = Some(e);
                return;
            }
        };
        state.success = true;

        if mode == FormMode::Create {
            match submitted.task_id {
                Some(task_id) => self.spawn_calendar_mirror(task_id),
                None => warn!("create response carried no taskID; calendar event skipped"),
            }
        }

        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(SUCCESS_DELAY).await;
            let _ = tx.send(Action::ModalSettled(mode));
        });
    }

    fn spawn_calendar_mirror(&self, task_id: TaskId) {
        let api = self.board.api();
        let log = self.calendar.clone();
        tokio::spawn(async move {
            if let Err(e) = calendar::mirror_task(api.as_ref(), &log, task_id).await {
                warn!(task_id, error = %e, "calendar mirroring failed");
            }
        });
    }

    fn handle_confirm_key(&mut self, key: KeyAction) {
        let ViewMode::ConfirmDelete { task_id, .. } = &self.view_mode else {
            return;
        };
        let task_id = *task_id;
        match key {
            KeyAction::Char('y') | KeyAction::Char('Y') => {
                self.view_mode = ViewMode::Board;
                let api = self.board.api();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let result = api.delete_task(task_id).await;
                    let _ = tx.send(Action::DeleteFinished(task_id, result));
                });
            }
            KeyAction::Char('n') | KeyAction::Char('N') | KeyAction::Escape => {
                self.view_mode = ViewMode::Board;
            }
            _ => {}
        }
    }
}
