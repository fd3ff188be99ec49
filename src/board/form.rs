use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::BoardApi;
use crate::model::task::{DeveloperId, ProjectId, Task, TaskId, TaskPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Title,
    Description,
    Status,
    DueDate,
    AssignedTo,
    Project,
    Priority,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Title,
        FormField::Description,
        FormField::Status,
        FormField::DueDate,
        FormField::AssignedTo,
        FormField::Project,
        FormField::Priority,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Status => "Status",
            FormField::DueDate => "Due date",
            FormField::AssignedTo => "Assigned to",
            FormField::Project => "Project",
            FormField::Priority => "Priority",
        }
    }

    /// Free-text fields take typed characters; the rest cycle through options.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            FormField::Title | FormField::Description | FormField::DueDate
        )
    }
}

/// An error attached to one field of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub field: FormField,
    pub message: String,
}

impl FormError {
    fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw form values. Select fields hold the option value as text, empty when
/// nothing is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: String,
    pub due_date: String,
    pub assigned_to: String,
    pub project: String,
    pub priority: String,
}

impl TaskForm {
    /// Prefill for editing. Every field is carried so the edit submits a
    /// full replacement.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status_id.to_string(),
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            assigned_to: task.assigned_to.map(|d| d.to_string()).unwrap_or_default(),
            project: task.project_id.to_string(),
            priority: task.priority.clone().unwrap_or_default(),
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Status => &self.status,
            FormField::DueDate => &self.due_date,
            FormField::AssignedTo => &self.assigned_to,
            FormField::Project => &self.project,
            FormField::Priority => &self.priority,
        }
    }

    pub fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::Status => &mut self.status,
            FormField::DueDate => &mut self.due_date,
            FormField::AssignedTo => &mut self.assigned_to,
            FormField::Project => &mut self.project,
            FormField::Priority => &mut self.priority,
        }
    }

    /// Validate and serialize. Checks run title, status, project in that
    /// order and stop at the first failure.
    pub fn to_payload(&self, mode: FormMode) -> Result<TaskPayload, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::new(FormField::Title, "Task title is required"));
        }
        let status = self.status.trim();
        if status.is_empty() {
            let msg = match mode {
                FormMode::Create => "Please select a status",
                FormMode::Edit(_) => "Status is required",
            };
            return Err(FormError::new(FormField::Status, msg));
        }
        let project = self.project.trim();
        if project.is_empty() {
            let msg = match mode {
                FormMode::Create => "Please select a project",
                FormMode::Edit(_) => "Project is required",
            };
            return Err(FormError::new(FormField::Project, msg));
        }

        let status_id = status
            .parse::<u32>()
            .map_err(|_| FormError::new(FormField::Status, "Invalid status"))?;
        let project_id = project
            .parse::<ProjectId>()
            .map_err(|_| FormError::new(FormField::Project, "Invalid project"))?;
        let assigned_to = match self.assigned_to.trim() {
            "" => None,
            v => Some(
                v.parse::<DeveloperId>()
                    .map_err(|_| FormError::new(FormField::AssignedTo, "Invalid developer"))?,
            ),
        };
        let due_date = match self.due_date.trim() {
            "" => None,
            v => Some(
                NaiveDate::parse_from_str(v, "%Y-%m-%d")
                    .map_err(|_| FormError::new(FormField::DueDate, "Invalid date format"))?,
            ),
        };
        let priority = Some(self.priority.trim())
            .filter(|p| !p.is_empty())
            .map(String::from);

        Ok(TaskPayload {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            status_id,
            due_date,
            assigned_to,
            project_id,
            priority,
        })
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submitted {
    /// Id of the created or edited task. `None` only when a create response
    /// omitted it.
    pub task_id: Option<TaskId>,
}

/// Validate, then create or fully replace the task. Validation failures
/// return before any request is made; backend failures come back as an
/// error on the title field.
pub async fn submit(
    api: &dyn BoardApi,
    mode: FormMode,
    form: &TaskForm,
) -> Result<Submitted, FormError> {
    let payload = form.to_payload(mode)?;

    let result = match mode {
        FormMode::Create => api.create_task(&payload).await,
        FormMode::Edit(id) => api.replace_task(id, &payload).await.map(|_| Some(id)),
    };

    match result {
        Ok(task_id) => {
            info!(?mode, ?task_id, title = %payload.title, "task saved");
            Ok(Submitted { task_id })
        }
        Err(e) => {
            warn!(?mode, error = %e, "task submission failed");
            Err(FormError::new(FormField::Title, e.display_message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{task, MockApi};

    fn filled() -> TaskForm {
        TaskForm {
            title: "  Ship release  ".into(),
            description: " notes ".into(),
            status: "2".into(),
            due_date: "2025-06-30".into(),
            assigned_to: "7".into(),
            project: "3".into(),
            priority: "High".into(),
        }
    }

    #[test]
    fn payload_parses_and_trims() {
        let payload = filled().to_payload(FormMode::Create).unwrap();
        assert_eq!(payload.title, "Ship release");
        assert_eq!(payload.description, "notes");
        assert_eq!(payload.status_id, 2);
        assert_eq!(payload.project_id, 3);
        assert_eq!(payload.assigned_to, Some(7));
        assert_eq!(payload.due_date, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(payload.priority.as_deref(), Some("High"));
    }

    #[test]
    fn optional_fields_become_none() {
        let form = TaskForm {
            assigned_to: String::new(),
            due_date: String::new(),
            priority: String::new(),
            ..filled()
        };
        let payload = form.to_payload(FormMode::Create).unwrap();
        assert_eq!(payload.assigned_to, None);
        assert_eq!(payload.due_date, None);
        assert_eq!(payload.priority, None);
    }

    #[test]
    fn blank_title_is_rejected_first() {
        let form = TaskForm {
            title: "   ".into(),
            status: String::new(),
            project: String::new(),
            ..Default::default()
        };
        let err = form.to_payload(FormMode::Create).unwrap_err();
        assert_eq!(err.field, FormField::Title);
        assert_eq!(err.message, "Task title is required");
    }

    #[test]
    fn messages_differ_by_mode() {
        let no_status = TaskForm {
            status: String::new(),
            ..filled()
        };
        assert_eq!(
            no_status.to_payload(FormMode::Create).unwrap_err().message,
            "Please select a status"
        );
        assert_eq!(
            no_status.to_payload(FormMode::Edit(1)).unwrap_err().message,
            "Status is required"
        );

        let no_project = TaskForm {
            project: String::new(),
            ..filled()
        };
        let err = no_project.to_payload(FormMode::Create).unwrap_err();
        assert_eq!(err.field, FormField::Project);
        assert_eq!(err.message, "Please select a project");
        assert_eq!(
            no_project.to_payload(FormMode::Edit(1)).unwrap_err().message,
            "Project is required"
        );
    }

    #[test]
    fn bad_date_is_field_error() {
        let form = TaskForm {
            due_date: "30/06/2025".into(),
            ..filled()
        };
        let err = form.to_payload(FormMode::Create).unwrap_err();
        assert_eq!(err.field, FormField::DueDate);
        assert_eq!(err.message, "Invalid date format");
    }

    #[test]
    fn from_task_round_trips_into_payload() {
        let mut t = task(9, "Existing", 4, 2);
        t.description = Some("keep me".into());
        t.assigned_to = Some(5);
        t.priority = Some("Low".into());
        let form = TaskForm::from_task(&t);
        let payload = form.to_payload(FormMode::Edit(9)).unwrap();
        assert_eq!(payload.title, "Existing");
        assert_eq!(payload.description, "keep me");
        assert_eq!(payload.status_id, 4);
        assert_eq!(payload.project_id, 2);
        assert_eq!(payload.assigned_to, Some(5));
        assert_eq!(payload.priority.as_deref(), Some("Low"));
        assert_eq!(payload.due_date, None);
    }

    #[tokio::test]
    async fn empty_title_never_reaches_backend() {
        let api = MockApi::default();
        let form = TaskForm {
            title: String::new(),
            ..filled()
        };
        let err = submit(&api, FormMode::Create, &form).await.unwrap_err();
        assert_eq!(err.field, FormField::Title);
        assert_eq!(err.message, "Task title is required");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn create_returns_new_id() {
        let api = MockApi::with_tasks(vec![task(1, "old", 1, 3)]);
        let done = submit(&api, FormMode::Create, &filled()).await.unwrap();
        assert_eq!(done.task_id, Some(2));
        assert_eq!(api.calls(), vec!["POST tasks"]);
        assert_eq!(api.state.lock().unwrap().tasks.len(), 2);
    }

    #[tokio::test]
    async fn edit_replaces_whole_task() {
        let api = MockApi::with_tasks(vec![task(4, "before", 1, 1)]);
        let form = TaskForm {
            description: String::new(),
            ..filled()
        };
        submit(&api, FormMode::Edit(4), &form).await.unwrap();

        let state = api.state.lock().unwrap();
        let t = &state.tasks[0];
        assert_eq!(t.title, "Ship release");
        assert_eq!(t.status_id, 2);
        assert_eq!(t.project_id, 3);
        assert_eq!(t.description, None);
        assert_eq!(state.calls, vec!["PUT 4"]);
    }

    #[tokio::test]
    async fn backend_error_lands_on_title() {
        let api = MockApi::default();
        api.set(|s| s.fail_mutations = Some("Invalid date format".into()));
        let err = submit(&api, FormMode::Create, &filled()).await.unwrap_err();
        assert_eq!(err.field, FormField::Title);
        assert_eq!(err.message, "Invalid date format");
    }
}
