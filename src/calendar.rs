use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::BoardApi;
use crate::model::calendar::CalendarEvent;
use crate::model::task::TaskId;

/// Append-only list of calendar events kept on local disk, one entry per task.
pub struct CalendarLog {
    path: PathBuf,
    // Serializes read-merge-write between concurrent mirror tasks.
    write_lock: Mutex<()>,
}

impl CalendarLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// All stored events. A missing or unreadable file reads as empty.
    pub async fn load(&self) -> Vec<CalendarEvent> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "calendar log is corrupt; starting empty");
            Vec::new()
        })
    }

    /// Read, merge, write back. Returns `false` without touching the file
    /// when an event for the same task is already stored.
    ///
    /// The new list goes to a sibling temp file first and is renamed over
    /// the log, so an interrupted write never leaves a truncated file.
    pub async fn insert(&self, event: CalendarEvent) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut events = self.load().await;
        if events.iter().any(|e| e.task_id == event.task_id) {
            debug!(task_id = event.task_id, "calendar event already stored");
            return Ok(false);
        }
        events.push(event);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&events)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(true)
    }
}

/// Ask the backend for the task's calendar event and store it if new.
/// Returns whether an entry was added.
pub async fn mirror_task(api: &dyn BoardApi, log: &CalendarLog, task_id: TaskId) -> Result<bool> {
    let event = api
        .create_calendar_event(task_id)
        .await
        .context("Failed to create calendar event")?;
    let Some(event) = event else {
        debug!(task_id, "backend returned no calendar event");
        return Ok(false);
    };
    let added = log.insert(event).await?;
    if added {
        info!(task_id, "calendar event saved");
    }
    Ok(added)
}
