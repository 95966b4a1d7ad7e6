//! Create/update editor view-model.
//!
//! # Responsibility
//! - Hold in-progress title/description for one editor screen.
//! - Decide between insert and update on save.
//!
//! # Invariants
//! - Save with an empty title or description is a silent no-op: no store
//!   mutation, no event.
//! - Saving a loaded task keeps its `task_id`.
//! - Each successful save queues exactly one `NavigateToDoList` event.
//! - A save whose event cannot be queued fails before touching the store.

use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::{RepoError, RepoResult, TaskRepository};
use crate::service::error::ServiceResult;
use crate::service::events::EventQueue;
use log::{debug, info};

/// Status message shown after leaving the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMessage {
    TaskAdded,
    TaskUpdated,
}

impl EditorMessage {
    pub fn text(self) -> &'static str {
        match self {
            Self::TaskAdded => "Task added",
            Self::TaskUpdated => "Task updated",
        }
    }
}

/// One-shot events consumed by the editor screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    NavigateToDoList(EditorMessage),
}

/// Result of [`TaskEditorViewModel::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(TaskId),
    Updated(TaskId),
    /// Validation failed; nothing was written.
    Skipped,
}

/// Editor screen state over a task store.
pub struct TaskEditorViewModel<R: TaskRepository> {
    repo: R,
    edited_task: Option<Task>,
    title: String,
    description: String,
    events: EventQueue<EditorEvent>,
}

impl<R: TaskRepository> TaskEditorViewModel<R> {
    /// Starts in "create" mode with empty fields.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            edited_task: None,
            title: String::new(),
            description: String::new(),
            events: EventQueue::default(),
        }
    }

    /// Switches to "edit" mode for `id` and copies its fields.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when no task has this id.
    pub fn load(&mut self, id: TaskId) -> RepoResult<&Task> {
        let task = self.repo.get_by_id(id)?.ok_or(RepoError::NotFound(id))?;
        self.title = task.title.clone();
        self.description = task.description.clone();
        debug!("event=editor_load module=editor status=ok task_id={}", id);
        Ok(self.edited_task.insert(task))
    }

    pub fn edited_task(&self) -> Option<&Task> {
        self.edited_task.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.edited_task.is_some()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn events(&mut self) -> &mut EventQueue<EditorEvent> {
        &mut self.events
    }

    /// Persists the edited fields.
    ///
    /// Updates the loaded task in place, or inserts a new one in create mode.
    ///
    /// # Errors
    /// - `ServiceError::EventQueueFull` when the screen has not consumed
    ///   earlier events; nothing is written.
    /// - `ServiceError::Repo` when the store write fails.
    pub fn save(&mut self) -> ServiceResult<SaveOutcome> {
        if self.title.is_empty() || self.description.is_empty() {
            debug!("event=editor_save module=editor status=skipped reason=empty_field");
            return Ok(SaveOutcome::Skipped);
        }
        self.events.ensure_room()?;

        let (outcome, message) = match self.edited_task.as_mut() {
            Some(task) => {
                task.title = self.title.clone();
                task.description = self.description.clone();
                self.repo.update_task(task)?;
                (SaveOutcome::Updated(task.task_id), EditorMessage::TaskUpdated)
            }
            None => {
                let task = Task::new(self.title.clone(), self.description.clone());
                let task_id = self.repo.insert(&task)?;
                (SaveOutcome::Created(task_id), EditorMessage::TaskAdded)
            }
        };

        info!(
            "event=editor_save module=editor status=ok outcome={}",
            match outcome {
                SaveOutcome::Created(_) => "created",
                SaveOutcome::Updated(_) => "updated",
                SaveOutcome::Skipped => "skipped",
            }
        );
        self.events.push(EditorEvent::NavigateToDoList(message))?;
        Ok(outcome)
    }
}
