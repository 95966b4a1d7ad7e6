//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical to-do record owned by the task store.
//!
//! # Invariants
//! - `task_id` is assigned by the store and never reused for another task.
//! - `UNSAVED_TASK_ID` is only carried by tasks that were never inserted.
//! - Non-empty `title`/`description` is an editor rule, not a model rule.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Store-assigned task identifier.
pub type TaskId = i64;

/// Identifier carried by a task that has not been inserted yet.
pub const UNSAVED_TASK_ID: TaskId = 0;

/// One to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub title: String,
    pub description: String,
    pub is_complete: bool,
    /// Unix epoch milliseconds. Listing order key (newest first).
    pub created_at: i64,
}

impl Task {
    /// Creates an unsaved, uncompleted task stamped with the current time.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            task_id: UNSAVED_TASK_ID,
            title: title.into(),
            description: description.into(),
            is_complete: false,
            created_at: now_epoch_ms(),
        }
    }

    /// Returns whether the store has assigned an identifier to this task.
    pub fn is_persisted(&self) -> bool {
        self.task_id != UNSAVED_TASK_ID
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
