//! Core domain logic for the to-do list.
//! This crate is the single source of truth for task storage and list state.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::filter::{FilterParseError, TaskFilter};
pub use model::task::{Task, TaskId, UNSAVED_TASK_ID};
pub use repo::task_repo::{
    PagingSource, RepoError, RepoResult, SqliteTaskRepository, TaskQuery, TaskRepository,
};
pub use service::error::{ServiceError, ServiceResult};
pub use service::events::{EventQueue, EventQueueFull, DEFAULT_EVENT_CAPACITY};
pub use service::filter_selector::FilterSelector;
pub use service::pager::{PageLoad, PagingConfig, TaskPager};
pub use service::task_editor::{EditorEvent, EditorMessage, SaveOutcome, TaskEditorViewModel};
pub use service::task_list::{TaskListEvent, TaskListSnapshot, TaskListViewModel};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
