//! Task list view-model.
//!
//! # Responsibility
//! - Own the filter selection and the current paged subscription.
//! - Pass bulk operations through to the task store.
//! - Queue one-shot navigation/snackbar events for the list screen.
//!
//! # Invariants
//! - Page requests carrying a superseded generation never touch the store.
//! - A successful store write keeps the filter but restarts its subscription
//!   under a new generation, so no removed or edited row stays visible.
//! - Writes made through other handles to the same store are picked up by the
//!   next page load of the current subscription.
//! - An operation whose event cannot be queued fails before any store write.
//! - Store errors propagate unchanged; nothing is retried.

use crate::model::filter::TaskFilter;
use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::{RepoResult, TaskRepository};
use crate::service::error::ServiceResult;
use crate::service::events::{EventQueue, EventQueueFull};
use crate::service::filter_selector::FilterSelector;
use crate::service::pager::{PageLoad, PagingConfig, TaskPager};
use log::{debug, info};

/// One-shot events consumed by the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskListEvent {
    NavigateToAddTask,
    NavigateToEditTask(TaskId),
    /// A task was deleted; the screen may offer to restore it.
    ShowUndoDelete(Task),
}

/// Render-ready view of the current subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListSnapshot {
    pub filter: TaskFilter,
    pub title: String,
    pub generation: u64,
    pub items: Vec<Task>,
    pub dropped_before: u32,
    pub exhausted: bool,
}

/// List screen state over a task store.
pub struct TaskListViewModel<R: TaskRepository> {
    repo: R,
    selector: FilterSelector,
    tasks: TaskPager,
    events: EventQueue<TaskListEvent>,
}

impl<R: TaskRepository> TaskListViewModel<R> {
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, PagingConfig::default())
    }

    pub fn with_config(repo: R, config: PagingConfig) -> Self {
        let selector = FilterSelector::new(config);
        let tasks = selector.subscribe();
        Self {
            repo,
            selector,
            tasks,
            events: EventQueue::default(),
        }
    }

    pub fn current_filter(&self) -> &TaskFilter {
        self.selector.current()
    }

    /// Current subscription.
    pub fn tasks(&self) -> &TaskPager {
        &self.tasks
    }

    pub fn events(&mut self) -> &mut EventQueue<TaskListEvent> {
        &mut self.events
    }

    /// Switches the active filter; the prior subscription becomes stale.
    ///
    /// Returns the generation of the new subscription.
    pub fn update_filter(&mut self, filter: TaskFilter) -> u64 {
        self.tasks = self.selector.set_filter(filter);
        self.tasks.generation()
    }

    /// Starts a title search. Blank queries keep the current filter.
    pub fn on_query_changed(&mut self, query: &str) -> u64 {
        if query.is_empty() {
            return self.tasks.generation();
        }
        self.update_filter(TaskFilter::Search(query.to_string()))
    }

    /// Re-runs the current filter from the first page.
    pub fn refresh(&mut self) -> u64 {
        let filter = self.selector.current().clone();
        self.update_filter(filter)
    }

    /// Loads the next page of the subscription identified by `generation`.
    pub fn load_page(&mut self, generation: u64) -> PageLoad {
        if !self.selector.is_current(generation) {
            debug!(
                "event=page_load module=list status=stale requested_generation={} current_generation={}",
                generation,
                self.selector.generation()
            );
            return PageLoad::Stale;
        }
        self.tasks.load_next(&self.repo)
    }

    /// Loads the next page of the current subscription.
    pub fn load_next_page(&mut self) -> PageLoad {
        self.tasks.load_next(&self.repo)
    }

    pub fn snapshot(&self) -> TaskListSnapshot {
        let filter = self.selector.current().clone();
        TaskListSnapshot {
            title: filter.title(),
            filter,
            generation: self.tasks.generation(),
            items: self.tasks.items(),
            dropped_before: self.tasks.dropped_before(),
            exhausted: self.tasks.is_exhausted(),
        }
    }

    /// Deletes `task` and queues an undo offer for it.
    ///
    /// # Errors
    /// - `ServiceError::EventQueueFull` when the undo offer cannot be queued;
    ///   the task is not deleted.
    /// - `ServiceError::Repo` when the store write fails.
    pub fn delete_task(&mut self, task: &Task) -> ServiceResult<()> {
        self.events.ensure_room()?;
        self.repo.delete_task(task)?;
        info!(
            "event=task_delete module=list status=ok task_id={}",
            task.task_id
        );
        self.events.push(TaskListEvent::ShowUndoDelete(task.clone()))?;
        self.refresh();
        Ok(())
    }

    /// Restores a task removed by [`Self::delete_task`] under its old id.
    pub fn undo_delete(&mut self, task: &Task) -> RepoResult<TaskId> {
        let task_id = self.repo.insert(task)?;
        info!(
            "event=task_restore module=list status=ok task_id={}",
            task_id
        );
        self.refresh();
        Ok(task_id)
    }

    pub fn complete_task(&mut self, task: &Task, is_complete: bool) -> RepoResult<()> {
        self.repo.update_complete(task.task_id, is_complete)?;
        self.refresh();
        Ok(())
    }

    pub fn clear_all(&mut self) -> RepoResult<usize> {
        let removed = self.repo.clear()?;
        info!(
            "event=tasks_clear module=list status=ok scope=all removed={}",
            removed
        );
        self.refresh();
        Ok(removed)
    }

    pub fn clear_completed_tasks(&mut self) -> RepoResult<usize> {
        let removed = self.repo.clear_completed_tasks()?;
        info!(
            "event=tasks_clear module=list status=ok scope=completed removed={}",
            removed
        );
        self.refresh();
        Ok(removed)
    }

    pub fn navigate_to_add_task(&mut self) -> Result<(), EventQueueFull> {
        self.events.push(TaskListEvent::NavigateToAddTask)
    }

    pub fn navigate_to_edit_task(&mut self, task: &Task) -> Result<(), EventQueueFull> {
        self.events.push(TaskListEvent::NavigateToEditTask(task.task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskListEvent, TaskListViewModel};
    use crate::db::open_db_in_memory;
    use crate::model::filter::TaskFilter;
    use crate::model::task::Task;
    use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
    use crate::service::pager::PageLoad;

    fn view_model() -> TaskListViewModel<SqliteTaskRepository> {
        let repo = SqliteTaskRepository::try_new(open_db_in_memory().unwrap()).unwrap();
        TaskListViewModel::new(repo)
    }

    #[test]
    fn blank_query_keeps_current_filter() {
        let mut vm = view_model();
        let generation = vm.update_filter(TaskFilter::Completed);

        assert_eq!(vm.on_query_changed(""), generation);
        assert_eq!(vm.current_filter(), &TaskFilter::Completed);
    }

    #[test]
    fn stale_generation_is_ignored() {
        let mut vm = view_model();
        let old = vm.tasks().generation();
        vm.update_filter(TaskFilter::Uncompleted);

        assert_eq!(vm.load_page(old), PageLoad::Stale);
    }

    #[test]
    fn navigation_events_are_queued() {
        let mut vm = view_model();
        let mut task = Task::new("a", "b");
        task.task_id = 7;

        vm.navigate_to_add_task().unwrap();
        vm.navigate_to_edit_task(&task).unwrap();

        assert_eq!(
            vm.events().drain(),
            vec![
                TaskListEvent::NavigateToAddTask,
                TaskListEvent::NavigateToEditTask(7)
            ]
        );
    }

    #[test]
    fn delete_then_undo_restores_same_id() {
        let repo = SqliteTaskRepository::try_new(open_db_in_memory().unwrap()).unwrap();
        let id = repo.insert(&Task::new("keep", "me")).unwrap();
        let task = repo.get_by_id(id).unwrap().unwrap();
        let mut vm = TaskListViewModel::new(&repo);

        vm.delete_task(&task).unwrap();
        assert!(repo.get_by_id(id).unwrap().is_none());
        let Some(TaskListEvent::ShowUndoDelete(deleted)) = vm.events().poll() else {
            panic!("expected undo offer");
        };

        assert_eq!(vm.undo_delete(&deleted).unwrap(), id);
        assert_eq!(repo.get_by_id(id).unwrap(), Some(task));
    }
}
