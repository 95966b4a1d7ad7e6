//! FFI use-case API for the mobile UI.
//!
//! # Responsibility
//! - Expose list/editor screen operations to Dart via FRB.
//! - Own the per-process list and editor sessions.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - DB-backed functions are async (bridge worker pool); only pure health checks
//!   are `sync`.
//! - Page responses carry the generation they were loaded for.
//! - Successful list writes and editor saves restart the list subscription;
//!   the action response carries the generation to load next.

use log::warn;
use once_cell::sync::Lazy;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use todolist_core::db::open_db;
use todolist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    EditorEvent, PageLoad, SaveOutcome, SqliteTaskRepository, Task, TaskEditorViewModel,
    TaskFilter, TaskListEvent, TaskListViewModel,
};

const DB_FILE_NAME: &str = "todolist.sqlite3";
const DB_PATH_ENV: &str = "TODOLIST_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

type ListSession = TaskListViewModel<SqliteTaskRepository>;
type EditorSession = TaskEditorViewModel<SqliteTaskRepository>;

static LIST_SESSION: Lazy<Mutex<Option<ListSession>>> = Lazy::new(|| Mutex::new(None));
static EDITOR_SESSION: Lazy<Mutex<Option<EditorSession>>> = Lazy::new(|| Mutex::new(None));

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task row as rendered by the list and editor screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub task_id: i64,
    pub title: String,
    pub description: String,
    /// Rendered with strike-through when `true`.
    pub is_complete: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl From<Task> for TaskItem {
    fn from(task: Task) -> Self {
        Self {
            task_id: task.task_id,
            title: task.title,
            description: task.description,
            is_complete: task.is_complete,
            created_at: task.created_at,
        }
    }
}

impl From<TaskItem> for Task {
    fn from(item: TaskItem) -> Self {
        Self {
            task_id: item.task_id,
            title: item.title,
            description: item.description,
            is_complete: item.is_complete,
            created_at: item.created_at,
        }
    }
}

/// Active filter description for the toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResponse {
    pub ok: bool,
    /// Menu key: `all|completed|uncompleted|search`.
    pub key: String,
    pub title: String,
    /// Subscription generation to pass to [`task_list_load_page`].
    pub generation: u64,
    pub message: String,
}

/// One page request result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPageResponse {
    pub ok: bool,
    /// Request targeted a superseded filter; discard the response.
    pub stale: bool,
    pub exhausted: bool,
    pub generation: u64,
    /// Every task currently held by the subscription, in display order.
    pub items: Vec<TaskItem>,
    /// Rows evicted ahead of `items` by the in-memory bound.
    pub dropped_before: u32,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub task_id: Option<i64>,
    /// List subscription generation after the action, when a list session
    /// is open. Pass it to [`task_list_load_page`].
    pub generation: Option<u64>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, task_id: Option<i64>) -> Self {
        Self {
            ok: true,
            task_id,
            generation: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            generation: None,
            message: message.into(),
        }
    }
}

/// One-shot list screen event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEventItem {
    /// `navigate_add|navigate_edit|undo_delete`.
    pub kind: String,
    pub task_id: Option<i64>,
    /// Deleted task payload for `undo_delete`.
    pub task: Option<TaskItem>,
}

/// Editor field state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorStateResponse {
    pub ok: bool,
    pub editing: bool,
    pub title: String,
    pub description: String,
    pub message: String,
}

/// One-shot editor screen event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorEventItem {
    /// Always `navigate_back` for now.
    pub kind: String,
    /// Status message to show after navigating back.
    pub message: String,
}

/// Switches the list filter.
///
/// Input semantics:
/// - `key`: `all|completed|uncompleted|search` (case-insensitive).
/// - `query`: search text, read only when `key == search`.
///
/// # FFI contract
/// - Async call, may open the DB on first use.
/// - Invalidates every earlier generation.
pub fn task_list_set_filter(key: String, query: Option<String>) -> FilterResponse {
    let filter = match TaskFilter::parse(key.as_str(), query.as_deref()) {
        Ok(filter) => filter,
        Err(err) => return filter_failure(format!("task_list_set_filter failed: {err}")),
    };
    match with_list_session(|session| {
        session.update_filter(filter);
        filter_response(session)
    }) {
        Ok(response) => response,
        Err(err) => filter_failure(format!("task_list_set_filter failed: {err}")),
    }
}

/// Submits a search query. Empty text keeps the current filter.
pub fn task_list_search(query: String) -> FilterResponse {
    match with_list_session(|session| {
        session.on_query_changed(query.as_str());
        filter_response(session)
    }) {
        Ok(response) => response,
        Err(err) => filter_failure(format!("task_list_search failed: {err}")),
    }
}

/// Returns the active filter and current generation.
pub fn task_list_current_filter() -> FilterResponse {
    match with_list_session(|session| filter_response(session)) {
        Ok(response) => response,
        Err(err) => filter_failure(format!("task_list_current_filter failed: {err}")),
    }
}

/// Restarts the current filter from its first page.
pub fn task_list_refresh() -> FilterResponse {
    match with_list_session(|session| {
        session.refresh();
        filter_response(session)
    }) {
        Ok(response) => response,
        Err(err) => filter_failure(format!("task_list_refresh failed: {err}")),
    }
}

/// Loads the next page of the subscription `generation`.
///
/// # FFI contract
/// - Async call, DB-backed.
/// - `stale=true` when a newer filter was selected meanwhile.
/// - Store failures yield `ok=false` with the already-held items.
pub fn task_list_load_page(generation: u64) -> TaskPageResponse {
    let result = with_list_session(|session| {
        let (ok, message) = match session.load_page(generation) {
            PageLoad::Loaded { count, .. } => (true, format!("Loaded {count} task(s).")),
            PageLoad::Exhausted => (true, "No more tasks.".to_string()),
            PageLoad::Stale => {
                return TaskPageResponse {
                    ok: true,
                    stale: true,
                    exhausted: false,
                    generation,
                    items: Vec::new(),
                    dropped_before: 0,
                    message: "Stale generation ignored.".to_string(),
                };
            }
            PageLoad::Failed(err) => (false, format!("task_list_load_page failed: {err}")),
        };
        let snapshot = session.snapshot();
        TaskPageResponse {
            ok,
            stale: false,
            exhausted: snapshot.exhausted,
            generation: snapshot.generation,
            items: snapshot.items.into_iter().map(TaskItem::from).collect(),
            dropped_before: snapshot.dropped_before,
            message,
        }
    });

    result.unwrap_or_else(|err| TaskPageResponse {
        ok: false,
        stale: false,
        exhausted: false,
        generation,
        items: Vec::new(),
        dropped_before: 0,
        message: format!("task_list_load_page failed: {err}"),
    })
}

/// Deletes one task and queues an `undo_delete` event carrying it.
pub fn task_list_delete(task: TaskItem) -> ActionResponse {
    let task = Task::from(task);
    let task_id = task.task_id;
    list_action("task_list_delete", |session| {
        session
            .delete_task(&task)
            .map(|()| ActionResponse::success("Task deleted.", Some(task_id)))
    })
}

/// Re-inserts a task removed by [`task_list_delete`] under its old id.
pub fn task_list_undo_delete(task: TaskItem) -> ActionResponse {
    let task = Task::from(task);
    list_action("task_list_undo_delete", |session| {
        session
            .undo_delete(&task)
            .map(|task_id| ActionResponse::success("Task restored.", Some(task_id)))
    })
}

/// Sets the completion flag of one task.
pub fn task_list_complete(task: TaskItem, is_complete: bool) -> ActionResponse {
    let task = Task::from(task);
    let task_id = task.task_id;
    list_action("task_list_complete", |session| {
        session
            .complete_task(&task, is_complete)
            .map(|()| ActionResponse::success("Task updated.", Some(task_id)))
    })
}

/// Deletes every task.
pub fn task_list_clear_all() -> ActionResponse {
    list_action("task_list_clear_all", |session| {
        session
            .clear_all()
            .map(|removed| ActionResponse::success(format!("Removed {removed} task(s)."), None))
    })
}

/// Deletes completed tasks only.
pub fn task_list_clear_completed() -> ActionResponse {
    list_action("task_list_clear_completed", |session| {
        session
            .clear_completed_tasks()
            .map(|removed| ActionResponse::success(format!("Removed {removed} task(s)."), None))
    })
}

/// Queues navigation to the editor in create mode.
pub fn task_list_navigate_to_add() -> ActionResponse {
    list_action("task_list_navigate_to_add", |session| {
        session
            .navigate_to_add_task()
            .map(|()| ActionResponse::success("", None))
    })
}

/// Queues navigation to the editor for `task`.
pub fn task_list_navigate_to_edit(task: TaskItem) -> ActionResponse {
    let task = Task::from(task);
    let task_id = task.task_id;
    list_action("task_list_navigate_to_edit", |session| {
        session
            .navigate_to_edit_task(&task)
            .map(|()| ActionResponse::success("", Some(task_id)))
    })
}

/// Marks the list screen as visible (`true`) or hidden (`false`).
///
/// Events queued while hidden are delivered after the screen is visible.
pub fn task_list_set_active(active: bool) -> ActionResponse {
    list_action("task_list_set_active", |session| {
        session.events().set_active(active);
        Ok::<_, String>(ActionResponse::success("", None))
    })
}

/// Drains deliverable list events. Each event is returned once.
pub fn task_list_poll_events() -> Vec<ListEventItem> {
    with_list_session(|session| {
        session
            .events()
            .drain()
            .into_iter()
            .map(to_list_event_item)
            .collect()
    })
    .unwrap_or_else(|err| {
        warn!(
            "event=ffi_poll module=ffi status=error screen=list error={}",
            err
        );
        Vec::new()
    })
}

/// Opens the editor screen session.
///
/// Input semantics:
/// - `task_id = None`: create mode with empty fields.
/// - `task_id = Some(id)`: edit mode, fields copied from the stored task.
///
/// # FFI contract
/// - Async call, DB-backed.
/// - Replaces any previous editor session.
pub fn editor_open(task_id: Option<i64>) -> EditorStateResponse {
    let mut editor = match open_repository() {
        Ok(repo) => TaskEditorViewModel::new(repo),
        Err(err) => return editor_failure(format!("editor_open failed: {err}")),
    };
    if let Some(id) = task_id {
        if let Err(err) = editor.load(id) {
            return editor_failure(format!("editor_open failed: {err}"));
        }
    }

    let response = editor_state(&editor, "");
    match lock_session(&*EDITOR_SESSION) {
        Ok(mut slot) => {
            *slot = Some(editor);
            response
        }
        Err(err) => editor_failure(format!("editor_open failed: {err}")),
    }
}

/// Replaces the editor's title and description (two-way binding input).
pub fn editor_set_fields(title: String, description: String) -> EditorStateResponse {
    match with_editor_session(|editor| {
        editor.set_title(title);
        editor.set_description(description);
        editor_state(editor, "")
    }) {
        Ok(response) => response,
        Err(err) => editor_failure(format!("editor_set_fields failed: {err}")),
    }
}

/// Saves the editor fields.
///
/// # FFI contract
/// - `ok=true, task_id=None` when a field is empty: nothing saved, no event.
/// - `ok=false` with nothing saved when earlier editor events were never
///   polled and the event queue is full.
/// - Otherwise `task_id` is the created or updated task, and an open list
///   session restarts under `generation`.
pub fn editor_save() -> ActionResponse {
    let result = with_editor_session(|editor| match editor.save() {
        Ok(SaveOutcome::Created(id)) => ActionResponse::success("Task added", Some(id)),
        Ok(SaveOutcome::Updated(id)) => ActionResponse::success("Task updated", Some(id)),
        Ok(SaveOutcome::Skipped) => ActionResponse::success("", None),
        Err(err) => ActionResponse::failure(format!("editor_save failed: {err}")),
    });
    let mut response = result
        .unwrap_or_else(|err| ActionResponse::failure(format!("editor_save failed: {err}")));
    if response.ok && response.task_id.is_some() {
        response.generation = refresh_open_list_session();
    }
    response
}

/// Drains deliverable editor events. Each event is returned once.
pub fn editor_poll_events() -> Vec<EditorEventItem> {
    with_editor_session(|editor| {
        editor
            .events()
            .drain()
            .into_iter()
            .map(|event| match event {
                EditorEvent::NavigateToDoList(message) => EditorEventItem {
                    kind: "navigate_back".to_string(),
                    message: message.text().to_string(),
                },
            })
            .collect()
    })
    .unwrap_or_else(|err| {
        warn!(
            "event=ffi_poll module=ffi status=error screen=editor error={}",
            err
        );
        Vec::new()
    })
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn open_repository() -> Result<SqliteTaskRepository, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    SqliteTaskRepository::try_new(conn).map_err(|err| format!("repo init failed: {err}"))
}

fn lock_session<T>(session: &'static Mutex<T>) -> Result<MutexGuard<'static, T>, String> {
    session
        .lock()
        .map_err(|_| "session lock poisoned".to_string())
}

fn with_list_session<T>(f: impl FnOnce(&mut ListSession) -> T) -> Result<T, String> {
    let mut slot = lock_session(&*LIST_SESSION)?;
    if slot.is_none() {
        *slot = Some(TaskListViewModel::new(open_repository()?));
    }
    match slot.as_mut() {
        Some(session) => Ok(f(session)),
        None => Err("list session unavailable".to_string()),
    }
}

fn with_editor_session<T>(f: impl FnOnce(&mut EditorSession) -> T) -> Result<T, String> {
    let mut slot = lock_session(&*EDITOR_SESSION)?;
    match slot.as_mut() {
        Some(editor) => Ok(f(editor)),
        None => Err("editor is not open; call editor_open first".to_string()),
    }
}

fn list_action<E: Display>(
    operation: &str,
    f: impl FnOnce(&mut ListSession) -> Result<ActionResponse, E>,
) -> ActionResponse {
    let result = with_list_session(|session| {
        f(session).map(|mut response| {
            response.generation = Some(session.tasks().generation());
            response
        })
    });
    match result {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => ActionResponse::failure(format!("{operation} failed: {err}")),
        Err(err) => ActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

// The editor writes through its own connection, so the list session cannot
// observe the change by itself.
fn refresh_open_list_session() -> Option<u64> {
    let mut slot = match lock_session(&*LIST_SESSION) {
        Ok(slot) => slot,
        Err(err) => {
            warn!(
                "event=ffi_list_refresh module=ffi status=error error={}",
                err
            );
            return None;
        }
    };
    slot.as_mut().map(|session| session.refresh())
}

fn filter_response(session: &ListSession) -> FilterResponse {
    let filter = session.current_filter();
    FilterResponse {
        ok: true,
        key: filter.key().to_string(),
        title: filter.title(),
        generation: session.tasks().generation(),
        message: String::new(),
    }
}

fn filter_failure(message: String) -> FilterResponse {
    FilterResponse {
        ok: false,
        key: String::new(),
        title: String::new(),
        generation: 0,
        message,
    }
}

fn editor_state(editor: &EditorSession, message: &str) -> EditorStateResponse {
    EditorStateResponse {
        ok: true,
        editing: editor.is_editing(),
        title: editor.title().to_string(),
        description: editor.description().to_string(),
        message: message.to_string(),
    }
}

fn editor_failure(message: String) -> EditorStateResponse {
    EditorStateResponse {
        ok: false,
        editing: false,
        title: String::new(),
        description: String::new(),
        message,
    }
}

fn to_list_event_item(event: TaskListEvent) -> ListEventItem {
    match event {
        TaskListEvent::NavigateToAddTask => ListEventItem {
            kind: "navigate_add".to_string(),
            task_id: None,
            task: None,
        },
        TaskListEvent::NavigateToEditTask(task_id) => ListEventItem {
            kind: "navigate_edit".to_string(),
            task_id: Some(task_id),
            task: None,
        },
        TaskListEvent::ShowUndoDelete(task) => ListEventItem {
            kind: "undo_delete".to_string(),
            task_id: Some(task.task_id),
            task: Some(TaskItem::from(task)),
        },
    }
}
