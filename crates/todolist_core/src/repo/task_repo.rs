//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and paged query APIs over the `tasks` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Listing order is always `created_at DESC, task_id DESC`.
//! - Paged reads never load more than the requested `limit` rows.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Every successful write advances the store's `change_version`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::task::{Task, TaskId};
use log::debug;
use rusqlite::{params, Connection, Row};
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    task_id,
    title,
    description,
    is_complete,
    created_at
FROM tasks";

const TASK_ORDER_SQL: &str = "ORDER BY created_at DESC, task_id DESC";

const REQUIRED_TASK_COLUMNS: [&str; 5] = [
    "task_id",
    "title",
    "description",
    "is_complete",
    "created_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
    /// Connection schema version does not match this binary.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "task repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "task repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "task repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store query selecting which tasks a paged source yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskQuery {
    All,
    ByCompleteState(bool),
    /// `LIKE` pattern matched against the title, escaped with `\`.
    SearchByName(String),
}

/// Repository interface for the task store.
pub trait TaskRepository {
    /// Inserts a task and returns its id.
    ///
    /// Unsaved tasks get a fresh id; a persisted id is written back as-is.
    fn insert(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn update_complete(&self, id: TaskId, is_complete: bool) -> RepoResult<()>;
    /// Deletes by id. Deleting a task that is already gone is a no-op.
    fn delete_task(&self, task: &Task) -> RepoResult<()>;
    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Loads one page of `query` results.
    fn load_page(&self, query: &TaskQuery, offset: u32, limit: u32) -> RepoResult<Vec<Task>>;
    /// Deletes every task and returns the number of removed rows.
    fn clear(&self) -> RepoResult<usize>;
    /// Deletes completed tasks only and returns the number of removed rows.
    fn clear_completed_tasks(&self) -> RepoResult<usize>;
    /// Monotonic counter advanced by every successful write.
    ///
    /// Paged subscriptions compare it to detect rows changed under them.
    fn change_version(&self) -> u64;

    fn get_all(&self) -> PagingSource<'_, Self>
    where
        Self: Sized,
    {
        PagingSource::new(self, TaskQuery::All)
    }

    fn get_by_complete_state(&self, is_complete: bool) -> PagingSource<'_, Self>
    where
        Self: Sized,
    {
        PagingSource::new(self, TaskQuery::ByCompleteState(is_complete))
    }

    fn search_by_name(&self, pattern: impl Into<String>) -> PagingSource<'_, Self>
    where
        Self: Sized,
    {
        PagingSource::new(self, TaskQuery::SearchByName(pattern.into()))
    }
}

impl<R: TaskRepository + ?Sized> TaskRepository for &R {
    fn insert(&self, task: &Task) -> RepoResult<TaskId> {
        (**self).insert(task)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        (**self).update_task(task)
    }

    fn update_complete(&self, id: TaskId, is_complete: bool) -> RepoResult<()> {
        (**self).update_complete(id, is_complete)
    }

    fn delete_task(&self, task: &Task) -> RepoResult<()> {
        (**self).delete_task(task)
    }

    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<Task>> {
        (**self).get_by_id(id)
    }

    fn load_page(&self, query: &TaskQuery, offset: u32, limit: u32) -> RepoResult<Vec<Task>> {
        (**self).load_page(query, offset, limit)
    }

    fn clear(&self) -> RepoResult<usize> {
        (**self).clear()
    }

    fn clear_completed_tasks(&self) -> RepoResult<usize> {
        (**self).clear_completed_tasks()
    }

    fn change_version(&self) -> u64 {
        (**self).change_version()
    }
}

/// Paginated source of tasks bound to one store query.
///
/// Pages are fetched on demand; nothing is loaded until [`PagingSource::load`]
/// is called.
pub struct PagingSource<'r, R> {
    repo: &'r R,
    query: TaskQuery,
}

impl<'r, R: TaskRepository> PagingSource<'r, R> {
    pub fn new(repo: &'r R, query: TaskQuery) -> Self {
        Self { repo, query }
    }

    pub fn query(&self) -> &TaskQuery {
        &self.query
    }

    pub fn load(&self, offset: u32, limit: u32) -> RepoResult<Vec<Task>> {
        self.repo.load_page(&self.query, offset, limit)
    }
}

/// SQLite-backed task repository.
///
/// Owns its connection so list/editor sessions can keep a store across calls.
pub struct SqliteTaskRepository {
    conn: Connection,
    change_version: Cell<u64>,
}

impl SqliteTaskRepository {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for foreign schemas.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_task_connection_ready(&conn)?;
        Ok(Self {
            conn,
            change_version: Cell::new(0),
        })
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn mark_changed(&self) {
        self.change_version
            .set(self.change_version.get().wrapping_add(1));
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn insert(&self, task: &Task) -> RepoResult<TaskId> {
        if task.is_persisted() {
            self.conn.execute(
                "INSERT INTO tasks (task_id, title, description, is_complete, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    task.task_id,
                    task.title.as_str(),
                    task.description.as_str(),
                    bool_to_int(task.is_complete),
                    task.created_at,
                ],
            )?;
            self.mark_changed();
            return Ok(task.task_id);
        }

        self.conn.execute(
            "INSERT INTO tasks (title, description, is_complete, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                task.title.as_str(),
                task.description.as_str(),
                bool_to_int(task.is_complete),
                task.created_at,
            ],
        )?;
        self.mark_changed();
        Ok(self.conn.last_insert_rowid())
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                is_complete = ?3,
                created_at = ?4
             WHERE task_id = ?5;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                bool_to_int(task.is_complete),
                task.created_at,
                task.task_id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.task_id));
        }

        self.mark_changed();
        Ok(())
    }

    fn update_complete(&self, id: TaskId, is_complete: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET is_complete = ?1 WHERE task_id = ?2;",
            params![bool_to_int(is_complete), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.mark_changed();
        Ok(())
    }

    fn delete_task(&self, task: &Task) -> RepoResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM tasks WHERE task_id = ?1;", [task.task_id])?;
        if removed > 0 {
            self.mark_changed();
        }
        Ok(())
    }

    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE task_id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn load_page(&self, query: &TaskQuery, offset: u32, limit: u32) -> RepoResult<Vec<Task>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let limit = i64::from(limit);
        let offset = i64::from(offset);
        let mut tasks = Vec::new();

        match query {
            TaskQuery::All => {
                let mut stmt = self.conn.prepare(&format!(
                    "{TASK_SELECT_SQL} {TASK_ORDER_SQL} LIMIT ?1 OFFSET ?2;"
                ))?;
                let mut rows = stmt.query(params![limit, offset])?;
                while let Some(row) = rows.next()? {
                    tasks.push(parse_task_row(row)?);
                }
            }
            TaskQuery::ByCompleteState(is_complete) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{TASK_SELECT_SQL} WHERE is_complete = ?1 {TASK_ORDER_SQL} LIMIT ?2 OFFSET ?3;"
                ))?;
                let mut rows = stmt.query(params![bool_to_int(*is_complete), limit, offset])?;
                while let Some(row) = rows.next()? {
                    tasks.push(parse_task_row(row)?);
                }
            }
            TaskQuery::SearchByName(pattern) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{TASK_SELECT_SQL} WHERE title LIKE ?1 ESCAPE '\\' {TASK_ORDER_SQL} LIMIT ?2 OFFSET ?3;"
                ))?;
                let mut rows = stmt.query(params![pattern.as_str(), limit, offset])?;
                while let Some(row) = rows.next()? {
                    tasks.push(parse_task_row(row)?);
                }
            }
        }

        debug!(
            "event=tasks_page module=repo status=ok query={} offset={} limit={} rows={}",
            query_label(query),
            offset,
            limit,
            tasks.len()
        );
        Ok(tasks)
    }

    fn clear(&self) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM tasks;", [])?;
        if removed > 0 {
            self.mark_changed();
        }
        Ok(removed)
    }

    fn clear_completed_tasks(&self) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM tasks WHERE is_complete = 1;", [])?;
        if removed > 0 {
            self.mark_changed();
        }
        Ok(removed)
    }

    fn change_version(&self) -> u64 {
        self.change_version.get()
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let is_complete = match row.get::<_, i64>("is_complete")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_complete value `{other}` in tasks.is_complete"
            )));
        }
    };

    Ok(Task {
        task_id: row.get("task_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        is_complete,
        created_at: row.get("created_at")?,
    })
}

fn query_label(query: &TaskQuery) -> &'static str {
    match query {
        TaskQuery::All => "all",
        TaskQuery::ByCompleteState(true) => "completed",
        TaskQuery::ByCompleteState(false) => "uncompleted",
        TaskQuery::SearchByName(_) => "search",
    }
}

fn ensure_task_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "tasks")? {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }

    for column in REQUIRED_TASK_COLUMNS {
        if !table_has_column(conn, "tasks", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
