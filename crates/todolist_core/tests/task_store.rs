use rusqlite::Connection;
use todolist_core::db::migrations::latest_version;
use todolist_core::db::open_db_in_memory;
use todolist_core::{RepoError, SqliteTaskRepository, Task, TaskQuery, TaskRepository};

fn repo() -> SqliteTaskRepository {
    SqliteTaskRepository::try_new(open_db_in_memory().unwrap()).unwrap()
}

fn task_at(title: &str, created_at: i64, is_complete: bool) -> Task {
    let mut task = Task::new(title, format!("{title} details"));
    task.created_at = created_at;
    task.is_complete = is_complete;
    task
}

#[test]
fn insert_assigns_ids_and_get_by_id_roundtrips() {
    let repo = repo();

    let first = repo.insert(&Task::new("first", "one")).unwrap();
    let second = repo.insert(&Task::new("second", "two")).unwrap();
    assert_ne!(first, second);

    let loaded = repo.get_by_id(first).unwrap().unwrap();
    assert_eq!(loaded.task_id, first);
    assert_eq!(loaded.title, "first");
    assert_eq!(loaded.description, "one");
    assert!(!loaded.is_complete);
    assert!(repo.get_by_id(9_999).unwrap().is_none());
}

#[test]
fn insert_with_persisted_id_keeps_it() {
    let repo = repo();
    let mut task = Task::new("restored", "from undo");
    task.task_id = 42;

    assert_eq!(repo.insert(&task).unwrap(), 42);
    assert_eq!(repo.get_by_id(42).unwrap(), Some(task.clone()));

    let err = repo.insert(&task).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn store_accepts_empty_text() {
    let repo = repo();
    let id = repo.insert(&Task::new("", "")).unwrap();
    assert_eq!(repo.get_by_id(id).unwrap().unwrap().title, "");
}

#[test]
fn update_task_and_update_complete() {
    let repo = repo();
    let id = repo.insert(&Task::new("draft", "body")).unwrap();

    let mut task = repo.get_by_id(id).unwrap().unwrap();
    task.title = "final".to_string();
    repo.update_task(&task).unwrap();
    repo.update_complete(id, true).unwrap();

    let loaded = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.title, "final");
    assert!(loaded.is_complete);
}

#[test]
fn updates_on_missing_rows_return_not_found() {
    let repo = repo();
    let mut ghost = Task::new("ghost", "nowhere");
    ghost.task_id = 77;

    assert!(matches!(
        repo.update_task(&ghost).unwrap_err(),
        RepoError::NotFound(77)
    ));
    assert!(matches!(
        repo.update_complete(77, true).unwrap_err(),
        RepoError::NotFound(77)
    ));
}

#[test]
fn delete_task_is_idempotent() {
    let repo = repo();
    let id = repo.insert(&Task::new("gone", "soon")).unwrap();
    let task = repo.get_by_id(id).unwrap().unwrap();

    repo.delete_task(&task).unwrap();
    repo.delete_task(&task).unwrap();
    assert!(repo.get_by_id(id).unwrap().is_none());
}

#[test]
fn get_all_lists_most_recent_first_with_stable_ties() {
    let repo = repo();
    let old = repo.insert(&task_at("old", 100, false)).unwrap();
    let tie_a = repo.insert(&task_at("tie a", 200, false)).unwrap();
    let tie_b = repo.insert(&task_at("tie b", 200, false)).unwrap();

    let ids: Vec<_> = repo
        .get_all()
        .load(0, 10)
        .unwrap()
        .into_iter()
        .map(|task| task.task_id)
        .collect();
    assert_eq!(ids, vec![tie_b, tie_a, old]);
}

#[test]
fn paging_source_respects_limit_and_offset() {
    let repo = repo();
    for index in 0..5 {
        repo.insert(&task_at(&format!("t{index}"), index, false))
            .unwrap();
    }

    let source = repo.get_all();
    let titles: Vec<_> = source
        .load(1, 2)
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, vec!["t3", "t2"]);
    assert!(source.load(0, 0).unwrap().is_empty());
    assert!(source.load(10, 5).unwrap().is_empty());
}

#[test]
fn get_by_complete_state_filters_rows() {
    let repo = repo();
    repo.insert(&task_at("done", 1, true)).unwrap();
    repo.insert(&task_at("open", 2, false)).unwrap();

    let done = repo.get_by_complete_state(true).load(0, 10).unwrap();
    let open = repo.get_by_complete_state(false).load(0, 10).unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].title, "done");
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].title, "open");
    assert_eq!(
        repo.get_by_complete_state(true).query(),
        &TaskQuery::ByCompleteState(true)
    );
}

#[test]
fn search_by_name_is_case_insensitive_and_escapes_wildcards() {
    let repo = repo();
    repo.insert(&task_at("My Task 1", 1, false)).unwrap();
    repo.insert(&task_at("50% off", 2, false)).unwrap();
    repo.insert(&task_at("500 items", 3, false)).unwrap();

    let hits = repo.search_by_name("%task%").load(0, 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "My Task 1");

    let literal = repo.search_by_name("%50\\%%").load(0, 10).unwrap();
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].title, "50% off");
}

#[test]
fn search_matches_title_only() {
    let repo = repo();
    let mut task = Task::new("groceries", "remember the milk");
    task.created_at = 1;
    repo.insert(&task).unwrap();

    assert!(repo.search_by_name("%milk%").load(0, 10).unwrap().is_empty());
}

#[test]
fn clear_and_clear_completed_report_removed_rows() {
    let repo = repo();
    repo.insert(&task_at("a", 1, true)).unwrap();
    repo.insert(&task_at("b", 2, true)).unwrap();
    repo.insert(&task_at("c", 3, false)).unwrap();

    assert_eq!(repo.clear_completed_tasks().unwrap(), 2);
    let remaining = repo.get_all().load(0, 10).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "c");

    assert_eq!(repo.clear().unwrap(), 1);
    assert!(repo.get_all().load(0, 10).unwrap().is_empty());
}

#[test]
fn invalid_persisted_completion_flag_is_rejected() {
    let repo = repo();
    repo.connection()
        .execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             INSERT INTO tasks (title, description, is_complete) VALUES ('bad', 'row', 7);",
        )
        .unwrap();

    let err = repo.get_all().load(0, 10).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("is_complete")));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTaskRepository::try_new(conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_tasks_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteTaskRepository::try_new(conn),
        Err(RepoError::MissingRequiredTable("tasks"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE tasks (
            task_id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteTaskRepository::try_new(conn),
        Err(RepoError::MissingRequiredColumn {
            table: "tasks",
            column: "is_complete"
        })
    ));
}

#[test]
fn change_version_advances_only_on_effective_writes() {
    let repo = repo();
    let start = repo.change_version();

    let id = repo.insert(&Task::new("tracked", "row")).unwrap();
    let after_insert = repo.change_version();
    assert!(after_insert > start);

    repo.get_by_id(id).unwrap();
    repo.get_all().load(0, 10).unwrap();
    assert_eq!(repo.change_version(), after_insert);

    repo.update_complete(id, true).unwrap();
    let after_update = repo.change_version();
    assert!(after_update > after_insert);

    assert!(repo.update_complete(999, true).is_err());
    assert_eq!(repo.clear_completed_tasks().unwrap(), 1);
    let after_clear = repo.change_version();
    assert!(after_clear > after_update);

    let mut ghost = Task::new("ghost", "row");
    ghost.task_id = id;
    repo.delete_task(&ghost).unwrap();
    assert_eq!(repo.clear().unwrap(), 0);
    assert_eq!(repo.change_version(), after_clear);
}
