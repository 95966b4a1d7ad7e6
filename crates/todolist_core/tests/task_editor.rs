use todolist_core::db::open_db_in_memory;
use todolist_core::{
    EditorEvent, EditorMessage, SaveOutcome, ServiceError, SqliteTaskRepository, Task,
    TaskEditorViewModel, TaskRepository, DEFAULT_EVENT_CAPACITY,
};

fn repo() -> SqliteTaskRepository {
    SqliteTaskRepository::try_new(open_db_in_memory().unwrap()).unwrap()
}

fn row_count(repo: &SqliteTaskRepository) -> i64 {
    repo.connection()
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_inserts_new_task_and_emits_one_event() {
    let repo = repo();
    let mut editor = TaskEditorViewModel::new(&repo);
    editor.set_title("Call mom");
    editor.set_description("Sunday afternoon");

    let SaveOutcome::Created(id) = editor.save().unwrap() else {
        panic!("expected a created task");
    };

    let stored = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(stored.title, "Call mom");
    assert_eq!(stored.description, "Sunday afternoon");
    assert!(!stored.is_complete);
    assert_eq!(
        editor.events().drain(),
        vec![EditorEvent::NavigateToDoList(EditorMessage::TaskAdded)]
    );
}

#[test]
fn empty_title_or_description_saves_nothing_and_emits_nothing() {
    let repo = repo();
    let mut editor = TaskEditorViewModel::new(&repo);

    assert_eq!(editor.save().unwrap(), SaveOutcome::Skipped);

    editor.set_title("only a title");
    assert_eq!(editor.save().unwrap(), SaveOutcome::Skipped);

    editor.set_title("");
    editor.set_description("only a description");
    assert_eq!(editor.save().unwrap(), SaveOutcome::Skipped);

    assert_eq!(row_count(&repo), 0);
    assert!(editor.events().is_empty());
}

#[test]
fn empty_fields_on_loaded_task_leave_it_untouched() {
    let repo = repo();
    let id = repo.insert(&Task::new("original", "text")).unwrap();
    let mut editor = TaskEditorViewModel::new(&repo);
    editor.load(id).unwrap();

    editor.set_description("");
    assert_eq!(editor.save().unwrap(), SaveOutcome::Skipped);

    assert_eq!(repo.get_by_id(id).unwrap().unwrap().description, "text");
    assert!(editor.events().is_empty());
}

#[test]
fn editing_existing_task_updates_same_id() {
    let repo = repo();
    let mut original = Task::new("draft", "first version");
    original.is_complete = true;
    let id = repo.insert(&original).unwrap();

    let mut editor = TaskEditorViewModel::new(&repo);
    let loaded = editor.load(id).unwrap().clone();
    assert_eq!(loaded.task_id, id);
    assert_eq!(editor.title(), "draft");
    assert_eq!(editor.description(), "first version");
    assert!(editor.is_editing());

    editor.set_title("final");
    editor.set_description("second version");
    assert_eq!(editor.save().unwrap(), SaveOutcome::Updated(id));

    assert_eq!(row_count(&repo), 1);
    let stored = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(stored.title, "final");
    assert_eq!(stored.description, "second version");
    assert!(stored.is_complete);
    assert_eq!(stored.created_at, loaded.created_at);
    assert_eq!(
        editor.events().poll(),
        Some(EditorEvent::NavigateToDoList(EditorMessage::TaskUpdated))
    );
    assert_eq!(editor.events().poll(), None);
}

#[test]
fn events_wait_until_editor_screen_is_active() {
    let repo = repo();
    let mut editor = TaskEditorViewModel::new(&repo);
    editor.events().set_active(false);
    editor.set_title("queued");
    editor.set_description("while paused");
    editor.save().unwrap();

    assert_eq!(editor.events().poll(), None);
    editor.events().set_active(true);
    assert_eq!(
        editor.events().poll(),
        Some(EditorEvent::NavigateToDoList(EditorMessage::TaskAdded))
    );
}

#[test]
fn updating_a_task_deleted_behind_the_editor_fails() {
    let repo = repo();
    let id = repo.insert(&Task::new("short", "lived")).unwrap();
    let mut editor = TaskEditorViewModel::new(&repo);
    let task = editor.load(id).unwrap().clone();
    repo.delete_task(&task).unwrap();

    editor.set_title("too late");
    assert!(editor.save().is_err());
    assert!(editor.events().is_empty());
}

#[test]
fn save_with_full_event_queue_writes_nothing() {
    let repo = repo();
    let mut editor = TaskEditorViewModel::new(&repo);
    editor.events().set_active(false);
    editor.set_title("repeat");
    editor.set_description("never polled");

    for _ in 0..DEFAULT_EVENT_CAPACITY {
        assert!(matches!(editor.save().unwrap(), SaveOutcome::Created(_)));
    }
    let err = editor.save().unwrap_err();

    assert!(matches!(err, ServiceError::EventQueueFull(_)));
    assert_eq!(row_count(&repo), DEFAULT_EVENT_CAPACITY as i64);
    editor.events().set_active(true);
    assert_eq!(editor.events().drain().len(), DEFAULT_EVENT_CAPACITY);

    assert!(matches!(editor.save().unwrap(), SaveOutcome::Created(_)));
    assert_eq!(editor.events().len(), 1);
}
