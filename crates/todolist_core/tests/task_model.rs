use todolist_core::{Task, TaskFilter, UNSAVED_TASK_ID};

#[test]
fn task_serialization_uses_expected_wire_fields() {
    let task = Task {
        task_id: 12,
        title: "Water plants".to_string(),
        description: "balcony and kitchen".to_string(),
        is_complete: true,
        created_at: 1_700_000_000_000,
    };

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["task_id"], 12);
    assert_eq!(json["title"], "Water plants");
    assert_eq!(json["description"], "balcony and kitchen");
    assert_eq!(json["is_complete"], true);
    assert_eq!(json["created_at"], 1_700_000_000_000_i64);

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn filter_serialization_is_tagged_by_kind() {
    let search = serde_json::to_value(TaskFilter::Search("milk".to_string())).unwrap();
    assert_eq!(search["kind"], "search");
    assert_eq!(search["query"], "milk");

    let completed = serde_json::to_value(TaskFilter::Completed).unwrap();
    assert_eq!(completed["kind"], "completed");

    let decoded: TaskFilter = serde_json::from_value(search).unwrap();
    assert_eq!(decoded, TaskFilter::Search("milk".to_string()));
}

#[test]
fn filter_keys_roundtrip_through_parse() {
    for filter in [
        TaskFilter::All,
        TaskFilter::Completed,
        TaskFilter::Uncompleted,
        TaskFilter::Search("q".to_string()),
    ] {
        let query = match &filter {
            TaskFilter::Search(query) => Some(query.as_str()),
            _ => None,
        };
        assert_eq!(TaskFilter::parse(filter.key(), query).unwrap(), filter);
    }
}

#[test]
fn new_tasks_are_unsaved() {
    assert_eq!(Task::new("t", "d").task_id, UNSAVED_TASK_ID);
}
