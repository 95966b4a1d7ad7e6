//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `todolist_core` linkage.
//! - Exercise schema bootstrap and one list query against an in-memory store.

use todolist_core::db::migrations::latest_version;
use todolist_core::db::open_db_in_memory;
use todolist_core::{PageLoad, SqliteTaskRepository, TaskListViewModel};

fn main() {
    println!("todolist_core ping={}", todolist_core::ping());
    println!("todolist_core version={}", todolist_core::core_version());

    let probe = open_db_in_memory()
        .map_err(|err| err.to_string())
        .and_then(|conn| SqliteTaskRepository::try_new(conn).map_err(|err| err.to_string()));
    match probe {
        Ok(repo) => {
            let mut list = TaskListViewModel::new(repo);
            let status = match list.load_next_page() {
                PageLoad::Failed(err) => format!("error ({err})"),
                _ => "ok".to_string(),
            };
            println!("todolist_core schema={} list={}", latest_version(), status);
        }
        Err(err) => {
            eprintln!("todolist_core store probe failed: {err}");
            std::process::exit(1);
        }
    }
}
