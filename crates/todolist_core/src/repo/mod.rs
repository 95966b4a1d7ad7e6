//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the task store contract consumed by view-models.
//! - Isolate SQLite query details from list/editor orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - The store does not validate task text; the editor does.

pub mod task_repo;
