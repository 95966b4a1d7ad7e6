//! Domain model for the to-do list.
//!
//! # Responsibility
//! - Define the task record and the list filter selection.
//!
//! # Invariants
//! - Every persisted task is identified by a store-assigned `TaskId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod filter;
pub mod task;
