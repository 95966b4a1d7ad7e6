//! List and editor view-models plus their building blocks.
//!
//! # Responsibility
//! - Turn UI intents (filter changes, saves, deletes) into store calls.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod error;
pub mod events;
pub mod filter_selector;
pub mod pager;
pub mod task_editor;
pub mod task_list;
