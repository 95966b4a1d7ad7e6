//! Filter selection for the task list.
//!
//! # Responsibility
//! - Define the closed set of list predicates shown by the list screen.
//! - Map each predicate to its store query.
//!
//! # Invariants
//! - Exactly one filter is active per list session.
//! - Search filters always match as a case-insensitive substring of the title.

use crate::repo::task_repo::TaskQuery;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Active predicate selecting which tasks are displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "query", rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Completed,
    Uncompleted,
    Search(String),
}

/// Unknown filter key received from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParseError {
    pub key: String,
}

impl Display for FilterParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown filter `{}`; expected all|completed|uncompleted|search",
            self.key
        )
    }
}

impl Error for FilterParseError {}

impl TaskFilter {
    /// Builds a filter from a UI menu key. `query` is only read for `search`.
    pub fn parse(key: &str, query: Option<&str>) -> Result<Self, FilterParseError> {
        match key.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            "uncompleted" => Ok(Self::Uncompleted),
            "search" => Ok(Self::Search(query.unwrap_or_default().to_string())),
            _ => Err(FilterParseError {
                key: key.to_string(),
            }),
        }
    }

    /// Stable menu key for this filter.
    pub fn key(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Uncompleted => "uncompleted",
            Self::Search(_) => "search",
        }
    }

    /// Toolbar title shown while this filter is active.
    pub fn title(&self) -> String {
        match self {
            Self::All => "All tasks".to_string(),
            Self::Completed => "Completed tasks".to_string(),
            Self::Uncompleted => "Uncompleted tasks".to_string(),
            Self::Search(query) => format!("Search: {query}"),
        }
    }

    /// Store query backing this filter.
    pub fn to_query(&self) -> TaskQuery {
        match self {
            Self::All => TaskQuery::All,
            Self::Completed => TaskQuery::ByCompleteState(true),
            Self::Uncompleted => TaskQuery::ByCompleteState(false),
            Self::Search(query) => TaskQuery::SearchByName(substring_pattern(query)),
        }
    }
}

/// Wraps a raw query as a `LIKE` substring pattern.
///
/// `%`, `_` and `\` typed by the user match literally; the store binds the
/// pattern with `ESCAPE '\'`.
pub fn substring_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
