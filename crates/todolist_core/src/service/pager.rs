//! On-demand paging over a task store query.
//!
//! # Responsibility
//! - Fetch task pages lazily for one list subscription.
//! - Bound the number of tasks held in memory.
//!
//! # Invariants
//! - At most `max_size` tasks are held; oldest pages are dropped first.
//! - A failed load does not advance the read offset.
//! - A pager belongs to exactly one filter generation.
//! - Pages loaded before a store write are discarded on the next load, which
//!   restarts from the first row.

use crate::model::task::Task;
use crate::repo::task_repo::{TaskQuery, TaskRepository};
use log::{debug, error, info};
use std::collections::VecDeque;

/// Paging constants for list subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub page_size: u32,
    pub max_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: 32,
            max_size: 256,
        }
    }
}

impl PagingConfig {
    /// Clamps degenerate values so every page holds at least one task and
    /// the cache holds at least one page.
    pub fn normalized(self) -> Self {
        let page_size = self.page_size.max(1);
        Self {
            page_size,
            max_size: self.max_size.max(page_size),
        }
    }
}

/// Outcome of one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLoad {
    /// A page was appended; `offset` is its first row position.
    Loaded { offset: u32, count: usize },
    /// The query has no more rows.
    Exhausted,
    /// The request targeted a superseded filter and was ignored.
    Stale,
    /// The store failed; nothing was appended.
    Failed(String),
}

/// Paged subscription to one store query.
#[derive(Debug, Clone)]
pub struct TaskPager {
    query: TaskQuery,
    generation: u64,
    config: PagingConfig,
    pages: VecDeque<Vec<Task>>,
    held: usize,
    next_offset: u32,
    dropped_before: u32,
    exhausted: bool,
    /// Store `change_version` the held pages were read at.
    loaded_at: Option<u64>,
}

impl TaskPager {
    pub fn new(query: TaskQuery, generation: u64, config: PagingConfig) -> Self {
        Self {
            query,
            generation,
            config: config.normalized(),
            pages: VecDeque::new(),
            held: 0,
            next_offset: 0,
            dropped_before: 0,
            exhausted: false,
            loaded_at: None,
        }
    }

    pub fn query(&self) -> &TaskQuery {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> PagingConfig {
        self.config
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Number of leading rows evicted to respect `max_size`.
    pub fn dropped_before(&self) -> u32 {
        self.dropped_before
    }

    /// Tasks currently held, in listing order.
    pub fn items(&self) -> Vec<Task> {
        self.pages.iter().flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.held
    }

    pub fn is_empty(&self) -> bool {
        self.held == 0
    }

    /// Drops every held page; the next load starts at the first row.
    pub fn reset(&mut self) {
        self.pages.clear();
        self.held = 0;
        self.next_offset = 0;
        self.dropped_before = 0;
        self.exhausted = false;
        self.loaded_at = None;
    }

    /// Fetches the next page from `repo`.
    ///
    /// If `repo` was written since the held pages were read, they are
    /// dropped first and the returned page is the first one again.
    pub fn load_next<R: TaskRepository>(&mut self, repo: &R) -> PageLoad {
        let version = repo.change_version();
        if self.loaded_at.is_some_and(|seen| seen != version) {
            info!(
                "event=page_invalidate module=pager status=ok generation={} dropped_rows={}",
                self.generation, self.held
            );
            self.reset();
        }

        if self.exhausted {
            return PageLoad::Exhausted;
        }

        let offset = self.next_offset;
        let page = match repo.load_page(&self.query, offset, self.config.page_size) {
            Ok(page) => page,
            Err(err) => {
                error!(
                    "event=page_load module=pager status=error generation={} offset={} error={}",
                    self.generation, offset, err
                );
                return PageLoad::Failed(err.to_string());
            }
        };

        self.loaded_at = Some(version);
        let count = page.len();
        if count < self.config.page_size as usize {
            self.exhausted = true;
        }
        if count == 0 {
            return PageLoad::Exhausted;
        }

        self.next_offset = offset.saturating_add(count as u32);
        self.held += count;
        self.pages.push_back(page);
        self.evict_overflow();

        debug!(
            "event=page_load module=pager status=ok generation={} offset={} count={} held={}",
            self.generation, offset, count, self.held
        );
        PageLoad::Loaded { offset, count }
    }

    fn evict_overflow(&mut self) {
        while self.held > self.config.max_size as usize && self.pages.len() > 1 {
            if let Some(evicted) = self.pages.pop_front() {
                self.held -= evicted.len();
                self.dropped_before = self.dropped_before.saturating_add(evicted.len() as u32);
            }
        }
    }
}
