//! Current-filter state and query dispatch.
//!
//! # Responsibility
//! - Hold the active `TaskFilter` of one list session.
//! - Issue a fresh paged subscription on every filter change.
//!
//! # Invariants
//! - `generation` strictly increases on every `set_filter` call.
//! - Only the subscription of the latest generation is current.

use crate::model::filter::TaskFilter;
use crate::service::pager::{PagingConfig, TaskPager};
use log::info;

/// Filter state of one list session.
#[derive(Debug, Clone)]
pub struct FilterSelector {
    current: TaskFilter,
    generation: u64,
    config: PagingConfig,
}

impl Default for FilterSelector {
    fn default() -> Self {
        Self::new(PagingConfig::default())
    }
}

impl FilterSelector {
    /// Starts on `TaskFilter::All` at generation 0.
    pub fn new(config: PagingConfig) -> Self {
        Self {
            current: TaskFilter::All,
            generation: 0,
            config,
        }
    }

    pub fn current(&self) -> &TaskFilter {
        &self.current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Subscription for the current filter without bumping the generation.
    pub fn subscribe(&self) -> TaskPager {
        TaskPager::new(self.current.to_query(), self.generation, self.config)
    }

    /// Replaces the active filter and returns its new subscription.
    ///
    /// Re-selecting the same filter still starts a new subscription so a
    /// refresh always re-queries the store.
    pub fn set_filter(&mut self, filter: TaskFilter) -> TaskPager {
        self.generation += 1;
        self.current = filter;
        info!(
            "event=filter_change module=list status=ok filter={} generation={}",
            self.current.key(),
            self.generation
        );
        self.subscribe()
    }

    /// Returns whether `generation` still identifies the current filter.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::FilterSelector;
    use crate::model::filter::TaskFilter;
    use crate::repo::task_repo::TaskQuery;

    #[test]
    fn starts_with_all_filter() {
        let selector = FilterSelector::default();
        assert_eq!(selector.current(), &TaskFilter::All);
        assert_eq!(selector.subscribe().query(), &TaskQuery::All);
    }

    #[test]
    fn each_change_supersedes_previous_subscription() {
        let mut selector = FilterSelector::default();
        let first = selector.set_filter(TaskFilter::Completed);
        let second = selector.set_filter(TaskFilter::Search("milk".to_string()));

        assert!(!selector.is_current(first.generation()));
        assert!(selector.is_current(second.generation()));
        assert_eq!(
            second.query(),
            &TaskQuery::SearchByName("%milk%".to_string())
        );
    }
}
