//! View projection: filtered and sorted task listings plus summary counts.
//!
//! # Responsibility
//! - Derive display order and counts as pure functions of the task slice
//!   and the caller's filter/sort selections.
//!
//! # Invariants
//! - Projection never mutates or reorders the underlying store.
//! - Sorting is stable, so equal keys keep store (creation) order.
//! - Counts are always computed over the unfiltered store.

use crate::model::task::Task;

/// Subset of tasks selected for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// No filtering.
    #[default]
    All,
    /// Tasks with `completed == false`.
    Active,
    /// Tasks with `completed == true`.
    Completed,
}

impl Filter {
    fn admits(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

/// Ordering rule applied to the filtered subset, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// `created_at` descending.
    #[default]
    Newest,
    /// `created_at` ascending.
    Oldest,
    /// Text ascending, case-insensitive; stable for ties.
    Alphabetical,
    /// Incomplete tasks before completed ones, otherwise stable.
    CompletedLast,
}

/// Summary counts over the unfiltered store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

/// Projects tasks into display order.
///
/// Filters first, then applies a stable sort to the filtered subset. The
/// returned references borrow from `tasks`; the store itself is untouched.
pub fn project(tasks: &[Task], filter: Filter, sort: SortMode) -> Vec<&Task> {
    let mut projected: Vec<&Task> = tasks.iter().filter(|task| filter.admits(task)).collect();

    match sort {
        SortMode::Newest => projected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Oldest => projected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortMode::Alphabetical => {
            projected.sort_by(|a, b| a.text.to_lowercase().cmp(&b.text.to_lowercase()))
        }
        SortMode::CompletedLast => projected.sort_by_key(|task| task.completed),
    }

    projected
}

/// Computes summary counts over the full task slice.
pub fn counts(tasks: &[Task]) -> TaskCounts {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    TaskCounts {
        total,
        completed,
        remaining: total - completed,
    }
}
