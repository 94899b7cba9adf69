//! Core domain logic for the tidytask task list manager.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    validate_task_text, Task, TaskId, TaskValidationError, MIN_TASK_TEXT_CHARS,
};
pub use storage::{
    SnapshotLoad, SnapshotStore, SqliteSnapshotStore, StorageError, StorageResult, TASKS_KEY,
};
pub use store::{StoreError, StoreResult, TaskStore};
pub use view::{counts, project, Filter, SortMode, TaskCounts};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
