//! Task store: the single source of truth for task state.
//!
//! # Responsibility
//! - Own the ordered task collection and the monotonic id counter.
//! - Apply validated mutations and write the snapshot through on each one.
//!
//! # Invariants
//! - Store order is creation order; views reorder copies, never the store.
//! - In-memory state and the persisted snapshot agree after every
//!   successful call; a failed write-through rolls the mutation back.
//! - A corrupt snapshot degrades to an empty store with a recorded warning
//!   instead of failing `open`.

use crate::model::task::{validate_task_text, Task, TaskId, TaskValidationError};
use crate::storage::{SnapshotLoad, SnapshotStore, StorageError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures of task store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Input rejected by validation; the store is unchanged.
    Validation(TaskValidationError),
    /// The write-through to the persistence backend failed.
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Ordered task collection with write-through persistence.
///
/// Owned explicitly by the presentation root and injectable with any
/// [`SnapshotStore`] backend, so store logic is testable without a UI.
pub struct TaskStore<S: SnapshotStore> {
    backend: S,
    tasks: Vec<Task>,
    next_id: TaskId,
    load_warning: Option<String>,
}

impl<S: SnapshotStore> TaskStore<S> {
    /// Opens the store from the persisted snapshot.
    ///
    /// - Missing snapshot: the store starts empty.
    /// - Corrupt snapshot: the store starts empty and records a warning;
    ///   startup never aborts over bad persisted data.
    pub fn open(backend: S) -> StoreResult<Self> {
        let (tasks, load_warning) = match backend.load()? {
            SnapshotLoad::Missing => (Vec::new(), None),
            SnapshotLoad::Loaded(tasks) => {
                info!(
                    "event=snapshot_loaded module=store status=ok count={}",
                    tasks.len()
                );
                (tasks, None)
            }
            SnapshotLoad::Corrupt { detail } => {
                warn!("event=snapshot_corrupt module=store status=degraded detail={detail}");
                (Vec::new(), Some(detail))
            }
        };

        let next_id = tasks.iter().map(|task| task.id).max().map_or(1, |id| id + 1);

        Ok(Self {
            backend,
            tasks,
            next_id,
            load_warning,
        })
    }

    /// Validates raw input and appends a new task.
    ///
    /// On success the task is persisted and its fresh id returned. On
    /// validation failure the store is unchanged and the rejection reason
    /// is returned for display.
    pub fn add(&mut self, raw: &str) -> StoreResult<TaskId> {
        let text = validate_task_text(raw, &self.tasks)?;

        let id = self.next_id;
        self.tasks.push(Task::new(id, text));
        if let Err(err) = self.persist() {
            self.tasks.pop();
            return Err(err.into());
        }
        self.next_id += 1;

        info!("event=task_added module=store status=ok id={id}");
        Ok(id)
    }

    /// Flips completion for the matching task.
    ///
    /// Returns `false` when no task matches; an absent id is a no-op, not
    /// an error, and triggers no write.
    pub fn toggle(&mut self, id: TaskId) -> StoreResult<bool> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("event=task_toggled module=store status=noop id={id}");
            return Ok(false);
        };

        self.tasks[index].toggle();
        if let Err(err) = self.persist() {
            self.tasks[index].toggle();
            return Err(err.into());
        }

        info!(
            "event=task_toggled module=store status=ok id={id} completed={}",
            self.tasks[index].completed
        );
        Ok(true)
    }

    /// Deletes the matching task.
    ///
    /// Returns `false` when no task matches; an absent id is a no-op.
    pub fn remove(&mut self, id: TaskId) -> StoreResult<bool> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("event=task_removed module=store status=noop id={id}");
            return Ok(false);
        };

        let removed = self.tasks.remove(index);
        if let Err(err) = self.persist() {
            self.tasks.insert(index, removed);
            return Err(err.into());
        }

        info!("event=task_removed module=store status=ok id={id}");
        Ok(true)
    }

    /// Empties the collection and returns how many tasks were removed.
    ///
    /// Irreversible; the confirmation step lives in the presentation layer.
    pub fn clear_all(&mut self) -> StoreResult<usize> {
        let cleared = std::mem::take(&mut self.tasks);
        if let Err(err) = self.persist() {
            self.tasks = cleared;
            return Err(err.into());
        }

        info!(
            "event=store_cleared module=store status=ok count={}",
            cleared.len()
        );
        Ok(cleared.len())
    }

    /// Tasks in store (creation) order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Warning recorded when the persisted snapshot had to be discarded.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    fn persist(&self) -> Result<(), StorageError> {
        self.backend.save(&self.tasks)
    }
}
