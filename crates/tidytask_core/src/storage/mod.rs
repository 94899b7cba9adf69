//! Persistence bridge between the task store and the local key/value store.
//!
//! # Responsibility
//! - Persist the full task collection as one JSON snapshot under a single
//!   well-known key.
//! - Load that snapshot at startup without ever aborting the application.
//!
//! # Invariants
//! - The persisted value under [`TASKS_KEY`] is a JSON array of
//!   `{id, text, completed, createdAt}` records; external readers and
//!   writers of this key must honor this shape.
//! - Invalid persisted state is rejected as `Corrupt`, never silently
//!   admitted into the store.

use crate::db::DbError;
use crate::model::task::{Task, MIN_TASK_TEXT_CHARS};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key holding the serialized task snapshot.
pub const TASKS_KEY: &str = "todoTasks";

pub type StorageResult<T> = Result<T, StorageError>;

/// Operational failures of snapshot persistence.
///
/// Note that a corrupt snapshot is not an error: it surfaces as
/// [`SnapshotLoad::Corrupt`] so callers can fall back to an empty store.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Serialize(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "snapshot serialization failed: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Explicit three-way result of a snapshot load.
#[derive(Debug)]
pub enum SnapshotLoad {
    /// No snapshot has been written yet; the store starts empty.
    Missing,
    /// A well-formed snapshot in persisted order.
    Loaded(Vec<Task>),
    /// The persisted value is unparseable or violates store invariants.
    /// Callers degrade to an empty store and surface `detail`.
    Corrupt { detail: String },
}

/// Persistence backend contract for the task store.
pub trait SnapshotStore {
    fn load(&self) -> StorageResult<SnapshotLoad>;
    fn save(&self, tasks: &[Task]) -> StorageResult<()>;
}

/// SQLite-backed snapshot store over the `local_store` key/value table.
pub struct SqliteSnapshotStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SnapshotStore for SqliteSnapshotStore<'_> {
    fn load(&self) -> StorageResult<SnapshotLoad> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM local_store WHERE key = ?1;")?;
        let mut rows = stmt.query([TASKS_KEY])?;

        let Some(row) = rows.next()? else {
            return Ok(SnapshotLoad::Missing);
        };
        let raw: String = row.get(0)?;

        let tasks: Vec<Task> = match serde_json::from_str(&raw) {
            Ok(tasks) => tasks,
            Err(err) => {
                return Ok(SnapshotLoad::Corrupt {
                    detail: format!("unparseable snapshot under `{TASKS_KEY}`: {err}"),
                });
            }
        };

        match check_snapshot_invariants(&tasks) {
            Ok(()) => Ok(SnapshotLoad::Loaded(tasks)),
            Err(detail) => Ok(SnapshotLoad::Corrupt { detail }),
        }
    }

    fn save(&self, tasks: &[Task]) -> StorageResult<()> {
        let serialized = serde_json::to_string(tasks)?;
        self.conn.execute(
            "INSERT INTO local_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![TASKS_KEY, serialized],
        )?;
        Ok(())
    }
}

/// Checks a loaded snapshot against store invariants.
///
/// External writers of the snapshot key can produce parseable JSON that
/// still breaks the store: duplicate ids, case-folded duplicate text, or
/// text below the admission minimum. Such data is rejected as corrupt
/// instead of masked.
fn check_snapshot_invariants(tasks: &[Task]) -> Result<(), String> {
    let mut seen_ids = HashSet::new();
    let mut seen_texts = HashSet::new();

    for task in tasks {
        if !seen_ids.insert(task.id) {
            return Err(format!("duplicate task id `{}` in snapshot", task.id));
        }
        if task.text.trim() != task.text {
            return Err(format!("untrimmed task text for id `{}`", task.id));
        }
        if task.text.chars().count() < MIN_TASK_TEXT_CHARS {
            return Err(format!(
                "task text for id `{}` is shorter than {MIN_TASK_TEXT_CHARS} characters",
                task.id
            ));
        }
        if !seen_texts.insert(task.text.to_lowercase()) {
            return Err(format!(
                "case-insensitive duplicate task text `{}` in snapshot",
                task.text
            ));
        }
    }

    Ok(())
}
