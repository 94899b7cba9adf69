//! Task domain model and input validation.
//!
//! # Responsibility
//! - Define the canonical task record persisted in snapshots.
//! - Validate raw input before a task may enter the store.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `text` is trimmed and immutable after creation; only `completed` may
//!   change afterwards.
//! - Serialized field names match the external snapshot contract
//!   (`createdAt`, not `created_at`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum trimmed length for admitted task text, in characters.
pub const MIN_TASK_TEXT_CHARS: usize = 3;

/// Stable identifier for one task.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
/// Ids are assigned from a monotonic counter, so they also encode creation
/// order within one store.
pub type TaskId = u64;

/// Canonical task record.
///
/// The serialized shape is part of the external storage contract: a JSON
/// object with `id`, `text`, `completed` and `createdAt` fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique id, monotonic by creation time.
    pub id: TaskId,
    /// Trimmed task text. Never edited after creation.
    pub text: String,
    /// Completion flag, flipped by the store's toggle operation.
    pub completed: bool,
    /// Creation timestamp. Serialized as an ISO-8601 string.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task stamped with the current time.
    ///
    /// Callers are expected to pass text that already went through
    /// [`validate_task_text`]; this constructor does not re-validate.
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self::with_created_at(id, text, Utc::now())
    }

    /// Creates a task with a caller-provided creation time.
    ///
    /// Used by snapshot loading and by tests that need deterministic
    /// ordering.
    pub fn with_created_at(
        id: TaskId,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at,
        }
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Rejection reasons for raw task input.
///
/// All variants are recoverable user-input errors; none of them is fatal
/// and none of them mutates the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Input is empty after trimming.
    EmptyInput,
    /// Trimmed input is shorter than [`MIN_TASK_TEXT_CHARS`].
    TooShort,
    /// An existing task already carries this text, ignoring case.
    DuplicateTask,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "task text is empty"),
            Self::TooShort => write!(
                f,
                "task text must be at least {MIN_TASK_TEXT_CHARS} characters long"
            ),
            Self::DuplicateTask => write!(f, "task text duplicates an existing task"),
        }
    }
}

impl Error for TaskValidationError {}

/// Validates raw input against the current task set.
///
/// Returns the trimmed text as the admitted candidate, or the first failing
/// check in order: empty, too short, duplicate.
///
/// # Invariants
/// - Pure: no side effects on `existing`.
/// - Length is counted in characters, not bytes, so multi-byte input is not
///   over-rejected.
pub fn validate_task_text(raw: &str, existing: &[Task]) -> Result<String, TaskValidationError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyInput);
    }
    if trimmed.chars().count() < MIN_TASK_TEXT_CHARS {
        return Err(TaskValidationError::TooShort);
    }

    let lowered = trimmed.to_lowercase();
    if existing.iter().any(|task| task.text.to_lowercase() == lowered) {
        return Err(TaskValidationError::DuplicateTask);
    }

    Ok(trimmed.to_string())
}
