//! Repository port for task-letter persistence and lookup.

use crate::task_letter::domain::{
    NewTaskLetter, OfficialCompletion, RegisterNumber, TaskLetter, TaskLetterId, TaskLetterPatch,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task-letter repository operations.
pub type TaskLetterRepositoryResult<T> = Result<T, TaskLetterRepositoryError>;

/// Task-letter persistence contract.
///
/// Implementations must enforce register-number uniqueness themselves; the
/// service-level check only improves error reporting.
#[async_trait]
pub trait TaskLetterRepository: Send + Sync {
    /// Stores a new task letter and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterRepositoryError::DuplicateRegisterNumber`] when the
    /// register number is already in use.
    async fn store(&self, letter: &NewTaskLetter) -> TaskLetterRepositoryResult<TaskLetter>;

    /// Writes the fields named by `patch` and stamps `updated_at`.
    ///
    /// Columns the patch leaves alone keep whatever value is stored when the
    /// write happens, so concurrent edits to other fields survive. Returns
    /// the letter as stored after the write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterRepositoryError::NotFound`] when the letter does
    /// not exist and [`TaskLetterRepositoryError::DuplicateRegisterNumber`]
    /// when the new register number belongs to another letter.
    async fn update_fields(
        &self,
        id: TaskLetterId,
        patch: &TaskLetterPatch,
        updated_at: DateTime<Utc>,
    ) -> TaskLetterRepositoryResult<TaskLetter>;

    /// Overwrites the four official completion fields and stamps
    /// `updated_at`, touching no other column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterRepositoryError::NotFound`] when the letter does
    /// not exist.
    async fn update_official_details(
        &self,
        id: TaskLetterId,
        official: &OfficialCompletion,
        updated_at: DateTime<Utc>,
    ) -> TaskLetterRepositoryResult<TaskLetter>;

    /// Finds a task letter by identifier.
    ///
    /// Returns `None` when the letter does not exist.
    async fn find_by_id(&self, id: TaskLetterId) -> TaskLetterRepositoryResult<Option<TaskLetter>>;

    /// Finds the task letter holding a register number.
    ///
    /// Returns `None` when the register number is unused.
    async fn find_by_register_number(
        &self,
        register_number: &RegisterNumber,
    ) -> TaskLetterRepositoryResult<Option<TaskLetter>>;

    /// Returns every task letter, newest `created_at` first.
    ///
    /// Letters created at the same instant are ordered by descending id.
    async fn list_newest_first(&self) -> TaskLetterRepositoryResult<Vec<TaskLetter>>;

    /// Removes a task letter.
    ///
    /// Returns `true` only when a letter existed and was removed.
    async fn delete(&self, id: TaskLetterId) -> TaskLetterRepositoryResult<bool>;
}

/// Errors returned by task-letter repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskLetterRepositoryError {
    /// Another task letter already holds the register number.
    #[error("duplicate register number: {0}")]
    DuplicateRegisterNumber(RegisterNumber),

    /// The task letter was not found.
    #[error("task letter not found: {0}")]
    NotFound(TaskLetterId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskLetterRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
