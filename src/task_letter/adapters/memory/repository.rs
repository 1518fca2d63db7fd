//! In-memory task-letter repository for tests and embedders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task_letter::{
    domain::{
        NewTaskLetter, OfficialCompletion, RegisterNumber, TaskLetter, TaskLetterId,
        TaskLetterPatch, rules,
    },
    ports::{TaskLetterRepository, TaskLetterRepositoryError, TaskLetterRepositoryResult},
};

/// Thread-safe in-memory task-letter repository.
///
/// Identifiers are assigned sequentially from 1, like a `BIGSERIAL` column.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskLetterRepository {
    state: Arc<RwLock<InMemoryTaskLetterState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskLetterState {
    letters: HashMap<TaskLetterId, TaskLetter>,
    register_index: HashMap<RegisterNumber, TaskLetterId>,
    last_id: i64,
}

impl InMemoryTaskLetterRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskLetterRepositoryResult<RwLockReadGuard<'_, InMemoryTaskLetterState>> {
        self.state.read().map_err(|err| {
            TaskLetterRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskLetterRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskLetterState>> {
        self.state.write().map_err(|err| {
            TaskLetterRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryTaskLetterState {
    fn next_id(&mut self) -> TaskLetterRepositoryResult<TaskLetterId> {
        let candidate = self.last_id.checked_add(1).ok_or_else(|| {
            TaskLetterRepositoryError::persistence(std::io::Error::other(
                "task letter id sequence exhausted",
            ))
        })?;
        let id = TaskLetterId::new(candidate).map_err(TaskLetterRepositoryError::persistence)?;
        self.last_id = candidate;
        Ok(id)
    }

    fn move_register_number(
        &mut self,
        id: TaskLetterId,
        previous: &RegisterNumber,
        next: &RegisterNumber,
    ) -> TaskLetterRepositoryResult<()> {
        if next == previous {
            return Ok(());
        }
        if self.register_index.contains_key(next) {
            return Err(TaskLetterRepositoryError::DuplicateRegisterNumber(
                next.clone(),
            ));
        }
        self.register_index.remove(previous);
        self.register_index.insert(next.clone(), id);
        Ok(())
    }
}

#[async_trait]
impl TaskLetterRepository for InMemoryTaskLetterRepository {
    async fn store(&self, letter: &NewTaskLetter) -> TaskLetterRepositoryResult<TaskLetter> {
        let mut state = self.write()?;
        let register_number = &letter.details().register_number;
        if state.register_index.contains_key(register_number) {
            return Err(TaskLetterRepositoryError::DuplicateRegisterNumber(
                register_number.clone(),
            ));
        }

        let id = state.next_id()?;
        let stored = letter.clone().into_task_letter(id);
        state
            .register_index
            .insert(stored.register_number().clone(), id);
        state.letters.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_fields(
        &self,
        id: TaskLetterId,
        patch: &TaskLetterPatch,
        updated_at: DateTime<Utc>,
    ) -> TaskLetterRepositoryResult<TaskLetter> {
        let mut state = self.write()?;
        let current = state
            .letters
            .get(&id)
            .ok_or(TaskLetterRepositoryError::NotFound(id))?;
        let previous_register_number = current.register_number().clone();
        let merged = rules::merge_update(current, patch.clone(), updated_at);

        state.move_register_number(id, &previous_register_number, merged.register_number())?;
        state.letters.insert(id, merged.clone());
        Ok(merged)
    }

    async fn update_official_details(
        &self,
        id: TaskLetterId,
        official: &OfficialCompletion,
        updated_at: DateTime<Utc>,
    ) -> TaskLetterRepositoryResult<TaskLetter> {
        let mut state = self.write()?;
        let current = state
            .letters
            .get(&id)
            .ok_or(TaskLetterRepositoryError::NotFound(id))?;
        let merged = rules::merge_official_details(current, official.clone(), updated_at);

        state.letters.insert(id, merged.clone());
        Ok(merged)
    }

    async fn find_by_id(&self, id: TaskLetterId) -> TaskLetterRepositoryResult<Option<TaskLetter>> {
        let state = self.read()?;
        Ok(state.letters.get(&id).cloned())
    }

    async fn find_by_register_number(
        &self,
        register_number: &RegisterNumber,
    ) -> TaskLetterRepositoryResult<Option<TaskLetter>> {
        let state = self.read()?;
        let letter = state
            .register_index
            .get(register_number)
            .and_then(|id| state.letters.get(id))
            .cloned();
        Ok(letter)
    }

    async fn list_newest_first(&self) -> TaskLetterRepositoryResult<Vec<TaskLetter>> {
        let state = self.read()?;
        let mut letters: Vec<TaskLetter> = state.letters.values().cloned().collect();
        letters.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(letters)
    }

    async fn delete(&self, id: TaskLetterId) -> TaskLetterRepositoryResult<bool> {
        let mut state = self.write()?;
        let Some(removed) = state.letters.remove(&id) else {
            return Ok(false);
        };
        state.register_index.remove(removed.register_number());
        Ok(true)
    }
}
