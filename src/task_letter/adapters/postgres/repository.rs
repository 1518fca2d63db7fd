//! `PostgreSQL` repository implementation for task-letter storage.

use super::{
    models::{NewTaskLetterRow, OfficialDetailsChangeset, TaskLetterPatchChangeset, TaskLetterRow},
    schema::task_letters,
};
use crate::task_letter::{
    domain::{
        NewTaskLetter, OfficialCompletion, RegisterNumber, TaskLetter, TaskLetterId,
        TaskLetterPatch,
    },
    ports::{TaskLetterRepository, TaskLetterRepositoryError, TaskLetterRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task-letter adapters.
pub type TaskLetterPgPool = Pool<ConnectionManager<PgConnection>>;

/// Name of the unique index guarding register numbers.
const REGISTER_NUMBER_UNIQUE_INDEX: &str = "idx_task_letters_register_number_unique";

/// Schema for the `task_letters` table.
pub const CREATE_TASK_LETTERS_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_task_letters/up.sql");

/// `PostgreSQL`-backed task-letter repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskLetterRepository {
    pool: TaskLetterPgPool,
}

impl PostgresTaskLetterRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskLetterPgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool for `database_url` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterRepositoryError::Persistence`] when the pool
    /// cannot establish its initial connections.
    pub fn connect(database_url: &str, max_connections: u32) -> TaskLetterRepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(max_connections)
            .build(manager)
            .map_err(TaskLetterRepositoryError::persistence)?;
        Ok(Self::new(pool))
    }

    /// Creates the `task_letters` table and its indexes when missing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterRepositoryError::Persistence`] when the schema
    /// statements fail.
    pub async fn apply_schema(&self) -> TaskLetterRepositoryResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(CREATE_TASK_LETTERS_SQL)
                .map_err(TaskLetterRepositoryError::persistence)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskLetterRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskLetterRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskLetterRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskLetterRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskLetterRepository for PostgresTaskLetterRepository {
    async fn store(&self, letter: &NewTaskLetter) -> TaskLetterRepositoryResult<TaskLetter> {
        let register_number = letter.details().register_number.clone();
        let new_row = NewTaskLetterRow::from_new(letter);

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(task_letters::table)
                .values(&new_row)
                .returning(TaskLetterRow::as_returning())
                .get_result::<TaskLetterRow>(connection)
                .map_err(|err| map_write_error(err, Some(&register_number)))?;
            row_to_letter(row)
        })
        .await
    }

    async fn update_fields(
        &self,
        id: TaskLetterId,
        patch: &TaskLetterPatch,
        updated_at: DateTime<Utc>,
    ) -> TaskLetterRepositoryResult<TaskLetter> {
        let register_number = patch.register_number.clone();
        let changeset = TaskLetterPatchChangeset::from_patch(patch, updated_at);

        self.run_blocking(move |connection| {
            let row = diesel::update(task_letters::table.find(id.value()))
                .set(&changeset)
                .returning(TaskLetterRow::as_returning())
                .get_result::<TaskLetterRow>(connection)
                .optional()
                .map_err(|err| map_write_error(err, register_number.as_ref()))?;
            row.map_or(Err(TaskLetterRepositoryError::NotFound(id)), row_to_letter)
        })
        .await
    }

    async fn update_official_details(
        &self,
        id: TaskLetterId,
        official: &OfficialCompletion,
        updated_at: DateTime<Utc>,
    ) -> TaskLetterRepositoryResult<TaskLetter> {
        let changeset = OfficialDetailsChangeset::from_official(official, updated_at);

        self.run_blocking(move |connection| {
            let row = diesel::update(task_letters::table.find(id.value()))
                .set(&changeset)
                .returning(TaskLetterRow::as_returning())
                .get_result::<TaskLetterRow>(connection)
                .optional()
                .map_err(TaskLetterRepositoryError::persistence)?;
            row.map_or(Err(TaskLetterRepositoryError::NotFound(id)), row_to_letter)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskLetterId) -> TaskLetterRepositoryResult<Option<TaskLetter>> {
        self.run_blocking(move |connection| {
            let row = task_letters::table
                .find(id.value())
                .select(TaskLetterRow::as_select())
                .first::<TaskLetterRow>(connection)
                .optional()
                .map_err(TaskLetterRepositoryError::persistence)?;
            row.map(row_to_letter).transpose()
        })
        .await
    }

    async fn find_by_register_number(
        &self,
        register_number: &RegisterNumber,
    ) -> TaskLetterRepositoryResult<Option<TaskLetter>> {
        let lookup = register_number.clone();
        self.run_blocking(move |connection| {
            let row = task_letters::table
                .filter(task_letters::register_number.eq(lookup.as_str()))
                .select(TaskLetterRow::as_select())
                .first::<TaskLetterRow>(connection)
                .optional()
                .map_err(TaskLetterRepositoryError::persistence)?;
            row.map(row_to_letter).transpose()
        })
        .await
    }

    async fn list_newest_first(&self) -> TaskLetterRepositoryResult<Vec<TaskLetter>> {
        self.run_blocking(|connection| {
            let rows = task_letters::table
                .order((task_letters::created_at.desc(), task_letters::id.desc()))
                .select(TaskLetterRow::as_select())
                .load::<TaskLetterRow>(connection)
                .map_err(TaskLetterRepositoryError::persistence)?;
            rows.into_iter().map(row_to_letter).collect()
        })
        .await
    }

    async fn delete(&self, id: TaskLetterId) -> TaskLetterRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(task_letters::table.find(id.value()))
                .execute(connection)
                .map_err(TaskLetterRepositoryError::persistence)?;
            Ok(affected > 0)
        })
        .await
    }
}

fn row_to_letter(row: TaskLetterRow) -> TaskLetterRepositoryResult<TaskLetter> {
    row.into_task_letter()
        .map_err(TaskLetterRepositoryError::persistence)
}

/// Maps a failed write, naming `register_number` when the unique index
/// rejected it.
fn map_write_error(
    err: DieselError,
    register_number: Option<&RegisterNumber>,
) -> TaskLetterRepositoryError {
    match (err, register_number) {
        (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info), Some(number))
            if is_register_number_unique_violation(&**info) =>
        {
            tracing::debug!(
                register_number = %number,
                "register number unique index rejected write"
            );
            TaskLetterRepositoryError::DuplicateRegisterNumber(number.clone())
        }
        (other, _) => TaskLetterRepositoryError::persistence(other),
    }
}

fn is_register_number_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == REGISTER_NUMBER_UNIQUE_INDEX)
}
