//! `PostgreSQL` adapters for task-letter persistence.

mod models;
mod repository;
mod schema;

pub use repository::{CREATE_TASK_LETTERS_SQL, PostgresTaskLetterRepository, TaskLetterPgPool};
