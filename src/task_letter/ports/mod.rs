//! Port contracts for task-letter management.
//!
//! Ports define infrastructure-agnostic interfaces used by task-letter
//! services.

pub mod repository;

pub use repository::{
    TaskLetterRepository, TaskLetterRepositoryError, TaskLetterRepositoryResult,
};
