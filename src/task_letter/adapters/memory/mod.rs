//! In-memory adapters for task-letter persistence.

mod repository;

pub use repository::InMemoryTaskLetterRepository;
