//! Application services for task-letter orchestration.

mod export;
mod lifecycle;

pub use export::DocumentExportService;
pub use lifecycle::{
    CreateTaskLetterRequest, ErrorKind, TaskLetterService, TaskLetterServiceError,
    TaskLetterServiceResult, UpdateTaskLetterRequest,
};
