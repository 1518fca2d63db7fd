//! Error types for task-letter domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing task-letter domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskLetterDomainError {
    /// A required text field is empty after trimming.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// The register number is empty after trimming.
    #[error("register number must not be empty")]
    EmptyRegisterNumber,

    /// The advance money amount is below zero.
    #[error("advance money must not be negative, got {0}")]
    NegativeAdvanceMoney(String),

    /// The advance money amount does not fit `NUMERIC(12, 2)`.
    #[error("advance money {0} exceeds 10 integer digits or 2 fractional digits")]
    AdvanceMoneyOutOfRange(String),

    /// The task-letter identifier is not a positive integer.
    #[error("invalid task letter id {0}, expected a positive integer")]
    InvalidTaskLetterId(i64),
}

/// Error returned while parsing an export format name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported export format: {0}, expected pdf or docx")]
pub struct ParseExportFormatError(pub String);
