//! Identifier and validated scalar types for the task-letter domain.

use super::TaskLetterDomainError;
use serde::Serialize;
use std::fmt;

/// Store-generated identifier of a task letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskLetterId(i64);

impl TaskLetterId {
    /// Creates a validated task-letter identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterDomainError::InvalidTaskLetterId`] when the value
    /// is zero or negative.
    pub const fn new(value: i64) -> Result<Self, TaskLetterDomainError> {
        if value <= 0 {
            return Err(TaskLetterDomainError::InvalidTaskLetterId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskLetterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-assigned register number, unique across all task letters.
///
/// Register numbers are free-form (`090/ST/IV/2025` is typical) and are only
/// trimmed, never otherwise normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegisterNumber(String);

impl RegisterNumber {
    /// Creates a validated register number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterDomainError::EmptyRegisterNumber`] when the value
    /// is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskLetterDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaskLetterDomainError::EmptyRegisterNumber);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the register number as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a file-name-safe form of the register number.
    ///
    /// Every character outside `[A-Za-z0-9-]` becomes `-`.
    #[must_use]
    pub fn sanitized(&self) -> String {
        self.0
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
            .collect()
    }
}

impl AsRef<str> for RegisterNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RegisterNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
