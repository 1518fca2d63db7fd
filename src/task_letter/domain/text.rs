//! Required free-text values and the people named on a task letter.

use super::TaskLetterDomainError;
use std::fmt;

/// Trimmed, non-empty text for a mandatory task-letter field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequiredText(String);

impl RequiredText {
    /// Creates validated text for the named field.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterDomainError::EmptyField`] carrying `field` when the
    /// value is empty after trimming.
    pub fn new(field: &'static str, value: impl Into<String>) -> Result<Self, TaskLetterDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaskLetterDomainError::EmptyField(field));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the text as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RequiredText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RequiredText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named person and the position they hold.
///
/// Used for both the recipient and the signatory of a letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    name: RequiredText,
    position: RequiredText,
}

impl Person {
    /// Creates a person from already validated parts.
    #[must_use]
    pub const fn new(name: RequiredText, position: RequiredText) -> Self {
        Self { name, position }
    }

    /// Returns the person's name.
    #[must_use]
    pub const fn name(&self) -> &RequiredText {
        &self.name
    }

    /// Returns the person's position.
    #[must_use]
    pub const fn position(&self) -> &RequiredText {
        &self.position
    }

    pub(super) fn set_name(&mut self, name: RequiredText) {
        self.name = name;
    }

    pub(super) fn set_position(&mut self, position: RequiredText) {
        self.position = position;
    }
}
