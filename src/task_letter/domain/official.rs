//! Completion details recorded by the official at the destination.

use chrono::NaiveDate;

/// Completion details filled in at the destination.
///
/// Every field is independently optional and unrelated to the letter's
/// authoring fields. A freshly created letter carries an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfficialCompletion {
    /// Date the traveller arrived at the destination.
    pub arrival_date: Option<NaiveDate>,
    /// Date the traveller left the destination.
    pub return_date: Option<NaiveDate>,
    /// Whether the travel ticket was taken.
    pub ticket_taken: Option<bool>,
    /// Free-form notes from the official.
    pub notes: Option<String>,
}

impl OfficialCompletion {
    /// Creates empty completion details.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arrival_date: None,
            return_date: None,
            ticket_taken: None,
            notes: None,
        }
    }

    /// Sets the arrival date.
    #[must_use]
    pub const fn with_arrival_date(mut self, date: NaiveDate) -> Self {
        self.arrival_date = Some(date);
        self
    }

    /// Sets the return date.
    #[must_use]
    pub const fn with_return_date(mut self, date: NaiveDate) -> Self {
        self.return_date = Some(date);
        self
    }

    /// Sets whether the ticket was taken.
    #[must_use]
    pub const fn with_ticket_taken(mut self, taken: bool) -> Self {
        self.ticket_taken = Some(taken);
        self
    }

    /// Sets the official's notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns `true` when no official has filled in anything yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.arrival_date.is_none()
            && self.return_date.is_none()
            && self.ticket_taken.is_none()
            && self.notes.is_none()
    }
}
