//! Validated partial updates to a task letter.

use super::{AdvanceMoney, OfficialCompletion, RegisterNumber, RequiredText};
use chrono::NaiveDate;

/// Change requested for one optional field.
///
/// Distinguishes "leave as is" from "explicitly clear", which a plain
/// `Option` cannot express.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// Keep the current value.
    #[default]
    Keep,
    /// Clear the value.
    Clear,
    /// Replace the value.
    Set(T),
}

impl<T> FieldPatch<T> {
    /// Maps a nullable input onto `Set` or `Clear`.
    #[must_use]
    pub fn from_nullable(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }

    /// Returns `true` when the patch leaves the field untouched.
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Converts the patch into a column change.
    ///
    /// The outer `None` leaves the column alone and `Some(None)` writes
    /// `NULL`.
    #[must_use]
    pub fn to_column(&self) -> Option<Option<T>>
    where
        T: Clone,
    {
        match self {
            Self::Keep => None,
            Self::Clear => Some(None),
            Self::Set(value) => Some(Some(value.clone())),
        }
    }

    /// Applies the patch to the current value.
    #[must_use]
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Keep => current,
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }
}

/// Per-field changes to the official completion details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfficialPatch {
    /// Change to the arrival date.
    pub arrival_date: FieldPatch<NaiveDate>,
    /// Change to the return date.
    pub return_date: FieldPatch<NaiveDate>,
    /// Change to the ticket flag.
    pub ticket_taken: FieldPatch<bool>,
    /// Change to the official's notes.
    pub notes: FieldPatch<String>,
}

impl OfficialPatch {
    /// Returns `true` when no official field changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.arrival_date.is_keep()
            && self.return_date.is_keep()
            && self.ticket_taken.is_keep()
            && self.notes.is_keep()
    }

    /// Applies the changes to existing completion details.
    #[must_use]
    pub fn apply(self, current: OfficialCompletion) -> OfficialCompletion {
        OfficialCompletion {
            arrival_date: self.arrival_date.apply(current.arrival_date),
            return_date: self.return_date.apply(current.return_date),
            ticket_taken: self.ticket_taken.apply(current.ticket_taken),
            notes: self.notes.apply(current.notes),
        }
    }
}

/// Validated partial update of a task letter.
///
/// `None` core fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskLetterPatch {
    /// New register number.
    pub register_number: Option<RegisterNumber>,
    /// New title.
    pub title: Option<RequiredText>,
    /// New recipient name.
    pub recipient_name: Option<RequiredText>,
    /// New recipient position.
    pub recipient_position: Option<RequiredText>,
    /// New destination.
    pub destination_place: Option<RequiredText>,
    /// New purpose.
    pub purpose: Option<RequiredText>,
    /// New start date.
    pub start_date: Option<NaiveDate>,
    /// New end date.
    pub end_date: Option<NaiveDate>,
    /// New means of transportation.
    pub transportation: Option<RequiredText>,
    /// New advance money amount.
    pub advance_money: Option<AdvanceMoney>,
    /// New signatory name.
    pub signatory_name: Option<RequiredText>,
    /// New signatory position.
    pub signatory_position: Option<RequiredText>,
    /// New place of issue.
    pub creation_place: Option<RequiredText>,
    /// New date of issue.
    pub creation_date: Option<NaiveDate>,
    /// Changes to the official completion details.
    pub official: OfficialPatch,
}
