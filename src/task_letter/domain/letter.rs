//! Task-letter aggregate root and its authoring details.

use super::{AdvanceMoney, OfficialCompletion, Person, RegisterNumber, RequiredText, TaskLetterId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Serialize, Serializer};

/// Authoring fields of a task letter, fixed by whoever issues it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLetterDetails {
    /// Unique human-assigned register number.
    pub register_number: RegisterNumber,
    /// Letter title.
    pub title: RequiredText,
    /// Person sent on the errand.
    pub recipient: Person,
    /// Where the recipient travels to.
    pub destination_place: RequiredText,
    /// Why the recipient travels.
    pub purpose: RequiredText,
    /// First day of the assignment.
    pub start_date: NaiveDate,
    /// Last day of the assignment, strictly after `start_date`.
    pub end_date: NaiveDate,
    /// Means of transportation.
    pub transportation: RequiredText,
    /// Money advanced to the recipient.
    pub advance_money: AdvanceMoney,
    /// Person signing the letter.
    pub signatory: Person,
    /// Place the letter was issued.
    pub creation_place: RequiredText,
    /// Date the letter was issued.
    pub creation_date: NaiveDate,
}

/// A validated task letter that the store has not assigned an id to yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskLetter {
    details: TaskLetterDetails,
    created_at: DateTime<Utc>,
}

impl NewTaskLetter {
    /// Stamps authoring details with the current clock time.
    #[must_use]
    pub fn new(details: TaskLetterDetails, clock: &impl Clock) -> Self {
        Self {
            details,
            created_at: clock.utc(),
        }
    }

    /// Returns the authoring details.
    #[must_use]
    pub const fn details(&self) -> &TaskLetterDetails {
        &self.details
    }

    /// Returns the creation timestamp, also used as the first `updated_at`.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Attaches the store-assigned identifier.
    #[must_use]
    pub fn into_task_letter(self, id: TaskLetterId) -> TaskLetter {
        TaskLetter {
            id,
            details: self.details,
            official: OfficialCompletion::new(),
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Task-letter aggregate root.
///
/// Serialises as one flat record whose field names match the storage
/// columns, with the official's notes under `official_notes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLetter {
    id: TaskLetterId,
    pub(super) details: TaskLetterDetails,
    pub(super) official: OfficialCompletion,
    created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskLetterData {
    /// Persisted identifier.
    pub id: TaskLetterId,
    /// Persisted authoring details.
    pub details: TaskLetterDetails,
    /// Persisted completion details.
    pub official: OfficialCompletion,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskLetter {
    /// Reconstructs a task letter from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskLetterData) -> Self {
        Self {
            id: data.id,
            details: data.details,
            official: data.official,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> TaskLetterId {
        self.id
    }

    /// Returns the authoring details.
    #[must_use]
    pub const fn details(&self) -> &TaskLetterDetails {
        &self.details
    }

    /// Returns the register number.
    #[must_use]
    pub const fn register_number(&self) -> &RegisterNumber {
        &self.details.register_number
    }

    /// Returns the completion details recorded by the destination official.
    #[must_use]
    pub const fn official(&self) -> &OfficialCompletion {
        &self.official
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Serialize for TaskLetter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TaskLetterRecord::from(self).serialize(serializer)
    }
}

/// Borrowed flat wire form of a [`TaskLetter`].
#[derive(Serialize)]
struct TaskLetterRecord<'a> {
    id: TaskLetterId,
    register_number: &'a str,
    title: &'a str,
    recipient_name: &'a str,
    recipient_position: &'a str,
    destination_place: &'a str,
    purpose: &'a str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    transportation: &'a str,
    advance_money: AdvanceMoney,
    signatory_name: &'a str,
    signatory_position: &'a str,
    creation_place: &'a str,
    creation_date: NaiveDate,
    arrival_date: Option<NaiveDate>,
    return_date: Option<NaiveDate>,
    ticket_taken: Option<bool>,
    official_notes: Option<&'a str>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a TaskLetter> for TaskLetterRecord<'a> {
    fn from(letter: &'a TaskLetter) -> Self {
        let details = &letter.details;
        let official = &letter.official;
        Self {
            id: letter.id,
            register_number: details.register_number.as_str(),
            title: details.title.as_str(),
            recipient_name: details.recipient.name().as_str(),
            recipient_position: details.recipient.position().as_str(),
            destination_place: details.destination_place.as_str(),
            purpose: details.purpose.as_str(),
            start_date: details.start_date,
            end_date: details.end_date,
            transportation: details.transportation.as_str(),
            advance_money: details.advance_money,
            signatory_name: details.signatory.name().as_str(),
            signatory_position: details.signatory.position().as_str(),
            creation_place: details.creation_place.as_str(),
            creation_date: details.creation_date,
            arrival_date: official.arrival_date,
            return_date: official.return_date,
            ticket_taken: official.ticket_taken,
            official_notes: official.notes.as_deref(),
            created_at: letter.created_at,
            updated_at: letter.updated_at,
        }
    }
}
