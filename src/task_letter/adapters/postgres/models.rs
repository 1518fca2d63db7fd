//! Diesel row models for task-letter persistence.

use super::schema::task_letters;
use crate::task_letter::domain::{
    AdvanceMoney, NewTaskLetter, OfficialCompletion, Person, PersistedTaskLetterData,
    RegisterNumber, RequiredText, TaskLetter, TaskLetterDetails, TaskLetterDomainError,
    TaskLetterId, TaskLetterPatch,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

/// Query result row for task-letter records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_letters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskLetterRow {
    /// Store-generated identifier.
    pub id: i64,
    /// Unique register number.
    pub register_number: String,
    /// Letter title.
    pub title: String,
    /// Recipient name.
    pub recipient_name: String,
    /// Recipient position.
    pub recipient_position: String,
    /// Destination.
    pub destination_place: String,
    /// Purpose of travel.
    pub purpose: String,
    /// First day of the assignment.
    pub start_date: NaiveDate,
    /// Last day of the assignment.
    pub end_date: NaiveDate,
    /// Means of transportation.
    pub transportation: String,
    /// Advance money.
    pub advance_money: Decimal,
    /// Signatory name.
    pub signatory_name: String,
    /// Signatory position.
    pub signatory_position: String,
    /// Place of issue.
    pub creation_place: String,
    /// Date of issue.
    pub creation_date: NaiveDate,
    /// Arrival date recorded at the destination.
    pub arrival_date: Option<NaiveDate>,
    /// Return date recorded at the destination.
    pub return_date: Option<NaiveDate>,
    /// Whether the ticket was taken.
    pub ticket_taken: Option<bool>,
    /// Notes from the destination official.
    pub official_notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task-letter records. The id comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_letters)]
pub struct NewTaskLetterRow {
    pub register_number: String,
    pub title: String,
    pub recipient_name: String,
    pub recipient_position: String,
    pub destination_place: String,
    pub purpose: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub transportation: String,
    pub advance_money: Decimal,
    pub signatory_name: String,
    pub signatory_position: String,
    pub creation_place: String,
    pub creation_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial changeset holding only the columns a patch names.
///
/// `None` fields are skipped. The official columns use `Option<Option<_>>`
/// so `Some(None)` clears them.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = task_letters)]
pub struct TaskLetterPatchChangeset {
    pub register_number: Option<String>,
    pub title: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_position: Option<String>,
    pub destination_place: Option<String>,
    pub purpose: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub transportation: Option<String>,
    pub advance_money: Option<Decimal>,
    pub signatory_name: Option<String>,
    pub signatory_position: Option<String>,
    pub creation_place: Option<String>,
    pub creation_date: Option<NaiveDate>,
    pub arrival_date: Option<Option<NaiveDate>>,
    pub return_date: Option<Option<NaiveDate>>,
    pub ticket_taken: Option<Option<bool>>,
    pub official_notes: Option<Option<String>>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for the official completion columns.
///
/// `None` values are written as `NULL` so clearing a field persists.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = task_letters)]
#[diesel(treat_none_as_null = true)]
pub struct OfficialDetailsChangeset {
    pub arrival_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub ticket_taken: Option<bool>,
    pub official_notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl NewTaskLetterRow {
    /// Builds an insert row from an unpersisted letter.
    pub fn from_new(letter: &NewTaskLetter) -> Self {
        let details = letter.details();
        Self {
            register_number: details.register_number.as_str().to_owned(),
            title: details.title.as_str().to_owned(),
            recipient_name: details.recipient.name().as_str().to_owned(),
            recipient_position: details.recipient.position().as_str().to_owned(),
            destination_place: details.destination_place.as_str().to_owned(),
            purpose: details.purpose.as_str().to_owned(),
            start_date: details.start_date,
            end_date: details.end_date,
            transportation: details.transportation.as_str().to_owned(),
            advance_money: details.advance_money.amount(),
            signatory_name: details.signatory.name().as_str().to_owned(),
            signatory_position: details.signatory.position().as_str().to_owned(),
            creation_place: details.creation_place.as_str().to_owned(),
            creation_date: details.creation_date,
            created_at: letter.created_at(),
            updated_at: letter.created_at(),
        }
    }
}

impl TaskLetterPatchChangeset {
    /// Builds a changeset from a validated patch.
    pub fn from_patch(patch: &TaskLetterPatch, updated_at: DateTime<Utc>) -> Self {
        let text = |value: Option<&RequiredText>| value.map(|t| t.as_str().to_owned());
        Self {
            register_number: patch
                .register_number
                .as_ref()
                .map(|number| number.as_str().to_owned()),
            title: text(patch.title.as_ref()),
            recipient_name: text(patch.recipient_name.as_ref()),
            recipient_position: text(patch.recipient_position.as_ref()),
            destination_place: text(patch.destination_place.as_ref()),
            purpose: text(patch.purpose.as_ref()),
            start_date: patch.start_date,
            end_date: patch.end_date,
            transportation: text(patch.transportation.as_ref()),
            advance_money: patch.advance_money.map(AdvanceMoney::amount),
            signatory_name: text(patch.signatory_name.as_ref()),
            signatory_position: text(patch.signatory_position.as_ref()),
            creation_place: text(patch.creation_place.as_ref()),
            creation_date: patch.creation_date,
            arrival_date: patch.official.arrival_date.to_column(),
            return_date: patch.official.return_date.to_column(),
            ticket_taken: patch.official.ticket_taken.to_column(),
            official_notes: patch.official.notes.to_column(),
            updated_at,
        }
    }
}

impl OfficialDetailsChangeset {
    /// Builds a changeset replacing all four official fields.
    pub fn from_official(official: &OfficialCompletion, updated_at: DateTime<Utc>) -> Self {
        Self {
            arrival_date: official.arrival_date,
            return_date: official.return_date,
            ticket_taken: official.ticket_taken,
            official_notes: official.notes.clone(),
            updated_at,
        }
    }
}

impl TaskLetterRow {
    /// Converts a stored row back into the domain aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterDomainError`] when a stored value no longer
    /// satisfies domain validation.
    pub fn into_task_letter(self) -> Result<TaskLetter, TaskLetterDomainError> {
        let details = TaskLetterDetails {
            register_number: RegisterNumber::new(self.register_number)?,
            title: RequiredText::new("title", self.title)?,
            recipient: Person::new(
                RequiredText::new("recipient name", self.recipient_name)?,
                RequiredText::new("recipient position", self.recipient_position)?,
            ),
            destination_place: RequiredText::new("destination place", self.destination_place)?,
            purpose: RequiredText::new("purpose", self.purpose)?,
            start_date: self.start_date,
            end_date: self.end_date,
            transportation: RequiredText::new("transportation", self.transportation)?,
            advance_money: AdvanceMoney::new(self.advance_money)?,
            signatory: Person::new(
                RequiredText::new("signatory name", self.signatory_name)?,
                RequiredText::new("signatory position", self.signatory_position)?,
            ),
            creation_place: RequiredText::new("creation place", self.creation_place)?,
            creation_date: self.creation_date,
        };
        let official = OfficialCompletion {
            arrival_date: self.arrival_date,
            return_date: self.return_date,
            ticket_taken: self.ticket_taken,
            notes: self.official_notes,
        };

        Ok(TaskLetter::from_persisted(PersistedTaskLetterData {
            id: TaskLetterId::new(self.id)?,
            details,
            official,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}
