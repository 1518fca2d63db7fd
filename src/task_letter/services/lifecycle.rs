//! Service layer for creating, changing, and removing task letters.

use crate::task_letter::{
    domain::{
        AdvanceMoney, FieldPatch, NewTaskLetter, OfficialCompletion, OfficialPatch, Person,
        RegisterNumber, RequiredText, RuleViolation, TaskLetter, TaskLetterDetails,
        TaskLetterDomainError, TaskLetterId, TaskLetterPatch, rules,
    },
    ports::{TaskLetterRepository, TaskLetterRepositoryError},
};
use chrono::NaiveDate;
use mockable::Clock;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for issuing a new task letter.
///
/// Text fields are trimmed and must not be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskLetterRequest {
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
}

impl CreateTaskLetterRequest {
    fn into_details(self) -> Result<TaskLetterDetails, TaskLetterDomainError> {
        Ok(TaskLetterDetails {
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
        })
    }
}

/// Request payload for a partial task-letter update.
///
/// Unset fields stay unchanged. Official completion fields may also be
/// changed here; passing `None` to their setters clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskLetterRequest {
    register_number: Option<String>,
    title: Option<String>,
    recipient_name: Option<String>,
    recipient_position: Option<String>,
    destination_place: Option<String>,
    purpose: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    transportation: Option<String>,
    advance_money: Option<Decimal>,
    signatory_name: Option<String>,
    signatory_position: Option<String>,
    creation_place: Option<String>,
    creation_date: Option<NaiveDate>,
    official: OfficialPatch,
}

impl UpdateTaskLetterRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the register number.
    #[must_use]
    pub fn with_register_number(mut self, value: impl Into<String>) -> Self {
        self.register_number = Some(value.into());
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, value: impl Into<String>) -> Self {
        self.title = Some(value.into());
        self
    }

    /// Sets the recipient name.
    #[must_use]
    pub fn with_recipient_name(mut self, value: impl Into<String>) -> Self {
        self.recipient_name = Some(value.into());
        self
    }

    /// Sets the recipient position.
    #[must_use]
    pub fn with_recipient_position(mut self, value: impl Into<String>) -> Self {
        self.recipient_position = Some(value.into());
        self
    }

    /// Sets the destination.
    #[must_use]
    pub fn with_destination_place(mut self, value: impl Into<String>) -> Self {
        self.destination_place = Some(value.into());
        self
    }

    /// Sets the purpose.
    #[must_use]
    pub fn with_purpose(mut self, value: impl Into<String>) -> Self {
        self.purpose = Some(value.into());
        self
    }

    /// Sets the start date.
    #[must_use]
    pub const fn with_start_date(mut self, value: NaiveDate) -> Self {
        self.start_date = Some(value);
        self
    }

    /// Sets the end date.
    #[must_use]
    pub const fn with_end_date(mut self, value: NaiveDate) -> Self {
        self.end_date = Some(value);
        self
    }

    /// Sets the means of transportation.
    #[must_use]
    pub fn with_transportation(mut self, value: impl Into<String>) -> Self {
        self.transportation = Some(value.into());
        self
    }

    /// Sets the advance money.
    #[must_use]
    pub const fn with_advance_money(mut self, value: Decimal) -> Self {
        self.advance_money = Some(value);
        self
    }

    /// Sets the signatory name.
    #[must_use]
    pub fn with_signatory_name(mut self, value: impl Into<String>) -> Self {
        self.signatory_name = Some(value.into());
        self
    }

    /// Sets the signatory position.
    #[must_use]
    pub fn with_signatory_position(mut self, value: impl Into<String>) -> Self {
        self.signatory_position = Some(value.into());
        self
    }

    /// Sets the place of issue.
    #[must_use]
    pub fn with_creation_place(mut self, value: impl Into<String>) -> Self {
        self.creation_place = Some(value.into());
        self
    }

    /// Sets the date of issue.
    #[must_use]
    pub const fn with_creation_date(mut self, value: NaiveDate) -> Self {
        self.creation_date = Some(value);
        self
    }

    /// Sets or clears the arrival date.
    #[must_use]
    pub fn with_arrival_date(mut self, value: Option<NaiveDate>) -> Self {
        self.official.arrival_date = FieldPatch::from_nullable(value);
        self
    }

    /// Sets or clears the return date.
    #[must_use]
    pub fn with_return_date(mut self, value: Option<NaiveDate>) -> Self {
        self.official.return_date = FieldPatch::from_nullable(value);
        self
    }

    /// Sets or clears the ticket flag.
    #[must_use]
    pub fn with_ticket_taken(mut self, value: Option<bool>) -> Self {
        self.official.ticket_taken = FieldPatch::from_nullable(value);
        self
    }

    /// Sets or clears the official's notes.
    #[must_use]
    pub fn with_official_notes(mut self, value: Option<String>) -> Self {
        self.official.notes = FieldPatch::from_nullable(value);
        self
    }

    fn into_patch(self) -> Result<TaskLetterPatch, TaskLetterDomainError> {
        Ok(TaskLetterPatch {
            register_number: self.register_number.map(RegisterNumber::new).transpose()?,
            title: required("title", self.title)?,
            recipient_name: required("recipient name", self.recipient_name)?,
            recipient_position: required("recipient position", self.recipient_position)?,
            destination_place: required("destination place", self.destination_place)?,
            purpose: required("purpose", self.purpose)?,
            start_date: self.start_date,
            end_date: self.end_date,
            transportation: required("transportation", self.transportation)?,
            advance_money: self.advance_money.map(AdvanceMoney::new).transpose()?,
            signatory_name: required("signatory name", self.signatory_name)?,
            signatory_position: required("signatory position", self.signatory_position)?,
            creation_place: required("creation place", self.creation_place)?,
            creation_date: self.creation_date,
            official: self.official,
        })
    }
}

fn required(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<RequiredText>, TaskLetterDomainError> {
    value.map(|text| RequiredText::new(field, text)).transpose()
}

/// Coarse failure classes surfaced to callers of the task-letter services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The identifier references no task letter.
    NotFound,
    /// Another task letter already holds the register number.
    DuplicateRegisterNumber,
    /// The end date is not after the start date.
    InvalidDateRange,
    /// A field failed validation.
    InvalidInput,
    /// The store failed.
    Persistence,
}

/// Service-level errors for task-letter operations.
#[derive(Debug, Error)]
pub enum TaskLetterServiceError {
    /// Field validation failed.
    #[error(transparent)]
    Domain(#[from] TaskLetterDomainError),
    /// A task-letter invariant would be broken.
    #[error(transparent)]
    Rule(#[from] RuleViolation),
    /// The task letter does not exist.
    #[error("task letter not found: {0}")]
    NotFound(TaskLetterId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskLetterRepositoryError),
}

impl TaskLetterServiceError {
    /// Returns the failure class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::InvalidInput,
            Self::Rule(RuleViolation::DuplicateRegisterNumber(_))
            | Self::Repository(TaskLetterRepositoryError::DuplicateRegisterNumber(_)) => {
                ErrorKind::DuplicateRegisterNumber
            }
            Self::Rule(RuleViolation::InvalidDateRange { .. }) => ErrorKind::InvalidDateRange,
            Self::NotFound(_) | Self::Repository(TaskLetterRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Repository(TaskLetterRepositoryError::Persistence(_)) => ErrorKind::Persistence,
        }
    }
}

impl From<TaskLetterRepositoryError> for TaskLetterServiceError {
    fn from(err: TaskLetterRepositoryError) -> Self {
        match err {
            TaskLetterRepositoryError::DuplicateRegisterNumber(register_number) => {
                Self::Rule(RuleViolation::DuplicateRegisterNumber(register_number))
            }
            TaskLetterRepositoryError::NotFound(id) => Self::NotFound(id),
            TaskLetterRepositoryError::Persistence(_) => Self::Repository(err),
        }
    }
}

/// Result type for task-letter service operations.
pub type TaskLetterServiceResult<T> = Result<T, TaskLetterServiceError>;

/// Task-letter orchestration service.
#[derive(Clone)]
pub struct TaskLetterService<R, C>
where
    R: TaskLetterRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskLetterService<R, C>
where
    R: TaskLetterRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task-letter service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Issues a new task letter with empty official completion details.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterServiceError::Domain`] for invalid fields,
    /// [`TaskLetterServiceError::Rule`] for a reversed date range or a taken
    /// register number, and [`TaskLetterServiceError::Repository`] when
    /// persistence fails.
    pub async fn create(&self, request: CreateTaskLetterRequest) -> TaskLetterServiceResult<TaskLetter> {
        let details = request.into_details()?;
        let holder = self
            .repository
            .find_by_register_number(&details.register_number)
            .await?;

        if let Err(violation) =
            rules::validate_create(&details, holder.as_ref().map(TaskLetter::register_number))
        {
            tracing::warn!(
                register_number = %details.register_number,
                %violation,
                "task letter creation rejected"
            );
            return Err(violation.into());
        }

        let letter = self
            .repository
            .store(&NewTaskLetter::new(details, &*self.clock))
            .await?;
        tracing::info!(
            task_letter_id = %letter.id(),
            register_number = %letter.register_number(),
            "task letter created"
        );
        Ok(letter)
    }

    /// Retrieves a task letter by identifier.
    ///
    /// Returns `Ok(None)` when the letter does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterServiceError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, id: TaskLetterId) -> TaskLetterServiceResult<Option<TaskLetter>> {
        let letter = self.repository.find_by_id(id).await?;
        tracing::debug!(task_letter_id = %id, found = letter.is_some(), "task letter lookup");
        Ok(letter)
    }

    /// Lists every task letter, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterServiceError::Repository`] when the listing fails.
    pub async fn list_all(&self) -> TaskLetterServiceResult<Vec<TaskLetter>> {
        let letters = self.repository.list_newest_first().await?;
        tracing::debug!(count = letters.len(), "task letters listed");
        Ok(letters)
    }

    /// Applies a partial update to a task letter.
    ///
    /// Rules are checked against the letter as read, and only the patched
    /// columns are written.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterServiceError::NotFound`] for an unknown id,
    /// [`TaskLetterServiceError::Domain`] for invalid fields,
    /// [`TaskLetterServiceError::Rule`] when the update breaks an invariant,
    /// and [`TaskLetterServiceError::Repository`] when persistence fails.
    pub async fn update(
        &self,
        id: TaskLetterId,
        request: UpdateTaskLetterRequest,
    ) -> TaskLetterServiceResult<TaskLetter> {
        let patch = request.into_patch()?;
        let current = self.require(id).await?;

        let holder = match &patch.register_number {
            Some(register_number) => self
                .repository
                .find_by_register_number(register_number)
                .await?
                .filter(|letter| letter.id() != id),
            None => None,
        };

        if let Err(violation) =
            rules::validate_update(&current, &patch, holder.as_ref().map(TaskLetter::register_number))
        {
            tracing::warn!(task_letter_id = %id, %violation, "task letter update rejected");
            return Err(violation.into());
        }

        let updated = self
            .repository
            .update_fields(id, &patch, self.clock.utc())
            .await?;
        tracing::info!(task_letter_id = %id, "task letter updated");
        Ok(updated)
    }

    /// Replaces the completion details recorded by the destination official.
    ///
    /// Authoring fields are never touched and dates are not re-validated.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterServiceError::NotFound`] for an unknown id and
    /// [`TaskLetterServiceError::Repository`] when persistence fails.
    pub async fn update_official_details(
        &self,
        id: TaskLetterId,
        official: OfficialCompletion,
    ) -> TaskLetterServiceResult<TaskLetter> {
        let updated = self
            .repository
            .update_official_details(id, &official, self.clock.utc())
            .await?;
        tracing::info!(task_letter_id = %id, "official details recorded");
        Ok(updated)
    }

    /// Deletes a task letter.
    ///
    /// Returns `Ok(false)` when there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterServiceError::Repository`] when persistence fails.
    pub async fn delete(&self, id: TaskLetterId) -> TaskLetterServiceResult<bool> {
        let removed = self.repository.delete(id).await?;
        tracing::info!(task_letter_id = %id, removed, "task letter delete requested");
        Ok(removed)
    }

    async fn require(&self, id: TaskLetterId) -> TaskLetterServiceResult<TaskLetter> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TaskLetterServiceError::NotFound(id))
    }
}
