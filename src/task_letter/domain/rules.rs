//! Acceptance and merge rules for task-letter mutations.
//!
//! Everything here is pure: callers look up whatever the rules need from the
//! store and pass it in. The store's unique index on register numbers stays
//! the authoritative guard, since check-then-write is not atomic.

use super::{OfficialCompletion, RegisterNumber, TaskLetter, TaskLetterDetails, TaskLetterPatch};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// A proposed mutation broke a task-letter invariant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleViolation {
    /// Another task letter already uses the register number.
    #[error("register number already exists: {0}")]
    DuplicateRegisterNumber(RegisterNumber),

    /// The end date is not strictly after the start date.
    #[error("end date {end_date} must be after start date {start_date}")]
    InvalidDateRange {
        /// Start date that was checked.
        start_date: NaiveDate,
        /// End date that was checked.
        end_date: NaiveDate,
    },
}

/// Checks a new task letter against the date invariant and the register
/// numbers already in use.
///
/// # Errors
///
/// Returns [`RuleViolation::InvalidDateRange`] when `end_date <= start_date`
/// and [`RuleViolation::DuplicateRegisterNumber`] when `existing` contains
/// the proposed register number.
pub fn validate_create<'a>(
    details: &TaskLetterDetails,
    existing: impl IntoIterator<Item = &'a RegisterNumber>,
) -> Result<(), RuleViolation> {
    ensure_date_range(details.start_date, details.end_date)?;
    ensure_unused(&details.register_number, existing)
}

/// Checks a partial update against the record it modifies.
///
/// `others` holds register numbers of records other than `current`. When
/// only one date is patched it is compared with the other date as currently
/// stored.
///
/// # Errors
///
/// Returns [`RuleViolation::DuplicateRegisterNumber`] when a changed register
/// number is taken by another record and
/// [`RuleViolation::InvalidDateRange`] when the date check fails.
pub fn validate_update<'a>(
    current: &TaskLetter,
    patch: &TaskLetterPatch,
    others: impl IntoIterator<Item = &'a RegisterNumber>,
) -> Result<(), RuleViolation> {
    if let Some(register_number) = &patch.register_number
        && register_number != current.register_number()
    {
        ensure_unused(register_number, others)?;
    }

    let stored = current.details();
    match (patch.start_date, patch.end_date) {
        (Some(start_date), Some(end_date)) => ensure_date_range(start_date, end_date),
        (Some(start_date), None) => ensure_date_range(start_date, stored.end_date),
        (None, Some(end_date)) => ensure_date_range(stored.start_date, end_date),
        (None, None) => Ok(()),
    }
}

/// Produces the record that results from applying `patch` to `current`.
///
/// Only fields present in the patch change; `updated_at` becomes `now`.
#[must_use]
pub fn merge_update(current: &TaskLetter, patch: TaskLetterPatch, now: DateTime<Utc>) -> TaskLetter {
    let mut merged = current.clone();
    let details = &mut merged.details;

    replace(&mut details.register_number, patch.register_number);
    replace(&mut details.title, patch.title);
    if let Some(name) = patch.recipient_name {
        details.recipient.set_name(name);
    }
    if let Some(position) = patch.recipient_position {
        details.recipient.set_position(position);
    }
    replace(&mut details.destination_place, patch.destination_place);
    replace(&mut details.purpose, patch.purpose);
    replace(&mut details.start_date, patch.start_date);
    replace(&mut details.end_date, patch.end_date);
    replace(&mut details.transportation, patch.transportation);
    replace(&mut details.advance_money, patch.advance_money);
    if let Some(name) = patch.signatory_name {
        details.signatory.set_name(name);
    }
    if let Some(position) = patch.signatory_position {
        details.signatory.set_position(position);
    }
    replace(&mut details.creation_place, patch.creation_place);
    replace(&mut details.creation_date, patch.creation_date);

    merged.official = patch.official.apply(merged.official);
    merged.updated_at = now;
    merged
}

/// Replaces every official completion field with `official`.
///
/// Absent values clear the stored ones. Authoring fields are untouched and
/// dates are not re-validated.
#[must_use]
pub fn merge_official_details(
    current: &TaskLetter,
    official: OfficialCompletion,
    now: DateTime<Utc>,
) -> TaskLetter {
    let mut merged = current.clone();
    merged.official = official;
    merged.updated_at = now;
    merged
}

fn ensure_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), RuleViolation> {
    if end_date <= start_date {
        return Err(RuleViolation::InvalidDateRange {
            start_date,
            end_date,
        });
    }
    Ok(())
}

fn ensure_unused<'a>(
    register_number: &RegisterNumber,
    existing: impl IntoIterator<Item = &'a RegisterNumber>,
) -> Result<(), RuleViolation> {
    if existing.into_iter().any(|taken| taken == register_number) {
        return Err(RuleViolation::DuplicateRegisterNumber(
            register_number.clone(),
        ));
    }
    Ok(())
}

fn replace<T>(field: &mut T, value: Option<T>) {
    if let Some(replacement) = value {
        *field = replacement;
    }
}
