//! Shared world state for task-letter BDD scenarios.

use std::sync::Arc;

use chrono::NaiveDate;
use errand::task_letter::{
    adapters::memory::InMemoryTaskLetterRepository,
    domain::{ExportNaming, ExportedDocument, TaskLetter},
    services::{
        CreateTaskLetterRequest, DocumentExportService, TaskLetterService,
        TaskLetterServiceError,
    },
};
use mockable::DefaultClock;
use rstest::fixture;
use rust_decimal::Decimal;

/// Service type used by the BDD world.
pub type TestLetterService = TaskLetterService<InMemoryTaskLetterRepository, DefaultClock>;

/// Scenario world for task-letter behaviour tests.
pub struct TaskLetterWorld {
    pub service: TestLetterService,
    pub exporter: DocumentExportService<InMemoryTaskLetterRepository>,
    pub pending_request: Option<CreateTaskLetterRequest>,
    pub last_created: Option<TaskLetter>,
    pub last_create_result: Option<Result<TaskLetter, TaskLetterServiceError>>,
    pub last_export: Option<Result<ExportedDocument, TaskLetterServiceError>>,
}

impl TaskLetterWorld {
    /// Creates a world over an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryTaskLetterRepository::new());
        Self {
            service: TaskLetterService::new(Arc::clone(&repository), Arc::new(DefaultClock)),
            exporter: DocumentExportService::new(repository, ExportNaming::default()),
            pending_request: None,
            last_created: None,
            last_create_result: None,
            last_export: None,
        }
    }

    /// Returns the most recently issued letter.
    pub fn created(&self) -> Result<&TaskLetter, eyre::Report> {
        self.last_created
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no task letter issued in scenario world"))
    }
}

impl Default for TaskLetterWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskLetterWorld {
    TaskLetterWorld::default()
}

/// Parses an ISO calendar date from a step argument.
pub fn parse_date(value: &str) -> Result<NaiveDate, eyre::Report> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| eyre::eyre!("invalid date {value:?}: {err}"))
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

/// Builds a valid request for a five-day assignment in April 2025.
pub fn request(register_number: String) -> CreateTaskLetterRequest {
    CreateTaskLetterRequest {
        register_number,
        title: "Surat Tugas Supervisi".to_owned(),
        recipient_name: "Sari Wulandari".to_owned(),
        recipient_position: "Supervisor".to_owned(),
        destination_place: "Makassar".to_owned(),
        purpose: "Field supervision".to_owned(),
        start_date: date(2025, 4, 10),
        end_date: date(2025, 4, 14),
        transportation: "Air".to_owned(),
        advance_money: Decimal::new(3_000_000, 0),
        signatory_name: "Hendra Wijaya".to_owned(),
        signatory_position: "Head of Bureau".to_owned(),
        creation_place: "Jakarta".to_owned(),
        creation_date: date(2025, 4, 1),
    }
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
