//! Export addressing for task letters.
//!
//! Resolves where a rendered letter will be published. Rendering itself is
//! left to a future document generator.

use super::{TaskLetterServiceError, TaskLetterServiceResult};
use crate::task_letter::{
    domain::{ExportFormat, ExportNaming, ExportedDocument, TaskLetterId},
    ports::TaskLetterRepository,
};
use std::sync::Arc;

/// Derives export file names and URLs for stored task letters.
#[derive(Clone)]
pub struct DocumentExportService<R>
where
    R: TaskLetterRepository,
{
    repository: Arc<R>,
    naming: ExportNaming,
}

impl<R> DocumentExportService<R>
where
    R: TaskLetterRepository,
{
    /// Creates an export service using the given naming scheme.
    #[must_use]
    pub const fn new(repository: Arc<R>, naming: ExportNaming) -> Self {
        Self { repository, naming }
    }

    /// Returns the naming scheme in use.
    #[must_use]
    pub const fn naming(&self) -> &ExportNaming {
        &self.naming
    }

    /// Resolves the export address of a task letter.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterServiceError::NotFound`] for an unknown id and
    /// [`TaskLetterServiceError::Repository`] when the lookup fails.
    pub async fn export(
        &self,
        id: TaskLetterId,
        format: ExportFormat,
    ) -> TaskLetterServiceResult<ExportedDocument> {
        let letter = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(TaskLetterServiceError::NotFound(id))?;
        let document = self.naming.locate(letter.register_number(), format);
        tracing::info!(
            task_letter_id = %id,
            export_format = %format,
            filename = %document.filename,
            "task letter export resolved"
        );
        Ok(document)
    }
}
