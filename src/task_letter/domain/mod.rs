//! Domain model for task letters.
//!
//! Task letters authorize official travel. The domain covers the letter's
//! authoring details, the completion details recorded at the destination,
//! the rules that govern creating and changing letters, and the naming of
//! exported documents. Infrastructure stays outside this boundary.

mod error;
mod export;
mod ids;
mod letter;
mod money;
mod official;
mod patch;
pub mod rules;
mod text;

pub use error::{ParseExportFormatError, TaskLetterDomainError};
pub use export::{
    DEFAULT_FILENAME_PREFIX, DEFAULT_URL_PREFIX, ExportFormat, ExportNaming, ExportedDocument,
};
pub use ids::{RegisterNumber, TaskLetterId};
pub use letter::{NewTaskLetter, PersistedTaskLetterData, TaskLetter, TaskLetterDetails};
pub use money::AdvanceMoney;
pub use official::OfficialCompletion;
pub use patch::{FieldPatch, OfficialPatch, TaskLetterPatch};
pub use rules::RuleViolation;
pub use text::{Person, RequiredText};
