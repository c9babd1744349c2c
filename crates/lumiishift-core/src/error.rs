use thiserror::Error;

/// Catalog errors.
///
/// These indicate the catalog and the UI have drifted apart, which is a
/// programming error rather than something a user can cause, so callers
/// should surface them instead of falling back to a default mood.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoodError {
    #[error("Unknown mood: '{0}'")]
    UnknownMood(String),

    #[error("Duplicate mood id in catalog: '{0}'")]
    DuplicateMood(String),
}
