//! Crate-wide error type

use thiserror::Error;

pub use crate::analyzer::{AnalysisError, EmptyInputError, LexiconError};
pub use crate::config::ConfigError;
pub use crate::db::DbError;
pub use crate::report::ReportError;
pub use crate::source::SourceError;

/// Result alias for operations that can fail anywhere in the pipeline.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lexicon(#[from] LexiconError),
}

impl From<EmptyInputError> for Error {
    fn from(e: EmptyInputError) -> Self {
        Error::Analysis(e.into())
    }
}

impl Error {
    /// True when the run failed because there was nothing to analyze.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Error::Analysis(AnalysisError::EmptyInput(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_converts() {
        let err: Error = EmptyInputError.into();
        assert!(err.is_empty_input());
        assert_eq!(err.to_string(), "cannot summarize an empty set of posts");
    }

    #[test]
    fn test_source_error_is_transparent() {
        let err: Error = SourceError::InvalidCount.into();
        assert!(!err.is_empty_input());
        assert_eq!(err.to_string(), "post count must be greater than zero");
    }
}
