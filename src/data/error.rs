use std::path::PathBuf;

use thiserror::Error;

/// Failures of the data pipeline.
///
/// Everything except [`DataError::MatchNotFound`] is raised while loading and
/// aborts the whole load. `line` is the 1-based line in the source file, the
/// header being line 1.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("cannot read '{}': {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("line {line}: betting amount '{value}' is not a number")]
    MalformedAmount { line: u64, value: String },

    #[error("line {line}: {column} '{value}' is not an integer count")]
    MalformedCount {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: date '{value}' does not match YYYY-MM-DD")]
    MalformedDate { line: u64, value: String },

    #[error("no match '{0}' in the current selection")]
    MatchNotFound(String),
}

pub type Result<T> = std::result::Result<T, DataError>;
