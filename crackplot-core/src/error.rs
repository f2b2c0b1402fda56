//! Error types for crackplot-core

use thiserror::Error;

/// Main error type for the crackplot-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid glob pattern in the input file list
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// None of the requested input files could be opened
    #[error("no readable input files")]
    NoInput,

    /// A tracked file shrank below its consumed offset
    #[error("{path}: file shrank below consumed offset ({len} < {consumed})")]
    Truncated {
        path: String,
        consumed: u64,
        len: u64,
    },
}

/// Result type alias for crackplot-core
pub type Result<T> = std::result::Result<T, Error>;
