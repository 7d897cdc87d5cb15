//! Crate-level error type
//!
//! The lexer and parser have their own stage-local error structs carrying a
//! [`SourceLocation`]; both convert into [`Error`] at the API boundary.

use crate::model::SourceLocation;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for all outliner operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Tokenization failure
    #[error("lex error at {location}: {message}")]
    Lex {
        message: String,
        location: SourceLocation,
    },

    /// Declaration parsing failure
    #[error("parse error at {location}: {message}")]
    Parse {
        message: String,
        location: SourceLocation,
    },

    /// Input path does not exist
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// File extension maps to no supported language
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Report serialization failure
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for outliner operations.
pub type Result<T> = std::result::Result<T, Error>;
