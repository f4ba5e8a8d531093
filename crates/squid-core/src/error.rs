//! Error types for collaborators and configuration.

use crate::facts::ClassFile;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for source parsing.
pub type Result<T> = std::result::Result<T, ParseError>;

/// A source file could not be turned into facts.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in {path} at line {line}: {message}")]
    Syntax {
        path: PathBuf,
        line: u32,
        message: String,
    },

    #[error("parser error: {0}")]
    ParserError(String),
}

impl ParseError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn syntax(path: &Path, line: u32, message: impl Into<String>) -> Self {
        Self::Syntax {
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }
}

/// Why a compiled artifact could not be decoded.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed class data: {0}")]
    Malformed(String),

    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
}

/// Decoding of an artifact stopped early.
///
/// Carries the classes that were fully decoded before the failure.
#[derive(Error, Debug)]
#[error("{reason}")]
pub struct DecodeFailure {
    #[source]
    pub reason: DecodeError,
    pub partial: Vec<ClassFile>,
}

impl DecodeFailure {
    pub fn new(reason: DecodeError) -> Self {
        Self {
            reason,
            partial: Vec::new(),
        }
    }

    pub fn with_partial(reason: DecodeError, partial: Vec<ClassFile>) -> Self {
        Self { reason, partial }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(DecodeError::Malformed(message.into()))
    }
}

/// Configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
