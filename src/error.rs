//! Error types for configuration and decoding

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for operations that fail on bad configuration
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that abort a run before any file is processed
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Root path missing or not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Check identifier outside the known set
    #[error(
        "Unknown check: {0:?} (expected format, consistency, naming, loudness, silence, size or all)"
    )]
    UnknownCheck(String),

    /// No check identifiers were supplied
    #[error("No checks selected")]
    EmptySelection,

    /// Lower bound above upper bound
    #[error("Invalid {parameter} range: minimum {min} is greater than maximum {max}")]
    InvalidRange {
        parameter: &'static str,
        min: String,
        max: String,
    },

    /// Single parameter outside its allowed domain
    #[error("Invalid {parameter}: {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },

    /// Naming pattern that does not compile
    #[error("Invalid naming pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Classified failure to read an audio file.
///
/// Every decoder error ends up in one of these two kinds so the caller can
/// tell a broken stream apart from a file that could not be read at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Not a parseable stream of the expected container
    #[error("invalid audio stream: {0}")]
    Invalid(String),

    /// Generic I/O failure (permissions, empty file, read error)
    #[error("unreadable file: {0}")]
    Unreadable(String),
}

impl DecodeError {
    pub fn reason(&self) -> &str {
        match self {
            Self::Invalid(reason) | Self::Unreadable(reason) => reason,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        // A stream that ends early is a broken container, not an I/O problem
        if err.kind() == ErrorKind::UnexpectedEof {
            Self::Invalid(format!("truncated stream ({err})"))
        } else {
            Self::Unreadable(err.to_string())
        }
    }
}

impl From<hound::Error> for DecodeError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => io.into(),
            hound::Error::FormatError(reason) => Self::Invalid(reason.to_string()),
            other => Self::Invalid(other.to_string()),
        }
    }
}

impl From<symphonia::core::errors::Error> for DecodeError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        match err {
            symphonia::core::errors::Error::IoError(io) => io.into(),
            other => Self::Invalid(other.to_string()),
        }
    }
}
