//! Error type shared by every reader in the crate.

use std::io;

use thiserror::Error;

/// Which attribute pool a face corner index points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Position,
    TexCoord,
    Normal,
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Position => write!(f, "position"),
            Self::TexCoord => write!(f, "texture coordinate"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

/// Errors that can occur while importing a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A numeric field could not be parsed. Never recoverable.
    #[error("line {line}: invalid number {token:?}")]
    Number { line: usize, token: String },

    /// A face corner references an attribute that does not exist.
    #[error("line {line}: {attribute} index {index} is out of range")]
    IndexOutOfRange {
        line: usize,
        attribute: Attribute,
        /// The index as written in the file (1-based, possibly negative).
        index: i64,
    },

    /// A statement is malformed in a way that can be skipped.
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },

    /// The input uses a variant of the format this crate does not read.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Header or length information disagrees with the data.
    #[error("malformed file: {0}")]
    Structural(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl MeshError {
    /// The 1-based source line the error was raised on, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Number { line, .. }
            | Self::IndexOutOfRange { line, .. }
            | Self::Format { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Whether `ignore_errors` may skip the offending statement.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. } | Self::Format { .. })
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MeshError>;
