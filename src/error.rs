use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad class of an [`Error`], used to pick a handling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller passed something that can never be valid (wrong record, oversized key)
    Programmer,
    /// Input data is malformed or unknown (color names, geometry strings)
    Data,
    /// The pixel sink refused a write
    Environment,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Programmer => "programmer",
            ErrorKind::Data => "data",
            ErrorKind::Environment => "environment",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Color name is neither a hex color nor known to the color database
    #[error("invalid color name: {0}")]
    InvalidColorName(String),

    /// Structured record has a different tag or field kind than expected
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Composite option key exceeds its length bound
    #[error("can't reference {key:.80} - too long ({len} > {max})")]
    KeyTooLong { key: String, len: usize, max: usize },

    /// Geometry or numeric string failed validation
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Pixel sink rejected a write
    #[error("failed to write pixel at row={row}, col={col}")]
    BufferWriteError { row: usize, col: usize },
}

impl Error {
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TypeMismatch { .. } | Error::KeyTooLong { .. } => ErrorKind::Programmer,
            Error::InvalidColorName(_) | Error::InvalidFormat(_) => ErrorKind::Data,
            Error::BufferWriteError { .. } => ErrorKind::Environment,
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidFormat(error.to_string())
    }
}

impl From<Error> for std::io::Error {
    fn from(error: Error) -> Self {
        Self::new(std::io::ErrorKind::InvalidData, error)
    }
}
