//! Structured errors for the tessera runtime
//!
//! Errors are raised where they are detected and propagate with `?`. Numerical
//! degeneracies (a singular matrix, a decomposition that failed to converge)
//! are not errors: they are reported through flags on the returned results so
//! callers can branch on them.

use crate::kind::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INVALID_ROW: &str = "INVALID_ROW";
    pub const INVALID_COLUMN: &str = "INVALID_COLUMN";
    pub const INVALID_INDEX: &str = "INVALID_INDEX";
    pub const INVALID_MATRIX_DIMENSIONS: &str = "INVALID_MATRIX_DIMENSIONS";
    pub const INVALID_RUNTIME_CONVERSION: &str = "INVALID_RUNTIME_CONVERSION";
    pub const INVALID_PARAMETER_VALUE: &str = "INVALID_PARAMETER_VALUE";
    pub const INVALID_NUMERIC_VALUE: &str = "INVALID_NUMERIC_VALUE";
    // File errors
    pub const FILE_OPEN_ERROR: &str = "FILE_OPEN_ERROR";
    pub const FILE_READ_ERROR: &str = "FILE_READ_ERROR";
    pub const FILE_WRITE_ERROR: &str = "FILE_WRITE_ERROR";
    pub const FILE_SEEK_ERROR: &str = "FILE_SEEK_ERROR";
    pub const FILE_CLOSE_ERROR: &str = "FILE_CLOSE_ERROR";
    pub const INVALID_FILE_NUMBER: &str = "INVALID_FILE_NUMBER";
    // Containers and strings
    pub const CAN_NOT_CONVERT_TO_STRING: &str = "CAN_NOT_CONVERT_TO_STRING";
    pub const INVALID_CONTAINER_CONTENTS: &str = "INVALID_CONTAINER_CONTENTS";
    pub const MALFORMED_STRING: &str = "MALFORMED_STRING";
}

/// What a file error refers to: a filesystem path or a registry handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileTarget {
    Path(String),
    Handle(u32),
}

impl fmt::Display for FileTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileTarget::Path(p) => write!(f, "'{}'", p),
            FileTarget::Handle(h) => write!(f, "file #{}", h),
        }
    }
}

impl From<&str> for FileTarget {
    fn from(path: &str) -> Self {
        FileTarget::Path(path.to_string())
    }
}

impl From<&std::path::Path> for FileTarget {
    fn from(path: &std::path::Path) -> Self {
        FileTarget::Path(path.display().to_string())
    }
}

impl From<u32> for FileTarget {
    fn from(handle: u32) -> Self {
        FileTarget::Handle(handle)
    }
}

fn shape(dims: &(usize, usize)) -> String {
    format!("{}×{}", dims.0, dims.1)
}

fn os_suffix(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!(" (os error {})", c),
        None => String::new(),
    }
}

/// Error kinds signalled by the runtime.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ModelError {
    #[error("row index {index} is out of range 1..={bound}")]
    InvalidRow { index: i64, bound: usize },

    #[error("column index {index} is out of range 1..={bound}")]
    InvalidColumn { index: i64, bound: usize },

    #[error("index {index} is out of range 1..={bound}")]
    InvalidIndex { index: i64, bound: usize },

    #[error("{operation}: incompatible dimensions {} and {}", shape(.left), shape(.right))]
    InvalidMatrixDimensions {
        operation: String,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("can not convert {from} to {to}")]
    InvalidRuntimeConversion { from: ValueKind, to: ValueKind },

    #[error("invalid value for '{parameter}': {details}")]
    InvalidParameterValue { parameter: String, details: String },

    #[error("invalid numeric value {value} for '{parameter}'")]
    InvalidNumericValue { parameter: String, value: f64 },

    #[error("could not open {target}{}", os_suffix(.os_code))]
    FileOpenError { target: FileTarget, os_code: Option<i32> },

    #[error("could not read {target}: {details}{}", os_suffix(.os_code))]
    FileReadError {
        target: FileTarget,
        os_code: Option<i32>,
        details: String,
    },

    #[error("could not write {target}{}", os_suffix(.os_code))]
    FileWriteError { target: FileTarget, os_code: Option<i32> },

    #[error("could not seek {target}{}", os_suffix(.os_code))]
    FileSeekError { target: FileTarget, os_code: Option<i32> },

    #[error("could not close {target}{}", os_suffix(.os_code))]
    FileCloseError { target: FileTarget, os_code: Option<i32> },

    #[error("invalid file number {handle}")]
    InvalidFileNumber { handle: u32 },

    #[error("can not convert to string: {details}")]
    CanNotConvertToString { details: String },

    #[error("container element {position} is {found}, expected a set")]
    InvalidContainerContents { position: usize, found: ValueKind },

    #[error("malformed format string '{format}' at offset {offset}")]
    MalformedString { format: String, offset: usize },
}

/// Result alias used throughout the runtime.
pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidRow { .. } => codes::INVALID_ROW,
            ModelError::InvalidColumn { .. } => codes::INVALID_COLUMN,
            ModelError::InvalidIndex { .. } => codes::INVALID_INDEX,
            ModelError::InvalidMatrixDimensions { .. } => codes::INVALID_MATRIX_DIMENSIONS,
            ModelError::InvalidRuntimeConversion { .. } => codes::INVALID_RUNTIME_CONVERSION,
            ModelError::InvalidParameterValue { .. } => codes::INVALID_PARAMETER_VALUE,
            ModelError::InvalidNumericValue { .. } => codes::INVALID_NUMERIC_VALUE,
            ModelError::FileOpenError { .. } => codes::FILE_OPEN_ERROR,
            ModelError::FileReadError { .. } => codes::FILE_READ_ERROR,
            ModelError::FileWriteError { .. } => codes::FILE_WRITE_ERROR,
            ModelError::FileSeekError { .. } => codes::FILE_SEEK_ERROR,
            ModelError::FileCloseError { .. } => codes::FILE_CLOSE_ERROR,
            ModelError::InvalidFileNumber { .. } => codes::INVALID_FILE_NUMBER,
            ModelError::CanNotConvertToString { .. } => codes::CAN_NOT_CONVERT_TO_STRING,
            ModelError::InvalidContainerContents { .. } => codes::INVALID_CONTAINER_CONTENTS,
            ModelError::MalformedString { .. } => codes::MALFORMED_STRING,
        }
    }

    /// True for the filesystem family of errors
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            ModelError::FileOpenError { .. }
                | ModelError::FileReadError { .. }
                | ModelError::FileWriteError { .. }
                | ModelError::FileSeekError { .. }
                | ModelError::FileCloseError { .. }
                | ModelError::InvalidFileNumber { .. }
        )
    }

    // ========== Common Error Constructors ==========

    pub fn dimensions(operation: &str, left: (usize, usize), right: (usize, usize)) -> Self {
        ModelError::InvalidMatrixDimensions {
            operation: operation.to_string(),
            left,
            right,
        }
    }

    pub fn conversion(from: ValueKind, to: ValueKind) -> Self {
        ModelError::InvalidRuntimeConversion { from, to }
    }

    pub fn parameter(parameter: &str, details: impl Into<String>) -> Self {
        ModelError::InvalidParameterValue {
            parameter: parameter.to_string(),
            details: details.into(),
        }
    }

    pub fn numeric(parameter: &str, value: f64) -> Self {
        ModelError::InvalidNumericValue {
            parameter: parameter.to_string(),
            value,
        }
    }

    pub fn not_a_string(details: impl Into<String>) -> Self {
        ModelError::CanNotConvertToString {
            details: details.into(),
        }
    }

    pub fn malformed(format: &str, offset: usize) -> Self {
        ModelError::MalformedString {
            format: format.to_string(),
            offset,
        }
    }

    // ========== File Error Constructors ==========

    pub fn file_open(target: impl Into<FileTarget>, err: &std::io::Error) -> Self {
        ModelError::FileOpenError {
            target: target.into(),
            os_code: err.raw_os_error(),
        }
    }

    pub fn file_read(target: impl Into<FileTarget>, err: &std::io::Error) -> Self {
        ModelError::FileReadError {
            target: target.into(),
            os_code: err.raw_os_error(),
            details: err.to_string(),
        }
    }

    /// Read failure caused by malformed content rather than the OS
    pub fn file_content(target: impl Into<FileTarget>, details: impl Into<String>) -> Self {
        ModelError::FileReadError {
            target: target.into(),
            os_code: None,
            details: details.into(),
        }
    }

    pub fn file_write(target: impl Into<FileTarget>, err: &std::io::Error) -> Self {
        ModelError::FileWriteError {
            target: target.into(),
            os_code: err.raw_os_error(),
        }
    }

    pub fn file_seek(target: impl Into<FileTarget>, err: &std::io::Error) -> Self {
        ModelError::FileSeekError {
            target: target.into(),
            os_code: err.raw_os_error(),
        }
    }

    pub fn file_close(target: impl Into<FileTarget>, err: &std::io::Error) -> Self {
        ModelError::FileCloseError {
            target: target.into(),
            os_code: err.raw_os_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let err = ModelError::InvalidRow { index: 4, bound: 3 };
        assert_eq!(err.code(), codes::INVALID_ROW);
        assert_eq!(err.to_string(), "row index 4 is out of range 1..=3");
    }

    #[test]
    fn test_dimension_message() {
        let err = ModelError::dimensions("multiply", (2, 3), (2, 3));
        assert_eq!(err.to_string(), "multiply: incompatible dimensions 2×3 and 2×3");
        assert_eq!(err.code(), codes::INVALID_MATRIX_DIMENSIONS);
    }

    #[test]
    fn test_file_error_carries_os_code() {
        let io = std::io::Error::from_raw_os_error(2);
        let err = ModelError::file_open("missing.csv", &io);
        assert!(err.is_file_error());
        match &err {
            ModelError::FileOpenError { target, os_code } => {
                assert_eq!(target, &FileTarget::Path("missing.csv".to_string()));
                assert_eq!(*os_code, Some(2));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(err.to_string().contains("os error 2"));
    }

    #[test]
    fn test_serde_round_trip() {
        let err = ModelError::conversion(ValueKind::Set, ValueKind::Integer);
        let json = serde_json::to_string(&err).unwrap();
        let back: ModelError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
