//! # Error Types
//!
//! Errors raised inside the native library.
//!
//! Nothing in this crate unwinds across the C ABI. Every failure is turned
//! into a numeric [`ErrorCode`] and a message, stored in the calling
//! thread's last-error slot (see [`crate::slot`]), and the entry point
//! returns a zero value instead.

use std::io;

use thiserror::Error;

/// Numeric error codes reported through `symbind_err_get_last_code`.
///
/// The values are part of the ABI. New codes may be added; existing ones
/// never change meaning. Hosts must treat any value they do not know as a
/// generic failure.
///
/// Codes are grouped by hundreds:
///
/// - `0..100`: bridge and argument errors
/// - `100..200`: I/O and encoding
/// - `200..300`: object file handling
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode
{
    /// The call succeeded.
    NoError = 0,
    /// A panic was caught at the ABI boundary.
    Panic = 1,
    /// Failure without a more specific classification.
    Unknown = 2,
    /// An argument was out of range or malformed.
    InvalidArgument = 3,
    /// A required pointer argument was null.
    NullPointer = 4,
    /// Reading from the filesystem failed.
    Io = 101,
    /// A string argument was not valid UTF-8.
    InvalidUtf8 = 102,
    /// The bytes could not be parsed as an object file.
    ObjectParse = 201,
    /// The object file parsed but its format is not supported.
    UnsupportedObject = 202,
}

impl ErrorCode
{
    /// The raw value written to the last-error slot.
    #[must_use]
    pub const fn value(self) -> u32
    {
        self as u32
    }
}

/// Main error type for native operations
#[derive(Error, Debug)]
pub enum NativeError
{
    /// A panic escaped a native function body
    ///
    /// The payload is rendered as text when it is a `&str` or `String`.
    #[error("panic: {0}")]
    Panic(String),

    /// A required pointer argument was null
    ///
    /// The string names the offending parameter.
    #[error("null pointer passed for `{0}`")]
    NullPointer(&'static str),

    /// Invalid argument passed to a native function
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A string argument did not hold valid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// I/O error while reading an object file
    #[error("{0}")]
    Io(#[from] io::Error),

    /// The object file could not be parsed
    #[error("failed to parse object file: {0}")]
    ObjectParse(#[from] object::Error),

    /// The object file format is recognised but not handled
    #[error("unsupported object file: {0}")]
    UnsupportedObject(String),
}

impl NativeError
{
    /// The ABI code this error is reported under.
    #[must_use]
    pub fn code(&self) -> ErrorCode
    {
        match self {
            NativeError::Panic(_) => ErrorCode::Panic,
            NativeError::NullPointer(_) => ErrorCode::NullPointer,
            NativeError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            NativeError::InvalidUtf8(_) => ErrorCode::InvalidUtf8,
            NativeError::Io(_) => ErrorCode::Io,
            NativeError::ObjectParse(_) => ErrorCode::ObjectParse,
            NativeError::UnsupportedObject(_) => ErrorCode::UnsupportedObject,
        }
    }
}

/// Convenience type alias for `Result<T, NativeError>`
pub type NativeResult<T> = std::result::Result<T, NativeError>;

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_codes_are_stable()
    {
        assert_eq!(ErrorCode::NoError.value(), 0);
        assert_eq!(ErrorCode::Panic.value(), 1);
        assert_eq!(ErrorCode::Unknown.value(), 2);
        assert_eq!(ErrorCode::InvalidArgument.value(), 3);
        assert_eq!(ErrorCode::NullPointer.value(), 4);
        assert_eq!(ErrorCode::Io.value(), 101);
        assert_eq!(ErrorCode::InvalidUtf8.value(), 102);
        assert_eq!(ErrorCode::ObjectParse.value(), 201);
        assert_eq!(ErrorCode::UnsupportedObject.value(), 202);
    }

    #[test]
    fn test_error_to_code()
    {
        let err = NativeError::NullPointer("path");
        assert_eq!(err.code(), ErrorCode::NullPointer);
        assert!(err.to_string().contains("path"));

        let err = NativeError::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert_eq!(err.code(), ErrorCode::Io);
        assert_eq!(err.to_string(), "missing");
    }
}
